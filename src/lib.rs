// Typing trial engine. The terminal host lives in main.rs/ui.rs and only
// talks to the engine through these modules.
pub mod app_dirs;
pub mod client;
pub mod config;
pub mod input;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod words;

pub use client::{HttpTransport, ResilientClient, Transport, TransportError, WordService};
pub use input::{InputEvent, KeySignal};
pub use session::{DisplayState, Session, SessionError, SessionState, SessionSummary};
pub use words::{WordList, FALLBACK_WORDS};
