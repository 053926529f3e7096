use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Buffer edits understood by a running session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    AppendChar(char),
    Backspace,
    CommitWord,
}

/// Key signal after the host input layer has decoded it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySignal {
    Char(char),
    Delete,
    Confirm,
}

impl KeySignal {
    /// Decode a crossterm key event. Releases and ctrl/alt chords yield `None`.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Backspace => Some(KeySignal::Delete),
            KeyCode::Enter => Some(KeySignal::Confirm),
            KeyCode::Char(_)
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                None
            }
            KeyCode::Char(c) => Some(KeySignal::Char(c)),
            _ => None,
        }
    }
}

pub fn is_typeable(c: char) -> bool {
    c.is_alphanumeric() || c == ' '
}

/// Map a decoded key signal onto a session event.
pub fn normalize(signal: KeySignal) -> Option<InputEvent> {
    match signal {
        // case folding happens in the session
        KeySignal::Char(c) if is_typeable(c) => Some(InputEvent::AppendChar(c)),
        KeySignal::Char(_) => None,
        KeySignal::Delete => Some(InputEvent::Backspace),
        KeySignal::Confirm => Some(InputEvent::CommitWord),
    }
}

/// Convenience for the terminal host: decode then normalize.
pub fn from_key_event(key: &KeyEvent) -> Option<InputEvent> {
    KeySignal::from_key_event(key).and_then(normalize)
}
