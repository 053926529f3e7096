//! Client for the remote word / leaderboard service.
//!
//! The service is a best-effort dependency: every operation makes one
//! attempt, logs any failure, and hands back a safe value. `fetch_words`
//! always returns a usable list.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::session::SessionSummary;
use crate::words::{WordList, WordListError, WordsPayload, FALLBACK_WORDS};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const WORDS_ENDPOINT: &str = "words";
const LEADERBOARD_ENDPOINT: &str = "leaderboard";
const SHUTDOWN_ENDPOINT: &str = "shutdown";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to create runtime: {0}")]
    Runtime(String),
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

#[derive(Error, Debug)]
enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unusable word list: {0}")]
    InvalidList(#[from] WordListError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Request/response capability used by [`ResilientClient`].
/// Implementations must bound every call by a timeout.
pub trait Transport: Send + Sync {
    fn get(&self, endpoint: &str) -> Result<Response, TransportError>;
    fn post(&self, endpoint: &str, body: String) -> Result<Response, TransportError>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    // runtime per call, so the pool must not keep connections (see new)
    fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response, TransportError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Runtime(e.to_string()))?;

        rt.block_on(async {
            let response = match tokio::time::timeout(self.timeout, request.send()).await {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) if e.is_timeout() => return Err(TransportError::Timeout),
                Ok(Err(e)) => return Err(TransportError::Request(e.to_string())),
                Err(_) => return Err(TransportError::Timeout),
            };

            let status = response.status().as_u16();
            let body = match tokio::time::timeout(self.timeout, response.text()).await {
                Ok(Ok(body)) => body,
                Ok(Err(e)) => return Err(TransportError::Request(e.to_string())),
                Err(_) => return Err(TransportError::Timeout),
            };

            Ok(Response { status, body })
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, endpoint: &str) -> Result<Response, TransportError> {
        let url = self.url(endpoint);
        debug!("Sending GET request to {url}");
        self.execute(self.client.get(url))
    }

    fn post(&self, endpoint: &str, body: String) -> Result<Response, TransportError> {
        let url = self.url(endpoint);
        debug!("Sending POST request to {url}");
        self.execute(
            self.client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(body),
        )
    }
}

/// What the session needs from the remote service
pub trait WordService: Send + Sync {
    /// Never fails: returns the bundled fallback list when the service is unusable.
    fn fetch_words(&self) -> WordList;
    fn post_result(&self, summary: &SessionSummary) -> bool;
    fn request_shutdown(&self) -> bool;
}

pub struct ResilientClient<T: Transport> {
    transport: T,
    fallback: &'static [&'static str],
}

impl<T: Transport> ResilientClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            fallback: FALLBACK_WORDS,
        }
    }

    /// Replace the bundled fallback. An unusable slice still yields the bundled list.
    pub fn with_fallback(mut self, fallback: &'static [&'static str]) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn fallback_list(&self) -> WordList {
        match WordList::new(self.fallback.iter().copied()) {
            Ok(words) => words,
            Err(e) => {
                warn!(error = %e, "configured fallback list unusable, using bundled list");
                WordList::fallback()
            }
        }
    }

    fn try_fetch(&self) -> Result<WordList, FetchError> {
        let response = self.transport.get(WORDS_ENDPOINT)?;
        if !response.is_ok() {
            return Err(FetchError::Status(response.status));
        }
        let payload: WordsPayload = serde_json::from_str(&response.body)?;
        Ok(WordList::try_from(payload)?)
    }
}

impl<T: Transport> WordService for ResilientClient<T> {
    fn fetch_words(&self) -> WordList {
        match self.try_fetch() {
            Ok(words) => {
                info!(count = words.len(), "word list fetched");
                words
            }
            Err(e) => {
                warn!(
                    endpoint = WORDS_ENDPOINT,
                    error = %e,
                    "word fetch failed, using fallback list"
                );
                self.fallback_list()
            }
        }
    }

    fn post_result(&self, summary: &SessionSummary) -> bool {
        match self.transport.post(LEADERBOARD_ENDPOINT, summary.report()) {
            Ok(response) => {
                info!(status = response.status, "result posted to leaderboard");
                true
            }
            Err(e) => {
                warn!(
                    endpoint = LEADERBOARD_ENDPOINT,
                    error = %e,
                    "error posting to leaderboard"
                );
                false
            }
        }
    }

    fn request_shutdown(&self) -> bool {
        match self.transport.get(SHUTDOWN_ENDPOINT) {
            Ok(_) => {
                info!("server shutdown requested");
                true
            }
            Err(e) => {
                warn!(
                    endpoint = SHUTDOWN_ENDPOINT,
                    error = %e,
                    "error shutting down server"
                );
                false
            }
        }
    }
}
