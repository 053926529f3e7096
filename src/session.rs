use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::WordService;
use crate::input::{is_typeable, InputEvent};
use crate::scoring::{accuracy, round_to, words_per_minute};
use crate::words::WordList;

pub const DEFAULT_SESSION_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Idle,
    Running,
    Ended,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is already running")]
    AlreadyRunning,
    #[error("session has ended; start a new one")]
    AlreadyEnded,
}

/// Final score of a trial. Built once when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub wpm: f64,
    pub accuracy: f64,
}

impl SessionSummary {
    pub fn new(correct_count: u32, incorrect_count: u32, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        Self {
            correct_count,
            incorrect_count,
            wpm: words_per_minute(correct_count, incorrect_count, secs),
            accuracy: accuracy(correct_count, incorrect_count),
        }
    }

    pub fn rounded_accuracy(&self) -> f64 {
        round_to(self.accuracy, 2)
    }

    /// Plain-text body posted to the leaderboard
    pub fn report(&self) -> String {
        format!(
            "Correct words: {}\nIncorrect words: {}\nWPM: {}\nAccuracy: {}",
            self.correct_count,
            self.incorrect_count,
            self.wpm,
            self.rounded_accuracy()
        )
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Score: {} wpm @ {}% accuracy",
            self.wpm,
            self.rounded_accuracy()
        )
    }
}

/// Snapshot handed to the renderer every frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub state: SessionState,
    pub elapsed_secs: u64,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub current_word: String,
    pub typed_buffer: String,
}

/// One timed trial: `Idle -> Running -> Ended`, never reused
pub struct Session {
    words: WordList,
    service: Arc<dyn WordService>,
    rng: StdRng,
    duration: Duration,
    state: SessionState,
    current_word: String,
    typed_buffer: String,
    correct_count: u32,
    incorrect_count: u32,
    started_at: Option<Instant>,
    elapsed_secs: u64,
    summary: Option<SessionSummary>,
    submission: Option<JoinHandle<bool>>,
}

impl Session {
    /// Pulls a fresh word list from `service`.
    pub fn new(service: Arc<dyn WordService>) -> Self {
        let words = service.fetch_words();
        info!(count = words.len(), "word list initialised");
        Self::with_words(words, service)
    }

    pub fn with_words(words: WordList, service: Arc<dyn WordService>) -> Self {
        Self {
            words,
            service,
            rng: StdRng::from_entropy(),
            duration: Duration::from_secs(DEFAULT_SESSION_SECS),
            state: SessionState::Idle,
            current_word: String::new(),
            typed_buffer: String::new(),
            correct_count: 0,
            incorrect_count: 0,
            started_at: None,
            elapsed_secs: 0,
            summary: None,
            submission: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.start_at(Instant::now())
    }

    /// Rejected outside `Idle`; a rejected call leaves the session untouched.
    pub fn start_at(&mut self, now: Instant) -> Result<(), SessionError> {
        match self.state {
            SessionState::Running => return Err(SessionError::AlreadyRunning),
            SessionState::Ended => return Err(SessionError::AlreadyEnded),
            SessionState::Idle => {}
        }

        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.typed_buffer.clear();
        self.next_word();
        self.state = SessionState::Running;
        info!(duration_secs = self.duration.as_secs(), "session started");
        Ok(())
    }

    pub fn apply_input_event(&mut self, event: InputEvent) {
        if self.state != SessionState::Running {
            return;
        }

        match event {
            InputEvent::AppendChar(c) if is_typeable(c) => {
                self.typed_buffer.extend(c.to_lowercase());
            }
            InputEvent::AppendChar(_) => {}
            InputEvent::Backspace => {
                self.typed_buffer.pop();
            }
            InputEvent::CommitWord => self.commit_word(),
        }
    }

    fn commit_word(&mut self) {
        // buffer is lowercase already, as are list words
        if self.typed_buffer == self.current_word {
            self.correct_count += 1;
        } else {
            self.incorrect_count += 1;
        }
        self.typed_buffer.clear();
        self.next_word();
    }

    fn next_word(&mut self) {
        let idx = self.rng.gen_range(0..self.words.len());
        if let Some(word) = self.words.get(idx) {
            self.current_word = word.to_string();
        }
    }

    /// Evaluate the clock. Returns the summary on the tick that ends the session.
    pub fn tick(&mut self, now: Instant) -> Option<SessionSummary> {
        if self.state != SessionState::Running {
            return None;
        }
        let started_at = self.started_at?;

        let elapsed = now.saturating_duration_since(started_at);
        self.elapsed_secs = elapsed.as_secs();
        if elapsed < self.duration {
            return None;
        }

        self.elapsed_secs = self.duration.as_secs();
        self.state = SessionState::Ended;
        let (correct, incorrect) = (self.correct_count, self.incorrect_count);
        let summary = SessionSummary::new(correct, incorrect, self.duration);
        info!(
            correct = summary.correct_count,
            incorrect = summary.incorrect_count,
            wpm = summary.wpm,
            accuracy = summary.rounded_accuracy(),
            "game over"
        );

        self.submit(summary.clone());
        self.summary = Some(summary.clone());
        Some(summary)
    }

    // fire and forget; the poll loop keeps rendering while this runs
    fn submit(&mut self, summary: SessionSummary) {
        let service = Arc::clone(&self.service);
        let handle = thread::Builder::new()
            .name("leaderboard-post".into())
            .spawn(move || service.post_result(&summary));

        match handle {
            Ok(handle) => self.submission = Some(handle),
            Err(e) => warn!(error = %e, "could not dispatch leaderboard submission"),
        }
    }

    /// Block until the leaderboard submission, if any, has finished.
    pub fn wait_for_submission(&mut self) -> Option<bool> {
        let handle = self.submission.take()?;
        match handle.join() {
            Ok(posted) => Some(posted),
            Err(_) => {
                warn!("leaderboard submission thread panicked");
                Some(false)
            }
        }
    }

    /// Hand the in-flight submission to the caller without waiting on it.
    pub fn detach_submission(&mut self) -> Option<JoinHandle<bool>> {
        self.submission.take()
    }

    pub fn submission_pending(&self) -> bool {
        self.submission
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            state: self.state,
            elapsed_secs: self.elapsed_secs,
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            current_word: self.current_word.clone(),
            typed_buffer: self.typed_buffer.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn typed_buffer(&self) -> &str {
        &self.typed_buffer
    }
}
