mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::{Arc, Mutex},
    thread::JoinHandle,
    time::Instant,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordtrial::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    input,
    runtime::{CrosstermEventSource, FixedTicker, Frame, Runner},
    HttpTransport, ResilientClient, Session, SessionState, SessionSummary, WordService,
};

/// timed typing trial with a remote word list and leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type as many prompted words as you can before the clock runs out. Words come from a remote word service (with a bundled fallback) and the score is posted to its leaderboard."
)]
pub struct Cli {
    /// base url of the word / leaderboard service
    #[clap(short = 'u', long)]
    server_url: Option<String>,

    /// timeout for each request to the service, in milliseconds
    #[clap(short = 't', long)]
    timeout_ms: Option<u64>,

    /// length of a trial in seconds
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// do not ask the service to shut down on exit
    #[clap(long)]
    keep_server: bool,
}

impl Cli {
    /// Flags win over stored values
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(url) = &self.server_url {
            cfg.server_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.request_timeout_ms = ms;
        }
        if let Some(secs) = self.seconds {
            cfg.session_secs = secs.max(1);
        }
        cfg
    }
}

pub struct App {
    pub config: Config,
    pub service: Arc<dyn WordService>,
    pub session: Session,
    pub last_summary: Option<SessionSummary>,
    // posts from replaced sessions, still running
    detached: Vec<JoinHandle<bool>>,
}

impl App {
    pub fn new(config: Config, service: Arc<dyn WordService>) -> Self {
        let session = Self::fresh_session(&config, &service);
        Self {
            config,
            service,
            session,
            last_summary: None,
            detached: Vec::new(),
        }
    }

    fn fresh_session(config: &Config, service: &Arc<dyn WordService>) -> Session {
        let session = Session::new(Arc::clone(service));
        session.with_duration(config.session_duration())
    }

    /// Enter on the landing screen. A finished session is replaced, which
    /// also pulls a fresh word list. Its leaderboard post keeps running.
    pub fn start_trial(&mut self) {
        if self.session.state() == SessionState::Ended {
            self.detached.retain(|handle| !handle.is_finished());
            self.detached.extend(self.session.detach_submission());
            self.session = Self::fresh_session(&self.config, &self.service);
        }
        if let Err(e) = self.session.start() {
            warn!(error = %e, "could not start trial");
        }
    }

    /// Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return true;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return false;
        }

        match self.session.state() {
            SessionState::Running => {
                if let Some(event) = input::from_key_event(&key) {
                    self.session.apply_input_event(event);
                }
            }
            SessionState::Idle | SessionState::Ended => {
                if key.code == KeyCode::Enter {
                    self.start_trial();
                }
            }
        }
        true
    }

    /// Returns true on the tick that ends the trial.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        match self.session.tick(now) {
            Some(summary) => {
                self.last_summary = Some(summary);
                true
            }
            None => false,
        }
    }

    pub fn submission_pending(&self) -> bool {
        self.session.submission_pending()
            || self.detached.iter().any(|handle| !handle.is_finished())
    }

    /// Block until every leaderboard post has finished. Used on quit.
    pub fn wait_for_submissions(&mut self) {
        self.session.wait_for_submission();
        for handle in self.detached.drain(..) {
            if handle.join().is_err() {
                warn!("leaderboard submission thread panicked");
            }
        }
    }

    /// Whether the screen is stale after `frame` was applied. `shown_pending`
    /// is the posting indicator as last drawn.
    fn needs_redraw(&self, frame: &Frame, ended: bool, shown_pending: bool) -> bool {
        frame.resized
            || ended
            || !frame.keys.is_empty()
            || shown_pending != self.submission_pending()
            || self.session.state() == SessionState::Running
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let transport = HttpTransport::new(config.server_url.clone(), config.request_timeout())?;
    let service: Arc<dyn WordService> = Arc::new(ResilientClient::new(transport));

    // fetch before the terminal switches to the alternate screen
    let mut app = App::new(config, Arc::clone(&service));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.wait_for_submissions();
    if !cli.keep_server {
        service.request_shutdown();
    }

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let mut shown_pending = app.submission_pending();
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let frame = runner.step();
        for key in &frame.keys {
            if !app.handle_key(*key) {
                return Ok(());
            }
        }
        // clock is read after the frame's input is applied
        let ended = app.on_tick(Instant::now());

        if frame.disconnected {
            return Ok(());
        }
        if app.needs_redraw(&frame, ended, shown_pending) {
            shown_pending = app.submission_pending();
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use wordtrial::WordList;

    struct OfflineService;

    impl WordService for OfflineService {
        fn fetch_words(&self) -> WordList {
            WordList::new(["cat"]).unwrap()
        }

        fn post_result(&self, _summary: &SessionSummary) -> bool {
            false
        }

        fn request_shutdown(&self) -> bool {
            false
        }
    }

    /// Leaderboard that takes its time answering
    #[derive(Default)]
    struct SlowService {
        posts: AtomicUsize,
    }

    impl WordService for SlowService {
        fn fetch_words(&self) -> WordList {
            WordList::new(["cat"]).unwrap()
        }

        fn post_result(&self, _summary: &SessionSummary) -> bool {
            thread::sleep(Duration::from_secs(2));
            self.posts.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn request_shutdown(&self) -> bool {
            true
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Config::default(), Arc::new(OfflineService))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["wordtrial"]);
        assert_eq!(cli.server_url, None);
        assert_eq!(cli.timeout_ms, None);
        assert_eq!(cli.seconds, None);
        assert!(!cli.save_config);
        assert!(!cli.keep_server);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "wordtrial",
            "-u",
            "http://10.0.0.2:8080/api/",
            "--timeout-ms",
            "250",
            "-s",
            "60",
        ]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.server_url, "http://10.0.0.2:8080/api/");
        assert_eq!(cfg.request_timeout_ms, 250);
        assert_eq!(cfg.session_secs, 60);
    }

    #[test]
    fn test_cli_zero_seconds_is_clamped() {
        let cli = Cli::parse_from(["wordtrial", "-s", "0"]);
        assert_eq!(cli.apply(Config::default()).session_secs, 1);
    }

    #[test]
    fn test_enter_starts_trial_then_commits() {
        let mut app = app();
        assert_eq!(app.session.state(), SessionState::Idle);

        assert!(app.handle_key(key(KeyCode::Enter)));
        assert_eq!(app.session.state(), SessionState::Running);
        assert_eq!(app.session.display_state().incorrect_count, 0);

        for c in "cat".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.display_state().correct_count, 1);
    }

    #[test]
    fn test_escape_quits() {
        let mut app = app();
        assert!(!app.handle_key(key(KeyCode::Esc)));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!app.handle_key(ctrl_c));
    }

    #[test]
    fn test_new_trial_after_end_uses_fresh_session() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.on_tick(Instant::now() + app.session.duration());
        assert_eq!(app.session.state(), SessionState::Ended);
        assert!(app.last_summary.is_some());

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.state(), SessionState::Running);
        assert_eq!(app.session.display_state().correct_count, 0);
        assert!(app.last_summary.is_some());
    }

    #[test]
    fn test_new_trial_does_not_wait_for_leaderboard_post() {
        let service = Arc::new(SlowService::default());
        let mut app = App::new(Config::default(), service.clone());
        app.handle_key(key(KeyCode::Enter));
        assert!(app.on_tick(Instant::now() + app.session.duration()));
        assert!(app.submission_pending());

        let pressed = Instant::now();
        assert!(app.handle_key(key(KeyCode::Enter)));
        assert!(pressed.elapsed() < Duration::from_millis(500));
        assert_eq!(app.session.state(), SessionState::Running);
        assert!(app.submission_pending());

        app.wait_for_submissions();
        assert!(!app.submission_pending());
        assert_eq!(service.posts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_idle_frame_skips_redraw() {
        let app = app();
        assert!(!app.needs_redraw(&Frame::default(), false, false));
    }

    #[test]
    fn test_resize_forces_redraw() {
        let app = app();
        let frame = Frame {
            resized: true,
            ..Frame::default()
        };
        assert!(app.needs_redraw(&frame, false, false));
    }

    #[test]
    fn test_running_trial_redraws_every_frame() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        assert!(app.needs_redraw(&Frame::default(), false, false));
    }

    #[test]
    fn test_finished_post_redraws_landing() {
        let app = app();
        assert!(app.needs_redraw(&Frame::default(), false, true));
    }
}
