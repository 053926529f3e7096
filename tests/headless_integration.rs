use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use wordtrial::runtime::{FixedTicker, Runner, TestEventSource, TrialEvent};
use wordtrial::{input, Session, SessionState, SessionSummary, WordList, WordService};

#[derive(Default)]
struct Leaderboard {
    reports: Mutex<Vec<String>>,
}

impl WordService for Leaderboard {
    fn fetch_words(&self) -> WordList {
        WordList::new(["hi"]).unwrap()
    }

    fn post_result(&self, summary: &SessionSummary) -> bool {
        self.reports.lock().unwrap().push(summary.report());
        true
    }

    fn request_shutdown(&self) -> bool {
        true
    }
}

fn key(code: KeyCode) -> TrialEvent {
    TrialEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless poll loop using the runtime + engine without a TTY
#[test]
fn headless_trial_flow_completes() {
    let service = Arc::new(Leaderboard::default());
    let duration = Duration::from_millis(300);
    let mut session = Session::new(service.clone()).with_duration(duration);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // one correct word, one wrong word
    for code in [
        KeyCode::Char('H'),
        KeyCode::Char('i'),
        KeyCode::Enter,
        KeyCode::Char('x'),
        KeyCode::Char('!'),
        KeyCode::Enter,
    ] {
        tx.send(key(code)).unwrap();
    }

    session.start().unwrap();
    let mut summary = None;
    for _ in 0..200u32 {
        let frame = runner.step();
        for k in &frame.keys {
            if let Some(event) = input::from_key_event(k) {
                session.apply_input_event(event);
            }
        }
        if let Some(s) = session.tick(Instant::now()) {
            summary = Some(s);
            break;
        }
    }

    let summary = summary.expect("session should end by timeout");
    assert_eq!(session.state(), SessionState::Ended);
    assert_eq!(summary.correct_count, 1);
    assert_eq!(summary.incorrect_count, 1);
    assert_eq!(summary.accuracy, 50.0);

    assert_eq!(session.wait_for_submission(), Some(true));
    let reports = service.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("Correct words: 1\nIncorrect words: 1\n"));
}

#[test]
fn keys_in_same_frame_are_applied_before_the_clock() {
    let service = Arc::new(Leaderboard::default());
    let mut session = Session::new(service).with_duration(Duration::from_secs(30));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    for code in [KeyCode::Char('h'), KeyCode::Char('i'), KeyCode::Enter] {
        tx.send(key(code)).unwrap();
    }

    let t0 = Instant::now();
    session.start_at(t0).unwrap();

    // the last word lands in the frame that ends the session
    let frame = runner.step();
    assert_eq!(frame.keys.len(), 3);
    for k in &frame.keys {
        if let Some(event) = input::from_key_event(k) {
            session.apply_input_event(event);
        }
    }
    let summary = session.tick(t0 + Duration::from_secs(30)).unwrap();
    assert_eq!(summary.correct_count, 1);
    session.wait_for_submission();
}
