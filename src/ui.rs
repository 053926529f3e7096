use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use wordtrial::{DisplayState, SessionState};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let display = self.session.display_state();
        let total_secs = self.config.session_secs;
        match display.state {
            SessionState::Running => render_running(&display, total_secs, area, buf),
            SessionState::Idle | SessionState::Ended => render_landing(self, area, buf),
        }
    }
}

fn render_landing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    if let Some(summary) = &app.last_summary {
        Paragraph::new(Span::styled(
            summary.to_string(),
            Style::default().patch(bold_style).fg(Color::Magenta),
        ))
        .render(chunks[0], buf);
    }

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(1),
            Constraint::Percentage(50),
        ])
        .split(chunks[1]);

    Paragraph::new(Span::styled("Press Enter to Start!", bold_style))
        .alignment(Alignment::Center)
        .render(middle[1], buf);

    let posting = if app.submission_pending() {
        "posting to leaderboard... "
    } else {
        ""
    };
    Paragraph::new(Span::styled(
        format!("{posting}(enter) start / (esc)ape"),
        italic_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);
}

fn render_running(display: &DisplayState, total_secs: u64, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let counters = vec![
        Line::from(format!("Time: {}s / {total_secs}s", display.elapsed_secs)),
        Line::from(Span::styled(
            format!("Correct Words: {}", display.correct_count),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!("Incorrect Words: {}", display.incorrect_count),
            Style::default().fg(Color::Red),
        )),
    ];
    Paragraph::new(counters).render(chunks[0], buf);

    Paragraph::new(Span::styled("Type the Word:", dim_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        display.current_word.as_str(),
        Style::default().patch(bold_style).fg(Color::Blue),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    // pad the input to the prompt width so the two lines stay aligned
    let typed_width = display.typed_buffer.width();
    let word_width = display.current_word.width();
    let padding = "_".repeat(word_width.saturating_sub(typed_width));
    let typed_style = if display.current_word.starts_with(&display.typed_buffer) {
        Style::default().patch(bold_style).fg(Color::Green)
    } else {
        Style::default().patch(bold_style).fg(Color::Red)
    };
    Paragraph::new(Line::from(vec![
        Span::styled(display.typed_buffer.replace(' ', "·"), typed_style),
        Span::styled(padding, dim_style),
    ]))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: false })
    .render(chunks[4], buf);
}
