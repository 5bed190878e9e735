pub mod confetti;
pub mod words;

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState},
    high_score::ScoreSlot,
    trial::Clock,
};

const HORIZONTAL_MARGIN: u16 = 4;
const VERTICAL_MARGIN: u16 = 1;

impl<C: Clock, S: ScoreSlot> Widget for &App<C, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let trial = &self.trial;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let yellow_bold_style = bold_style.fg(Color::Yellow);

        let text_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let word_lines = words::occupied_lines(trial.target_words(), text_width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(0),
                Constraint::Length(word_lines),
                Constraint::Length(1), // padding
                Constraint::Length(1), // pending input
                Constraint::Min(0),
                Constraint::Length(1), // footer
            ])
            .split(area);

        // header
        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(chunks[0]);

        Paragraph::new(Line::from(vec![
            Span::styled("TYPO", yellow_bold_style),
            Span::styled("_MODERN", dim_style.patch(bold_style)),
        ]))
        .render(header[0], buf);

        let mut stats = vec![
            Span::styled(format!("{} wpm", trial.wpm()), yellow_bold_style),
            Span::raw("   "),
            Span::styled(format!("{}% acc", trial.accuracy()), bold_style),
        ];
        if let Some(best) = self.store.best() {
            stats.push(Span::raw("   "));
            stats.push(Span::styled(
                format!(
                    "best {} WPM ({})",
                    best.wpm,
                    best.recorded_at.with_timezone(&Local).format("%Y-%m-%d")
                ),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM),
            ));
        }
        Paragraph::new(Line::from(stats))
            .alignment(Alignment::Right)
            .render(header[1], buf);

        // word panel
        let word_line = words::word_line(trial, self.state == AppState::Complete);
        Paragraph::new(word_line)
            .alignment(if word_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        if self.state == AppState::Typing {
            let input = Line::from(vec![
                Span::styled("> ", dim_style),
                Span::styled(trial.pending_input().to_string(), bold_style),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]);
            Paragraph::new(input)
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        // footer
        let footer = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(14)])
            .split(chunks[6]);
        Paragraph::new(Span::styled(
            "type the words, space or enter after each · (tab) restart · (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(footer[0], buf);
        Paragraph::new(Span::styled(trial.state().to_string(), dim_style))
            .alignment(Alignment::Right)
            .render(footer[1], buf);

        if self.state == AppState::Complete {
            render_complete_panel(self, area, buf);
            if self.confetti.is_active {
                confetti::render_confetti(&self.confetti, area, buf);
            }
        }
    }
}

fn render_complete_panel<C: Clock, S: ScoreSlot>(app: &App<C, S>, area: Rect, buf: &mut Buffer) {
    let width = area.width.min(60);
    let height = area.height.min(7);
    let panel = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let new_best = app
        .last_outcome
        .as_ref()
        .is_some_and(|outcome| outcome.is_new_best);

    let mut summary = vec![
        Span::raw("You typed at "),
        Span::styled(
            format!("{} WPM", app.trial.wpm()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" with "),
        Span::styled(
            format!("{}%", app.trial.accuracy()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" accuracy."),
    ];
    if new_best {
        summary.push(Span::styled(
            " New high score!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            "Test Complete!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(summary),
        Line::from(""),
        Line::from(Span::styled(
            "(r)estart / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    Clear.render(panel, buf);
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(panel, buf);
}
