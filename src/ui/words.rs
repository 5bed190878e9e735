use itertools::Itertools;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::trial::{Clock, Trial};

/// Lines the word list needs when greedily wrapped at `width` columns
pub fn occupied_lines(words: &[String], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut lines = 1u16;
    let mut used = 0usize;

    for word in words {
        let word_width = word.width();
        if used > 0 && used + 1 + word_width > width {
            lines = lines.saturating_add(1);
            used = word_width;
        } else if used > 0 {
            used += 1 + word_width;
        } else {
            used = word_width;
        }
    }

    lines
}

/// Style for the word at `idx`: scored words by outcome, the active word
/// underlined, upcoming words dimmed
pub fn word_style<C: Clock>(trial: &Trial<C>, idx: usize) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    match trial.word_results().get(idx) {
        Some(true) => bold.fg(Color::Green),
        Some(false) => bold.fg(Color::Red).add_modifier(Modifier::UNDERLINED),
        None if idx == trial.active_index() => bold.add_modifier(Modifier::UNDERLINED),
        None => Style::default().add_modifier(Modifier::DIM),
    }
}

pub fn word_line<C: Clock>(trial: &Trial<C>, complete: bool) -> Line<'static> {
    let spans = trial.target_words().iter().enumerate().map(|(idx, word)| {
        let style = word_style(trial, idx);
        let style = if complete {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        };
        Span::styled(word.clone(), style)
    });

    Line::from(Itertools::intersperse(spans, Span::raw(" ")).collect::<Vec<_>>())
}
