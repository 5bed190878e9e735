use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use crate::celebration::{Confetti, Tint};

/// Draw live particles on top of whatever is already in `buf`
pub fn render_confetti(confetti: &Confetti, area: Rect, buf: &mut Buffer) {
    for particle in &confetti.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = match particle.tint {
            Tint::Yellow => Color::Yellow,
            Tint::White => Color::White,
        };
        let life = particle.life();
        let style = if life > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if life > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_char(particle.symbol);
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn fresh_burst_draws_at_origin() {
        let mut confetti = Confetti::new();
        confetti.start_with_rng(40, 10, &mut StdRng::seed_from_u64(2));
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);

        render_confetti(&confetti, area, &mut buf);

        let cell = buf.cell((20, 6)).unwrap();
        assert_ne!(cell.symbol(), " ");
        assert!(cell.fg == Color::Yellow || cell.fg == Color::White);
    }

    #[test]
    fn particles_outside_area_are_skipped() {
        let mut confetti = Confetti::new();
        confetti.start_with_rng(200, 100, &mut StdRng::seed_from_u64(2));
        let area = Rect::new(0, 0, 10, 10);
        let mut buf = Buffer::empty(area);

        render_confetti(&confetti, area, &mut buf);
        assert!(buf.content().iter().all(|c| c.symbol() == " "));
    }
}
