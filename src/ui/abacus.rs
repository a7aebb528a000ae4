use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use soroban_flash::abacus::{beads_for, BeadState};

const BEAD: &str = " ◆ ";
const ROD: &str = " │ ";
const BEAM: &str = "═══";
const EARTH_BEADS: u8 = 4;

/// Height of a drawn abacus including its frame
pub const ABACUS_HEIGHT: u16 = 10;

/// Draws a soroban with one rod per digit
pub struct AbacusWidget {
    pub value: Option<i64>,
    pub digits: i64,
    pub visible: bool,
}

impl AbacusWidget {
    fn rods(&self) -> Vec<BeadState> {
        let columns = self.digits.clamp(1, 64) as usize;
        match self.value {
            Some(value) => beads_for(value, columns),
            None => vec![BeadState::from_digit(0); columns],
        }
    }

    /// Text rows for the given rods, top to bottom, frame excluded
    pub fn rows(rods: &[BeadState]) -> Vec<Vec<&'static str>> {
        let mut rows: Vec<Vec<&'static str>> = Vec::new();

        // heaven: resting at the top, or pushed down to the beam
        rows.push(rods.iter().map(|r| if r.five { ROD } else { BEAD }).collect());
        rows.push(rods.iter().map(|r| if r.five { BEAD } else { ROD }).collect());
        rows.push(rods.iter().map(|_| BEAM).collect());

        // earth: `ones` beads against the beam, a gap, the rest at the bottom
        for slot in 0..=EARTH_BEADS {
            rows.push(
                rods.iter()
                    .map(|r| if slot == r.ones { ROD } else { BEAD })
                    .collect(),
            );
        }
        rows
    }
}

impl Widget for AbacusWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame_style = Style::default().fg(Color::Rgb(160, 110, 60));
        let bead_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let rod_style = Style::default().fg(Color::DarkGray);

        let rods = self.rods();
        let width = rods.len() * BEAM.chars().count();
        let edge = format!("╔{}╗", "═".repeat(width));
        let bottom = format!("╚{}╝", "═".repeat(width));

        let mut lines = vec![Line::from(Span::styled(edge, frame_style))];

        if self.visible {
            for row in Self::rows(&rods) {
                let mut spans = vec![Span::styled("║", frame_style)];
                spans.extend(row.into_iter().map(|cell| match cell {
                    BEAD => Span::styled(cell, bead_style),
                    BEAM => Span::styled(cell, frame_style),
                    _ => Span::styled(cell, rod_style),
                }));
                spans.push(Span::styled("║", frame_style));
                lines.push(Line::from(spans));
            }
        } else {
            let blank = format!("║{}║", " ".repeat(width));
            for row in 0..(ABACUS_HEIGHT - 2) {
                if row == (ABACUS_HEIGHT - 2) / 2 {
                    let mark = format!("║{:^width$}║", "?", width = width);
                    lines.push(Line::from(Span::styled(mark, frame_style)));
                } else {
                    lines.push(Line::from(Span::styled(blank.clone(), frame_style)));
                }
            }
        }

        lines.push(Line::from(Span::styled(bottom, frame_style)));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
