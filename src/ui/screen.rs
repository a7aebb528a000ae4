use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use soroban_flash::{
    level::{self, LevelConfig},
    output::{EnterMode, FeedbackKind, Screen},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::{
        abacus::{AbacusWidget, ABACUS_HEIGHT},
        hint_line, title_style, HORIZONTAL_MARGIN, VERTICAL_MARGIN,
    },
    App, LEVEL_CHOICES,
};

/// A UI Screen boundary: responsible for drawing one screen of the app
pub trait ScreenView {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct StartScreen;

impl ScreenView for StartScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(ABACUS_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled("soroban flash", title_style())),
            Line::from(""),
            Line::from(Span::styled(
                "see the beads, remember the number",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        AbacusWidget {
            value: Some(2025),
            digits: 4,
            visible: true,
        }
        .render(chunks[3], buf);

        hint_line(&[("enter", "start"), ("h", "how to play"), ("q", "quit")]).render(chunks[5], buf);
    }
}

pub struct HowToScreen;

impl ScreenView for HowToScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let rules = [
            "1. Pick a level. Harder levels use more digits and show them for less time.",
            "2. After the countdown a number appears on the abacus, then disappears.",
            "3. Type the number with 0-9, fix mistakes with backspace, or use ↑/↓ to step it.",
            "4. Press enter to check. The abacus comes back so you can compare.",
            "5. Press enter again for the next number.",
            "",
            "Reading the beads: the top bead is worth 5 when it touches the beam,",
            "each bottom bead touching the beam is worth 1.",
        ];

        Paragraph::new(rules.iter().map(|r| Line::from(*r)).collect::<Vec<_>>())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" How to play ", title_style())),
            )
            .wrap(Wrap { trim: false })
            .render(chunks[0], buf);

        hint_line(&[("enter", "choose level"), ("esc", "back")]).render(chunks[1], buf);
    }
}

pub struct LevelScreen;

impl LevelScreen {
    /// Menu rows in `LEVEL_CHOICES` order: the built-in levels, then custom
    fn levels(app: &App) -> Vec<LevelConfig> {
        let mut levels = level::all_builtin();
        levels.push(level::build_custom(
            app.level_menu.custom.digits,
            app.level_menu.custom.seconds,
        ));
        levels
    }

    fn describe(config: &LevelConfig) -> String {
        format!(
            "{:<28} {} digit(s) · {:.1}s · {} questions",
            config.label,
            config.digits,
            config.reveal_duration_ms as f64 / 1000.0,
            config.question_count
        )
    }
}

impl ScreenView for LevelScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(LEVEL_CHOICES.len() as u16 + 2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled("Choose a level", title_style()))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let lines = Self::levels(app)
            .iter()
            .enumerate()
            .map(|(idx, config)| {
                let selected = idx == app.level_menu.selected;
                let marker = if selected { "▶ " } else { "  " };
                let style = if selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(
                    format!("{}{}. {}", marker, idx + 1, Self::describe(config)),
                    style,
                ))
            })
            .collect::<Vec<_>>();

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);

        hint_line(&[
            ("↑/↓", "select"),
            ("enter", "play"),
            ("←/→", "custom digits"),
            ("-/+", "custom seconds"),
            ("esc", "back"),
        ])
        .render(chunks[3], buf);
    }
}

pub struct GameScreen;

impl ScreenView for GameScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let model = app.controller.output();
        let view = app.controller.renderer();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // level + counter
                Constraint::Length(1), // instruction
                Constraint::Min(ABACUS_HEIGHT),
                Constraint::Length(3), // answer
                Constraint::Length(1), // feedback
                Constraint::Length(1), // hints
            ])
            .split(area);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        Paragraph::new(Span::styled(model.level_label.as_str(), title_style())).render(header[0], buf);
        // the counter from a previous game stays hidden until the first question
        if let (Some((current, total)), None) = (model.question_counter, &model.countdown) {
            Paragraph::new(format!("Question {} / {}", current, total))
                .alignment(Alignment::Right)
                .render(header[1], buf);
        }

        if let Some(instruction) = &model.instruction {
            Paragraph::new(Span::styled(
                instruction.as_str(),
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }

        let abacus_area = centered_rows(chunks[2], ABACUS_HEIGHT);
        if let Some(countdown) = &model.countdown {
            Paragraph::new(Span::styled(
                countdown.as_str(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .render(centered_rows(chunks[2], 1), buf);
        } else {
            AbacusWidget {
                value: view.value,
                digits: view.digits,
                visible: view.visible,
            }
            .render(abacus_area, buf);
        }

        let answer_style = match model.feedback {
            Some((_, FeedbackKind::Success)) => Style::default().fg(Color::Green),
            Some((_, FeedbackKind::Error)) => Style::default().fg(Color::Red),
            None => Style::default(),
        };
        let answer_width = (model.answer_text.width() as u16 + 4).max(12).min(chunks[3].width);
        let answer_area = Rect {
            x: chunks[3].x + (chunks[3].width - answer_width) / 2,
            width: answer_width,
            ..chunks[3]
        };
        Paragraph::new(Span::styled(
            model.answer_text.as_str(),
            answer_style.add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" answer "))
        .render(answer_area, buf);

        if let Some((text, _)) = &model.feedback {
            Paragraph::new(Span::styled(text.as_str(), answer_style))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        let enter_label = match model.enter_mode {
            EnterMode::Submit => "check",
            EnterMode::Next => "next ➡",
        };
        hint_line(&[
            ("0-9", "type"),
            ("⌫", "delete"),
            ("↑/↓", "step"),
            ("enter", enter_label),
            ("esc", "give up"),
        ])
        .render(chunks[5], buf);
    }
}

pub struct ResultScreen;

impl ScreenView for ResultScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let model = app.controller.output();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(1), Constraint::Length(6), Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let lines = match &model.result {
            Some(result) => vec![
                Line::from(Span::styled(model.level_label.as_str(), title_style())),
                Line::from(""),
                Line::from(format!(
                    "Correct: {} of {} ({}%)",
                    result.correct, result.total, result.percent
                )),
                Line::from(""),
                Line::from(Span::styled(
                    result.message.as_str(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
            ],
            None => vec![Line::from("No result yet")],
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        hint_line(&[("r", "retry"), ("l", "levels"), ("esc", "start"), ("q", "quit")])
            .render(chunks[3], buf);
    }
}

/// A vertical slice of `height` rows centered inside `area`
fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

/// Helper to construct the appropriate view for the current screen
pub fn current_screen(screen: Screen) -> Box<dyn ScreenView> {
    match screen {
        Screen::Start => Box::new(StartScreen),
        Screen::HowTo => Box::new(HowToScreen),
        Screen::Level => Box::new(LevelScreen),
        Screen::Game => Box::new(GameScreen),
        Screen::Result => Box::new(ResultScreen),
    }
}

/// Hints joined for the footer, e.g. "(enter) start · (q) quit"
pub fn hint_text(hints: &[(&str, &str)]) -> String {
    hints
        .iter()
        .map(|(key, action)| format!("({}) {}", key, action))
        .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_text() {
        assert_eq!(
            hint_text(&[("enter", "start"), ("q", "quit")]),
            "(enter) start · (q) quit"
        );
    }

    #[test]
    fn test_level_rows_follow_menu_order() {
        let app = App::new(soroban_flash::config::Settings::merge(
            &soroban_flash::config::Config::default(),
            &soroban_flash::config::Overrides::default(),
        ));
        let keys = LevelScreen::levels(&app)
            .iter()
            .map(|l| l.key)
            .collect::<Vec<_>>();
        assert_eq!(keys, LEVEL_CHOICES.to_vec());
    }

    #[test]
    fn test_centered_rows() {
        let area = Rect::new(0, 0, 10, 20);
        assert_eq!(centered_rows(area, 10), Rect::new(0, 5, 10, 10));
        assert_eq!(centered_rows(area, 30), area);
    }
}
