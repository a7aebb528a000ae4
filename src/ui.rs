pub mod abacus;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn hint_line(hints: &[(&str, &str)]) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        screen::hint_text(hints),
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.screen()).render(self, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use soroban_flash::config::{Config, Overrides, Settings};

    fn app() -> App {
        App::new(Settings::merge(
            &Config::default(),
            &Overrides {
                no_countdown: true,
                seed: Some(11),
                ..Overrides::default()
            },
        ))
    }

    fn draw(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_start_screen_renders_title() {
        let text = draw(&app());
        assert!(text.contains("soroban flash"));
    }

    #[test]
    fn test_level_screen_lists_levels() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        let text = draw(&app);
        assert!(text.contains("Easy"));
        assert!(text.contains("Normal"));
        assert!(text.contains("Hard"));
        assert!(text.contains("Custom"));
    }

    #[test]
    fn test_game_screen_shows_counter_and_beads() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        let text = draw(&app);
        assert!(text.contains("Question 1 / 10"));
        assert!(text.contains('◆'));
    }

    #[test]
    fn test_counter_hidden_during_countdown() {
        let mut app = App::new(Settings::merge(&Config::default(), &Overrides::default()));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        let text = draw(&app);
        assert!(text.contains('3'));
        assert!(!text.contains("Question"));
    }

    #[test]
    fn test_counter_hidden_on_retry_countdown() {
        let mut app = App::new(Settings::merge(&Config::default(), &Overrides::default()));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        // a stale counter from an earlier game
        app.controller.advance_to_next_question();
        app.controller.start_level("easy", None);
        assert!(!draw(&app).contains("Question 1 / 10"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('3'));
        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
    }
}
