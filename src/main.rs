mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use soroban_flash::{
    app_dirs::AppDirs,
    error::AppError,
    config::{Config, ConfigStore, FileConfigStore, Overrides, Settings},
    level::LevelKey,
    logging,
    output::{AbacusView, Screen, ScreenModel},
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    session::{CustomParams, KeypadKey, NavAction, SessionController, StepDirection},
    timer::SystemClock,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

/// flash an abacus, then type the number you saw
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A flash-card abacus trainer: a number is shown as soroban beads for a moment, then hidden, and you type it back in."
)]
pub struct Cli {
    /// level to preselect (easy, normal, hard, custom)
    #[clap(short = 'l', long)]
    level: Option<String>,

    /// digits per number on the custom level
    #[clap(short = 'd', long, allow_negative_numbers = true)]
    digits: Option<i64>,

    /// seconds the number stays visible on the custom level
    #[clap(short = 's', long, allow_negative_numbers = true)]
    seconds: Option<f64>,

    /// skip the 3-2-1 countdown before the first question
    #[clap(long)]
    no_countdown: bool,

    /// go to the next question by itself this many milliseconds after answering
    #[clap(long, value_name = "MS")]
    auto_advance: Option<u64>,

    /// seed the question generator for a repeatable run
    #[clap(long)]
    seed: Option<u64>,

    /// start the selected level right away instead of showing the start screen
    #[clap(short = 'p', long)]
    play: bool,

    /// write logs to a file (defaults to the state directory when no path is given)
    #[clap(long, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// store the effective settings in the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn to_overrides(&self) -> Overrides {
        Overrides {
            level: self.level.clone(),
            custom_digits: self.digits,
            custom_seconds: self.seconds,
            no_countdown: self.no_countdown,
            auto_advance_ms: self.auto_advance,
            seed: self.seed,
        }
    }

    fn log_path(&self) -> Option<PathBuf> {
        match &self.log_file {
            Some(Some(path)) => Some(path.clone()),
            Some(None) => AppDirs::log_path(),
            None => None,
        }
    }
}

/// Choices on the level screen, top to bottom
pub const LEVEL_CHOICES: [LevelKey; 4] = [
    LevelKey::Easy,
    LevelKey::Normal,
    LevelKey::Hard,
    LevelKey::Custom,
];

const CUSTOM_SECONDS_STEP: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct LevelMenu {
    pub selected: usize,
    pub custom: CustomParams,
}

impl LevelMenu {
    fn new(settings: &Settings) -> Self {
        let selected = settings
            .level
            .parse::<LevelKey>()
            .ok()
            .and_then(|key| LEVEL_CHOICES.iter().position(|k| *k == key))
            .unwrap_or(0);
        Self {
            selected,
            custom: settings.custom,
        }
    }

    pub fn selected_key(&self) -> LevelKey {
        LEVEL_CHOICES[self.selected]
    }

    fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn down(&mut self) {
        self.selected = (self.selected + 1).min(LEVEL_CHOICES.len() - 1);
    }

    fn adjust_digits(&mut self, delta: i64) {
        self.custom.digits = (self.custom.digits + delta).max(1);
    }

    fn adjust_seconds(&mut self, delta: f64) {
        self.custom.seconds = (self.custom.seconds + delta).max(CUSTOM_SECONDS_STEP);
    }
}

pub type Controller = SessionController<AbacusView, ScreenModel, SystemClock>;

pub struct App {
    pub controller: Controller,
    pub level_menu: LevelMenu,
    /// the terminal reports key releases, so held arrows can auto-repeat
    pub keyboard_enhanced: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let controller = SessionController::new(
            AbacusView::default(),
            ScreenModel::default(),
            SystemClock,
            settings.session_options(),
        );
        Self {
            controller,
            level_menu: LevelMenu::new(&settings),
            keyboard_enhanced: false,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.controller.output().screen
    }

    fn start_selected_level(&mut self) {
        let key = self.level_menu.selected_key();
        let custom = (key == LevelKey::Custom).then_some(self.level_menu.custom);
        self.controller.start_level(&key.to_string(), custom);
    }

    pub fn on_tick(&mut self) {
        self.controller.on_tick();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Up | KeyCode::Down) && self.screen() == Screen::Game {
            self.on_stepper_key(key);
            return;
        }
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen() {
            Screen::Start => match key.code {
                KeyCode::Enter | KeyCode::Char('s') => {
                    self.controller.handle_action(NavAction::GoLevel)
                }
                KeyCode::Char('h') => self.controller.handle_action(NavAction::GoHowTo),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Screen::HowTo => match key.code {
                KeyCode::Enter | KeyCode::Char('l') => {
                    self.controller.handle_action(NavAction::GoLevel)
                }
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.controller.handle_action(NavAction::BackStart)
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Screen::Level => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.level_menu.up(),
                KeyCode::Down | KeyCode::Char('j') => self.level_menu.down(),
                KeyCode::Left => self.level_menu.adjust_digits(-1),
                KeyCode::Right => self.level_menu.adjust_digits(1),
                KeyCode::Char('-') => self.level_menu.adjust_seconds(-CUSTOM_SECONDS_STEP),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    self.level_menu.adjust_seconds(CUSTOM_SECONDS_STEP)
                }
                KeyCode::Char(c @ '1'..='4') => {
                    self.level_menu.selected = (c as usize) - ('1' as usize);
                    self.start_selected_level();
                }
                KeyCode::Enter => self.start_selected_level(),
                KeyCode::Char('h') => self.controller.handle_action(NavAction::GoHowTo),
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.controller.handle_action(NavAction::BackStart)
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Screen::Game => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    self.controller.handle_key(KeypadKey::Digit(c))
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    self.controller.handle_key(KeypadKey::Delete)
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.controller.handle_key(KeypadKey::Enter),
                KeyCode::Esc => self.controller.handle_action(NavAction::GiveUp),
                _ => {}
            },
            Screen::Result => match key.code {
                KeyCode::Enter | KeyCode::Char('r') => {
                    self.controller.handle_action(NavAction::Retry)
                }
                KeyCode::Char('l') | KeyCode::Char('b') => {
                    self.controller.handle_action(NavAction::BackLevel)
                }
                KeyCode::Esc => self.controller.handle_action(NavAction::BackStart),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    /// Up/Down on the game screen drive the stepper. With release events the
    /// key can be held and the hold timer sets the pace, so the terminal's
    /// repeats are dropped. Otherwise each press is one step and the
    /// terminal's own key repeat does the rest.
    fn on_stepper_key(&mut self, key: KeyEvent) {
        let direction = if key.code == KeyCode::Up {
            StepDirection::Up
        } else {
            StepDirection::Down
        };

        match (key.kind, self.keyboard_enhanced) {
            (KeyEventKind::Release, _) => self.controller.release_stepper(),
            (KeyEventKind::Repeat, true) => {}
            (_, true) => self.controller.press_stepper(direction),
            (_, false) => {
                self.controller.press_stepper(direction);
                self.controller.release_stepper();
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_path() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        logging::init_logging(Some(&path))?;
    }

    let store = FileConfigStore::new();
    let config = store.load();
    let settings = Settings::merge(&config, &cli.to_overrides());
    if cli.save_config {
        if let Err(e) = store.save(&Config::from(&settings)) {
            warn!(error = %e, "could not save config");
        }
    }
    info!(?settings, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    app.keyboard_enhanced = keyboard_enhanced;
    if cli.play {
        app.start_selected_level();
    }
    let outcome = start_tui(&mut terminal, &mut app);

    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome?;
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), AppError> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    run_loop(&runner, app, |app| {
        terminal.draw(|f| f.render_widget(app, f.area()))?;
        Ok(())
    })
}

/// Feed events and ticks to the app until it asks to quit, redrawing after each
fn run_loop<E: EventSource, T: Ticker>(
    runner: &Runner<E, T>,
    app: &mut App,
    mut draw: impl FnMut(&App) -> Result<(), AppError>,
) -> Result<(), AppError> {
    draw(app)?;

    loop {
        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => app.on_key(key),
        }

        if app.should_quit {
            break;
        }

        draw(app)?;
    }

    Ok(())
}
