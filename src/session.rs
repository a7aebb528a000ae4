use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::level::{self, LevelConfig, LevelKey};
use crate::output::{EnterMode, FeedbackKind, OutputSink, Renderer, Screen};
use crate::timer::{Clock, SystemClock, TimerSlot};

pub const INSTRUCTION_TEXT: &str = "Remember the number, then type it in 💡";

/// 3, 2, 1, Start! and how long each one stays up
const COUNTDOWN: [(&str, u64); 4] = [("3", 1000), ("2", 1000), ("1", 1000), ("Start!", 800)];

pub const HOLD_INITIAL_DELAY: Duration = Duration::from_millis(500);
pub const HOLD_REPEAT_INTERVAL: Duration = Duration::from_millis(100);

/// Stepper values stay below 10^MAX_STEPPER_LEN
const MAX_STEPPER_LEN: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Revealing,
    AwaitingAnswer,
    Scored,
}

/// Work waiting in the pacing slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending {
    /// show countdown step `n`, or start the first question once past the end
    Countdown(usize),
    Hide,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(char),
    Delete,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    GoHowTo,
    GoLevel,
    BackStart,
    BackLevel,
    Retry,
    GiveUp,
}

/// User supplied settings for a custom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomParams {
    pub digits: i64,
    pub seconds: f64,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// play 3-2-1-Start before the first question
    pub countdown: bool,
    /// move on by itself this long after scoring; None waits for the learner
    pub auto_advance: Option<Duration>,
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            countdown: true,
            auto_advance: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    pub message: &'static str,
}

/// Mutable state of one game
#[derive(Debug, Clone)]
pub struct SessionState {
    pub level: LevelConfig,
    /// questions started so far; 1-based once a question is live
    pub question_index: u32,
    pub correct_count: u32,
    pub current_answer: i64,
    pub answer_text: String,
    pub phase: Phase,
    pub(crate) pending: TimerSlot<Pending>,
}

impl SessionState {
    pub fn new(level: LevelConfig) -> Self {
        Self {
            level,
            question_index: 0,
            correct_count: 0,
            current_answer: 0,
            answer_text: String::new(),
            phase: Phase::Idle,
            pending: TimerSlot::new(),
        }
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_armed()
    }

    fn question_live(&self) -> bool {
        self.question_index > 0
            && matches!(self.phase, Phase::Revealing | Phase::AwaitingAnswer)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(LevelConfig::easy())
    }
}

/// Owns the question lifecycle and drives the renderer and output sink.
///
/// Deferred work runs from [`SessionController::on_tick`], which the event
/// loop calls regularly; nothing fires on its own.
pub struct SessionController<R: Renderer, O: OutputSink, C: Clock = SystemClock> {
    state: SessionState,
    hold: TimerSlot<StepDirection>,
    custom: Option<CustomParams>,
    result: Option<SessionResult>,
    options: SessionOptions,
    rng: StdRng,
    renderer: R,
    output: O,
    clock: C,
}

impl<R: Renderer, O: OutputSink, C: Clock> SessionController<R, O, C> {
    pub fn new(renderer: R, output: O, clock: C, options: SessionOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: SessionState::default(),
            hold: TimerSlot::new(),
            custom: None,
            result: None,
            options,
            rng,
            renderer,
            output,
            clock,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn level(&self) -> &LevelConfig {
        &self.state.level
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_armed()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Start (or restart) a level. A custom key without parameters falls back
    /// to the easy level like any other unknown key.
    pub fn start_level(&mut self, key: &str, custom: Option<CustomParams>) {
        let level = match (key.parse::<LevelKey>(), custom) {
            (Ok(LevelKey::Custom), Some(params)) => level::build_custom(params.digits, params.seconds),
            (Ok(LevelKey::Custom), None) => {
                warn!("custom level requested without parameters, using easy");
                level::resolve(key)
            }
            _ => level::resolve(key),
        };
        self.custom = if level.key == LevelKey::Custom {
            custom
        } else {
            None
        };

        info!(
            level = %level.key,
            digits = level.digits,
            reveal_ms = level.reveal_duration_ms,
            questions = level.question_count,
            "starting level"
        );

        self.reset(level);
        self.output
            .set_level_label(&format!("Level: {}", self.state.level.label));
        self.output.show_screen(Screen::Game);
        self.begin_countdown_then_first_question();
    }

    fn reset(&mut self, level: LevelConfig) {
        self.state.pending.cancel();
        self.hold.cancel();
        self.state = SessionState::new(level);
        self.result = None;

        self.renderer.clear();
        self.renderer.set_visible(false);
        self.output.set_answer_text("");
        self.output.clear_feedback();
        self.output.set_instruction(None);
        self.output.set_enter_mode(EnterMode::Submit);
    }

    fn begin_countdown_then_first_question(&mut self) {
        self.state.phase = Phase::Revealing;
        if self.options.countdown {
            self.countdown_step(0);
        } else {
            self.advance_to_next_question();
        }
    }

    fn countdown_step(&mut self, step: usize) {
        match COUNTDOWN.get(step) {
            Some(&(text, delay_ms)) => {
                self.output.show_countdown(text);
                let now = self.clock.now();
                self.state.pending.arm(
                    now,
                    Duration::from_millis(delay_ms),
                    Pending::Countdown(step + 1),
                );
            }
            None => self.advance_to_next_question(),
        }
    }

    /// Move to the next question, or finish once every question has been asked.
    /// Does nothing when no session is running.
    pub fn advance_to_next_question(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }

        self.state.pending.cancel();
        self.hold.cancel();
        self.output.clear_feedback();
        self.output.set_enter_mode(EnterMode::Submit);

        if self.state.question_index >= self.state.level.question_count {
            self.finish();
            return;
        }

        let (min, max) = self.state.level.answer_range();
        self.state.question_index += 1;
        self.state.current_answer = self.rng.gen_range(min..=max);
        self.state.answer_text.clear();
        self.state.phase = Phase::Revealing;

        debug!(
            question = self.state.question_index,
            answer = self.state.current_answer,
            "question generated"
        );

        self.output
            .set_question_counter(self.state.question_index, self.state.level.question_count);
        self.output.set_answer_text("");
        self.output.set_instruction(Some(INSTRUCTION_TEXT));
        self.renderer
            .show_value(self.state.current_answer, self.state.level.digits);
        self.renderer.set_visible(true);

        let now = self.clock.now();
        self.state
            .pending
            .arm(now, self.state.level.reveal_duration(), Pending::Hide);
    }

    fn hide_revealed(&mut self) {
        if self.state.phase != Phase::Revealing {
            return;
        }
        debug!(question = self.state.question_index, "hiding number");
        self.renderer.set_visible(false);
        self.state.phase = Phase::AwaitingAnswer;
    }

    /// Run whatever deferred work is due.
    pub fn on_tick(&mut self) {
        let now = self.clock.now();

        if let Some(pending) = self.state.pending.poll(now) {
            match pending {
                Pending::Countdown(step) => self.countdown_step(step),
                Pending::Hide => self.hide_revealed(),
                Pending::Advance => self.advance_to_next_question(),
            }
        }

        // repeats are scheduled from the previous deadline, not from the tick
        let hold_due = self.hold.deadline().unwrap_or(now);
        if let Some(direction) = self.hold.poll(now) {
            if self.step_answer(direction) {
                self.hold.arm(hold_due, HOLD_REPEAT_INTERVAL, direction);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeypadKey) {
        match key {
            KeypadKey::Digit(c) => self.handle_digit_input(c),
            KeypadKey::Delete => self.handle_delete(),
            KeypadKey::Enter => self.handle_enter(),
        }
    }

    /// Append a digit to the answer. Anything that is not 0-9 is ignored.
    pub fn handle_digit_input(&mut self, digit: char) {
        if !self.state.question_live() || !digit.is_ascii_digit() {
            return;
        }
        if self.state.answer_text.len() >= self.state.level.max_answer_len() {
            return;
        }

        if self.state.answer_text == "0" {
            self.state.answer_text = digit.to_string();
        } else {
            self.state.answer_text.push(digit);
        }
        self.output.set_answer_text(&self.state.answer_text);
    }

    pub fn handle_delete(&mut self) {
        if !self.state.question_live() || self.state.answer_text.is_empty() {
            return;
        }
        self.state.answer_text.pop();
        self.output.set_answer_text(&self.state.answer_text);
    }

    /// Enter submits, or moves on once the answer has been scored.
    pub fn handle_enter(&mut self) {
        if self.state.phase == Phase::Scored {
            self.advance_to_next_question();
        } else {
            self.submit_answer();
        }
    }

    /// Score the typed answer. Returns whether it was correct, or None when
    /// submitting is not allowed right now.
    pub fn submit_answer(&mut self) -> Option<bool> {
        if self.state.phase != Phase::AwaitingAnswer || self.state.answer_text.is_empty() {
            return None;
        }

        let correct = is_correct(&self.state.answer_text, self.state.current_answer);
        if correct {
            self.state.correct_count += 1;
        }
        debug!(
            question = self.state.question_index,
            typed = %self.state.answer_text,
            correct,
            "answer submitted"
        );

        self.hold.cancel();
        self.renderer
            .show_value(self.state.current_answer, self.state.level.digits);
        self.renderer.set_visible(true);

        let kind = if correct {
            FeedbackKind::Success
        } else {
            FeedbackKind::Error
        };
        self.output.set_feedback(
            &level::feedback_message(correct, self.state.current_answer),
            kind,
        );
        self.output.set_instruction(None);
        self.output.set_enter_mode(EnterMode::Next);
        self.state.phase = Phase::Scored;

        if let Some(delay) = self.options.auto_advance {
            let now = self.clock.now();
            self.state.pending.arm(now, delay, Pending::Advance);
        }

        Some(correct)
    }

    /// End the session and show the summary. The state stays around for inspection.
    pub fn finish(&mut self) {
        self.state.pending.cancel();
        self.hold.cancel();

        let total = self.state.level.question_count;
        let correct = self.state.correct_count;
        let percent = if total == 0 {
            0
        } else {
            (100.0 * correct as f64 / total as f64).round() as u32
        };
        let message = level::result_message(percent);

        info!(correct, total, percent, "session finished");

        self.output.show_result(correct, total, percent, message);
        self.output.show_screen(Screen::Result);
        self.state.phase = Phase::Idle;
        self.result = Some(SessionResult {
            correct,
            total,
            percent,
            message,
        });
    }

    /// Step once now, then keep stepping while held.
    pub fn press_stepper(&mut self, direction: StepDirection) {
        self.hold.cancel();
        if self.step_answer(direction) {
            let now = self.clock.now();
            self.hold.arm(now, HOLD_INITIAL_DELAY, direction);
        }
    }

    pub fn release_stepper(&mut self) {
        self.hold.cancel();
    }

    pub fn increment_pending_answer(&mut self) -> bool {
        self.step_answer(StepDirection::Up)
    }

    pub fn decrement_pending_answer(&mut self) -> bool {
        self.step_answer(StepDirection::Down)
    }

    fn step_answer(&mut self, direction: StepDirection) -> bool {
        if self.state.phase != Phase::AwaitingAnswer {
            return false;
        }

        let max_len = self.state.level.max_answer_len().min(MAX_STEPPER_LEN);
        let upper = 10_i64.pow(max_len as u32) - 1;
        let current = if self.state.answer_text.is_empty() {
            None
        } else {
            match self.state.answer_text.parse::<i64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    debug!(text = %self.state.answer_text, "answer too long to step");
                    return false;
                }
            }
        };

        let next = match (direction, current) {
            (StepDirection::Up, None) => 1_i64.min(upper),
            (StepDirection::Up, Some(v)) => v.saturating_add(1).min(upper.max(v)),
            (StepDirection::Down, None) => 0,
            (StepDirection::Down, Some(v)) => (v - 1).max(0),
        };

        self.state.answer_text = next.to_string();
        self.output.set_answer_text(&self.state.answer_text);
        true
    }

    pub fn handle_action(&mut self, action: NavAction) {
        debug!(?action, "navigation");
        match action {
            NavAction::GoHowTo => self.output.show_screen(Screen::HowTo),
            NavAction::GoLevel | NavAction::BackLevel => {
                self.abandon();
                self.output.show_screen(Screen::Level);
            }
            NavAction::BackStart | NavAction::GiveUp => {
                self.abandon();
                self.output.show_screen(Screen::Start);
            }
            NavAction::Retry => {
                let key = self.state.level.key.to_string();
                let custom = self.custom;
                self.start_level(&key, custom);
            }
        }
    }

    /// Stop any running session without scoring it.
    fn abandon(&mut self) {
        self.state.pending.cancel();
        self.hold.cancel();
        if self.state.phase != Phase::Idle {
            info!(
                question = self.state.question_index,
                correct = self.state.correct_count,
                "session abandoned"
            );
        }
        self.state.phase = Phase::Idle;
        self.renderer.set_visible(false);
    }
}

fn is_correct(answer_text: &str, expected: i64) -> bool {
    answer_text
        .trim()
        .parse::<i64>()
        .map(|value| value == expected)
        .unwrap_or(false)
}
