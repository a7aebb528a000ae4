//! Collaborators the session controller drives.
//!
//! Both traits are called synchronously and must not call back into the
//! controller. Every method has an empty default body so a front end only
//! implements what it actually shows; `Option<T>` implementations stand in
//! for a target that may be missing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Screen {
    Start,
    HowTo,
    Level,
    Game,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// What the enter control currently does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterMode {
    #[default]
    Submit,
    Next,
}

/// Draws the abacus
pub trait Renderer {
    /// Draw `value` across `digits` rods.
    fn show_value(&mut self, _value: i64, _digits: i64) {}
    fn clear(&mut self) {}
    /// Show or hide what was last drawn without changing it.
    fn set_visible(&mut self, _visible: bool) {}
}

/// Everything textual the learner sees
pub trait OutputSink {
    fn set_level_label(&mut self, _text: &str) {}
    fn set_question_counter(&mut self, _current: u32, _total: u32) {}
    fn set_answer_text(&mut self, _text: &str) {}
    fn set_feedback(&mut self, _text: &str, _kind: FeedbackKind) {}
    fn clear_feedback(&mut self) {}
    fn show_result(&mut self, _correct: u32, _total: u32, _percent: u32, _message: &str) {}
    fn show_screen(&mut self, _screen: Screen) {}
    fn show_countdown(&mut self, _text: &str) {}
    fn set_instruction(&mut self, _text: Option<&str>) {}
    fn set_enter_mode(&mut self, _mode: EnterMode) {}
}

impl<R: Renderer> Renderer for Option<R> {
    fn show_value(&mut self, value: i64, digits: i64) {
        if let Some(r) = self {
            r.show_value(value, digits);
        }
    }

    fn clear(&mut self) {
        if let Some(r) = self {
            r.clear();
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(r) = self {
            r.set_visible(visible);
        }
    }
}

impl<O: OutputSink> OutputSink for Option<O> {
    fn set_level_label(&mut self, text: &str) {
        if let Some(o) = self {
            o.set_level_label(text);
        }
    }

    fn set_question_counter(&mut self, current: u32, total: u32) {
        if let Some(o) = self {
            o.set_question_counter(current, total);
        }
    }

    fn set_answer_text(&mut self, text: &str) {
        if let Some(o) = self {
            o.set_answer_text(text);
        }
    }

    fn set_feedback(&mut self, text: &str, kind: FeedbackKind) {
        if let Some(o) = self {
            o.set_feedback(text, kind);
        }
    }

    fn clear_feedback(&mut self) {
        if let Some(o) = self {
            o.clear_feedback();
        }
    }

    fn show_result(&mut self, correct: u32, total: u32, percent: u32, message: &str) {
        if let Some(o) = self {
            o.show_result(correct, total, percent, message);
        }
    }

    fn show_screen(&mut self, screen: Screen) {
        if let Some(o) = self {
            o.show_screen(screen);
        }
    }

    fn show_countdown(&mut self, text: &str) {
        if let Some(o) = self {
            o.show_countdown(text);
        }
    }

    fn set_instruction(&mut self, text: Option<&str>) {
        if let Some(o) = self {
            o.set_instruction(text);
        }
    }

    fn set_enter_mode(&mut self, mode: EnterMode) {
        if let Some(o) = self {
            o.set_enter_mode(mode);
        }
    }
}

/// Abacus state as the terminal front end sees it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbacusView {
    pub value: Option<i64>,
    pub digits: i64,
    pub visible: bool,
    /// number of show_value calls, handy for asserting redraws
    pub draws: usize,
}

impl Renderer for AbacusView {
    fn show_value(&mut self, value: i64, digits: i64) {
        self.value = Some(value);
        self.digits = digits;
        self.draws += 1;
    }

    fn clear(&mut self) {
        self.value = None;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    pub message: String,
}

/// Text model backing every screen of the terminal front end
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenModel {
    pub screen: Screen,
    pub level_label: String,
    pub question_counter: Option<(u32, u32)>,
    pub answer_text: String,
    pub feedback: Option<(String, FeedbackKind)>,
    pub countdown: Option<String>,
    pub instruction: Option<String>,
    pub enter_mode: EnterMode,
    pub result: Option<ResultSummary>,
}

impl Default for ScreenModel {
    fn default() -> Self {
        Self {
            screen: Screen::Start,
            level_label: String::new(),
            question_counter: None,
            answer_text: String::new(),
            feedback: None,
            countdown: None,
            instruction: None,
            enter_mode: EnterMode::Submit,
            result: None,
        }
    }
}

impl OutputSink for ScreenModel {
    fn set_level_label(&mut self, text: &str) {
        self.level_label = text.to_string();
    }

    fn set_question_counter(&mut self, current: u32, total: u32) {
        self.question_counter = Some((current, total));
        self.countdown = None;
    }

    fn set_answer_text(&mut self, text: &str) {
        self.answer_text = text.to_string();
    }

    fn set_feedback(&mut self, text: &str, kind: FeedbackKind) {
        self.feedback = Some((text.to_string(), kind));
    }

    fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    fn show_result(&mut self, correct: u32, total: u32, percent: u32, message: &str) {
        self.result = Some(ResultSummary {
            correct,
            total,
            percent,
            message: message.to_string(),
        });
    }

    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    fn show_countdown(&mut self, text: &str) {
        self.countdown = Some(text.to_string());
    }

    fn set_instruction(&mut self, text: Option<&str>) {
        self.instruction = text.map(str::to_string);
    }

    fn set_enter_mode(&mut self, mode: EnterMode) {
        self.enter_mode = mode;
    }
}
