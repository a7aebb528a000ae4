use std::str::FromStr;
use std::time::Duration;

/// Largest digit count used when generating answers; 10^18 still fits in an i64.
const MAX_GENERATED_DIGITS: i64 = 18;

/// Number of questions in every custom session, whatever the user asked for.
pub const CUSTOM_QUESTION_COUNT: u32 = 10;

pub const FEEDBACK_CORRECT: &str = "Correct! ⭕";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LevelKey {
    Easy,
    Normal,
    Hard,
    Custom,
}

impl FromStr for LevelKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(LevelKey::Easy),
            "normal" => Ok(LevelKey::Normal),
            "hard" => Ok(LevelKey::Hard),
            "custom" => Ok(LevelKey::Custom),
            _ => Err(()),
        }
    }
}

/// Immutable difficulty settings for one session
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub key: LevelKey,
    pub label: String,
    /// Signed so that a custom level can carry whatever the user typed
    pub digits: i64,
    pub reveal_duration_ms: i64,
    pub question_count: u32,
}

impl LevelConfig {
    fn builtin(key: LevelKey, label: &str, digits: i64, reveal_duration_ms: i64, question_count: u32) -> Self {
        Self {
            key,
            label: label.to_string(),
            digits,
            reveal_duration_ms,
            question_count,
        }
    }

    pub fn easy() -> Self {
        Self::builtin(LevelKey::Easy, "Easy 🌸", 1, 2000, 10)
    }

    pub fn normal() -> Self {
        Self::builtin(LevelKey::Normal, "Normal 🌿", 2, 1500, 15)
    }

    pub fn hard() -> Self {
        Self::builtin(LevelKey::Hard, "Hard ✨", 3, 1000, 20)
    }

    /// How long the number stays visible. Negative durations hide immediately.
    pub fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.reveal_duration_ms.max(0) as u64)
    }

    /// Inclusive range answers are drawn from.
    ///
    /// A single digit level allows 0; wider levels never produce a leading zero.
    pub fn answer_range(&self) -> (i64, i64) {
        let digits = self.digits.min(MAX_GENERATED_DIGITS);
        if digits <= 1 {
            (0, 9)
        } else {
            (10_i64.pow(digits as u32 - 1), 10_i64.pow(digits as u32) - 1)
        }
    }

    /// Longest answer text accepted from the keypad: one more than the digit count.
    pub fn max_answer_len(&self) -> usize {
        (self.digits.max(0) as usize).saturating_add(1)
    }
}

/// All built-in levels in menu order
pub fn all_builtin() -> Vec<LevelConfig> {
    vec![LevelConfig::easy(), LevelConfig::normal(), LevelConfig::hard()]
}

/// Look a level up by key, falling back to easy for anything unknown.
///
/// `"custom"` also falls back: custom levels only come from [`build_custom`].
pub fn resolve(key: &str) -> LevelConfig {
    match key.parse::<LevelKey>() {
        Ok(LevelKey::Normal) => LevelConfig::normal(),
        Ok(LevelKey::Hard) => LevelConfig::hard(),
        _ => LevelConfig::easy(),
    }
}

/// Build a custom level from user input. No range checks are applied.
pub fn build_custom(digits: i64, seconds: f64) -> LevelConfig {
    LevelConfig {
        key: LevelKey::Custom,
        label: format!("Custom ({} digits, {}s)", digits, seconds),
        digits,
        reveal_duration_ms: (seconds * 1000.0).round() as i64,
        question_count: CUSTOM_QUESTION_COUNT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultMessage {
    Perfect,
    Excellent,
    Good,
    KeepGoing,
}

impl ResultMessage {
    pub fn for_percent(percent: u32) -> Self {
        if percent >= 100 {
            ResultMessage::Perfect
        } else if percent >= 80 {
            ResultMessage::Excellent
        } else if percent >= 50 {
            ResultMessage::Good
        } else {
            ResultMessage::KeepGoing
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            ResultMessage::Perfect => "Amazing... every single one correct! 🎉",
            ResultMessage::Excellent => "Really well done 💖",
            ResultMessage::Good => "Nice try, keep it up 🌿",
            ResultMessage::KeepGoing => "Little by little, you'll get used to it 🐾",
        }
    }
}

pub fn result_message(percent: u32) -> &'static str {
    ResultMessage::for_percent(percent).text()
}

pub fn feedback_message(correct: bool, correct_answer: i64) -> String {
    if correct {
        FEEDBACK_CORRECT.to_string()
    } else {
        format!("Not quite... 😢 the answer was {}", correct_answer)
    }
}
