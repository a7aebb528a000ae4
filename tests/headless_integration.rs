use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use soroban_flash::level::{self, LevelKey, ResultMessage};
use soroban_flash::output::{AbacusView, FeedbackKind, Screen, ScreenModel};
use soroban_flash::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use soroban_flash::session::{KeypadKey, Phase, SessionController, SessionOptions};
use soroban_flash::timer::ManualClock;

type Controller = SessionController<AbacusView, ScreenModel, ManualClock>;

fn controller(countdown: bool, seed: u64) -> (Controller, ManualClock) {
    let clock = ManualClock::new();
    let c = SessionController::new(
        AbacusView::default(),
        ScreenModel::default(),
        clock.clone(),
        SessionOptions {
            countdown,
            auto_advance: None,
            seed: Some(seed),
        },
    );
    (c, clock)
}

fn wait_for_hide(c: &mut Controller, clock: &ManualClock) {
    clock.advance(c.level().reveal_duration());
    c.on_tick();
    assert_eq!(c.phase(), Phase::AwaitingAnswer);
}

fn type_text(c: &mut Controller, text: &str) {
    for ch in text.chars() {
        c.handle_key(KeypadKey::Digit(ch));
    }
}

// Full easy session answered perfectly, including the countdown
#[test]
fn easy_session_all_correct_is_perfect() {
    let (mut c, clock) = controller(true, 1);
    c.start_level("easy", None);

    // 3, 2, 1, Start!
    for _ in 0..4 {
        clock.advance_ms(1000);
        c.on_tick();
    }
    assert_eq!(c.state().question_index, 1);

    for q in 1..=10 {
        assert_eq!(c.state().question_index, q);
        wait_for_hide(&mut c, &clock);

        let answer = c.state().current_answer.to_string();
        type_text(&mut c, &answer);
        c.handle_key(KeypadKey::Enter);
        assert_eq!(c.phase(), Phase::Scored);
        assert_eq!(c.state().correct_count, q);

        c.handle_key(KeypadKey::Enter);
    }

    assert!(c.is_finished());
    let result = c.result().unwrap();
    assert_eq!(result.correct, 10);
    assert_eq!(result.total, 10);
    assert_eq!(result.percent, 100);
    assert_eq!(result.message, ResultMessage::Perfect.text());
    assert_eq!(c.output().screen, Screen::Result);
    assert_eq!(
        c.output().result.as_ref().map(|r| r.message.as_str()),
        Some(ResultMessage::Perfect.text())
    );
}

#[test]
fn normal_session_two_digit_answer() {
    let (mut c, clock) = controller(false, 42);
    c.start_level("normal", None);
    assert_eq!(c.level().digits, 2);

    let answer = c.state().current_answer;
    assert!((10..=99).contains(&answer));
    wait_for_hide(&mut c, &clock);

    let text = answer.to_string();
    let mut chars = text.chars();
    c.handle_digit_input(chars.next().unwrap());
    c.handle_digit_input(chars.next().unwrap());
    assert_eq!(c.state().answer_text, text);

    assert_eq!(c.submit_answer(), Some(true));
    assert_eq!(c.state().correct_count, 1);
    assert_eq!(c.phase(), Phase::Scored);
    assert_matches!(c.output().feedback, Some((_, FeedbackKind::Success)));
    assert!(c.renderer().visible);
    assert_eq!(c.renderer().value, Some(answer));
}

#[test]
fn empty_submit_leaves_score_alone() {
    let (mut c, clock) = controller(false, 5);
    c.start_level("hard", None);
    wait_for_hide(&mut c, &clock);

    assert_eq!(c.state().answer_text, "");
    assert_eq!(c.submit_answer(), None);
    assert_eq!(c.state().correct_count, 0);
    assert_eq!(c.phase(), Phase::AwaitingAnswer);
}

#[test]
fn wrong_answer_on_single_digit_level_with_slack_digit() {
    let (mut c, clock) = controller(false, 9);
    c.start_level("easy", None);
    wait_for_hide(&mut c, &clock);

    // two digits fit on a one digit level and are simply wrong
    type_text(&mut c, "12");
    assert_eq!(c.state().answer_text, "12");
    assert_eq!(c.submit_answer(), Some(false));
    assert_eq!(c.state().correct_count, 0);
    let expected = level::feedback_message(false, c.state().current_answer);
    assert_eq!(
        c.output().feedback,
        Some((expected, FeedbackKind::Error))
    );
}

#[test]
fn question_index_stops_at_question_count() {
    let (mut c, _) = controller(false, 3);
    c.start_level("hard", None);

    let mut last = c.state().question_index;
    while !c.is_finished() {
        c.advance_to_next_question();
        let now = c.state().question_index;
        if !c.is_finished() {
            assert_eq!(now, last + 1);
        }
        last = now;
    }

    assert_eq!(c.state().question_index, 20);
    assert_eq!(c.result().unwrap().percent, 0);
    assert_eq!(c.result().unwrap().message, ResultMessage::KeepGoing.text());
}

#[test]
fn custom_level_round_trip() {
    let (mut c, clock) = controller(false, 8);
    let params = soroban_flash::session::CustomParams {
        digits: 3,
        seconds: 2.5,
    };
    c.start_level("custom", Some(params));
    assert_eq!(c.level().key, LevelKey::Custom);
    assert_eq!(c.level().reveal_duration_ms, 2500);
    assert_eq!(c.level().question_count, 10);

    clock.advance_ms(2499);
    c.on_tick();
    assert_eq!(c.phase(), Phase::Revealing);
    clock.advance_ms(1);
    c.on_tick();
    assert_eq!(c.phase(), Phase::AwaitingAnswer);
}

// Drive the controller from the runtime the way the binary does
#[test]
fn runner_driven_flow_scores_answer() {
    let (mut c, clock) = controller(false, 21);
    c.start_level("easy", None);
    let answer = c.state().current_answer.to_string();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    let mut scored = false;
    for _ in 0..200u32 {
        match runner.step() {
            AppEvent::Tick => {
                clock.advance_ms(50);
                c.on_tick();
                if c.phase() == Phase::AwaitingAnswer && c.state().answer_text.is_empty() {
                    for ch in answer.chars() {
                        tx.send(AppEvent::Key(KeyEvent::new(
                            KeyCode::Char(ch),
                            KeyModifiers::NONE,
                        )))
                        .unwrap();
                    }
                    tx.send(AppEvent::Key(KeyEvent::new(
                        KeyCode::Enter,
                        KeyModifiers::NONE,
                    )))
                    .unwrap();
                }
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Char(ch) => c.handle_key(KeypadKey::Digit(ch)),
                KeyCode::Enter => {
                    c.handle_key(KeypadKey::Enter);
                    scored = true;
                    break;
                }
                _ => {}
            },
        }
    }

    assert!(scored, "answer should have been submitted");
    assert_eq!(c.phase(), Phase::Scored);
    assert_eq!(c.state().correct_count, 1);
}
