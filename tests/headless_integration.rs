use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quizline::{
    app::{App, AppState},
    catalog::{InMemoryCatalog, QuizCatalog},
    quiz::{Question, Quiz},
    runtime::{FixedTicker, QuizEvent, QuizEventSource, Runner, Step, TestEventSource},
    session::{QuizSession, SessionEvent, SessionState, SubmitReason},
    timer::CountdownTimer,
    users::{InMemoryDirectory, Viewer},
};

fn key(c: char) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn question(id: &str, correct: usize) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("{id}?"),
        options: vec!["a".into(), "b".into(), "c".into()],
        correct_answer: correct,
    }
}

fn three_questions() -> Quiz {
    Quiz::new("t", "Three", "Testing").with_questions(vec![
        question("q1", 1),
        question("q2", 0),
        question("q3", 2),
    ])
}

// Headless integration using the internal runtime + App without a TTY
#[test]
fn headless_quiz_flow_submits() {
    let viewer = Viewer::resolve(&InMemoryDirectory::default(), None);
    let mut app = App::new(InMemoryCatalog::new(vec![three_questions()]), viewer, 300);
    app.open("t");
    assert_eq!(app.state, AppState::Taking);

    let (tx, es) = TestEventSource::channel();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    // q1 -> b, q2 -> b (wrong), q3 -> c, then submit and confirm
    for ev in [key('2'), key('n'), key('2'), key('n'), key('3'), key('s'), key('y')] {
        tx.send(ev).unwrap();
    }

    for _ in 0..100u32 {
        match runner.step() {
            Step::Event(QuizEvent::Tick) => app.on_tick(),
            Step::Event(QuizEvent::Key(k)) => {
                app.on_key(k);
            }
            Step::Event(QuizEvent::Resize) | Step::Idle => {}
        }
        if app.state == AppState::Results {
            break;
        }
    }

    let result = app.result.as_ref().expect("quiz should have been graded");
    assert_eq!(result.score, 67);
    assert_eq!(result.correct, 2);
    assert_eq!(result.incorrect(), 1);
}

#[test]
fn headless_timed_session_submits_by_time() {
    let mut session = QuizSession::start(three_questions().with_time_limit(1));
    session.select_answer("q1", 1).unwrap();

    let (_tx, es) = TestEventSource::channel();
    let _timer = CountdownTimer::start(es.sender(), Duration::from_millis(1), || QuizEvent::Tick);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(50)));

    let mut warnings = 0;
    let mut submitted = Vec::new();
    for _ in 0..1000u32 {
        if let Step::Event(QuizEvent::Tick) = runner.step() {
            session.tick();
        }
        for event in session.drain_events() {
            match event {
                SessionEvent::TimeWarning { .. } => warnings += 1,
                SessionEvent::Submitted { score, reason } => submitted.push((score, reason)),
            }
        }
        if session.state() == SessionState::Submitted {
            break;
        }
    }

    assert_eq!(session.state(), SessionState::Submitted, "timed session should finish by timeout");
    assert_eq!(session.remaining_secs(), 0);
    assert_eq!(warnings, 1);
    assert_eq!(submitted, vec![(33, SubmitReason::TimedOut)]);
}

#[test]
fn bundled_quiz_scenarios() {
    let catalog = InMemoryCatalog::bundled().unwrap();
    let quiz = catalog.lookup("1").unwrap();
    let correct: Vec<(String, usize)> = quiz
        .questions
        .iter()
        .map(|q| (q.id.clone(), q.correct_answer))
        .collect();

    let mut perfect = QuizSession::start(quiz.clone());
    for (id, answer) in &correct {
        perfect.select_answer(id, *answer).unwrap();
    }
    assert_eq!(perfect.submit(), 100);

    let mut blank = QuizSession::start(quiz);
    assert_eq!(blank.submit(), 0);
    assert_eq!(blank.submit(), 0);
}
