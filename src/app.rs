use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::attempt::{open_quiz, AttemptLog, Opened, QuizResult};
use crate::catalog::{list_quizzes, quiz_stats, InMemoryCatalog, ListQuery, QuizCatalog, QuizStats};
use crate::quiz::{Quiz, QuizStatus};
use crate::runtime::QuizEvent;
use crate::session::{QuizSession, SessionEvent};
use crate::timer::CountdownTimer;
use crate::users::Viewer;

/// Countdown resolution of a quiz session
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    List,
    Taking,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    ConfirmSubmit,
    TimeWarning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct ListState {
    pub query: ListQuery,
    pub selected: usize,
    pub searching: bool,
}

/// A running session together with the timer feeding it. Dropping it stops the timer.
pub struct ActiveQuiz {
    pub session: QuizSession,
    timer: Option<CountdownTimer>,
}

impl ActiveQuiz {
    fn stop_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }
}

pub struct App {
    catalog: InMemoryCatalog,
    attempts: AttemptLog,
    pub viewer: Viewer,
    warning_secs: u32,
    ticks: Option<Sender<QuizEvent>>,
    pub state: AppState,
    pub list: ListState,
    pub active: Option<ActiveQuiz>,
    pub result: Option<QuizResult>,
    pub dialog: Option<Dialog>,
    pub notice: Option<String>,
}

impl App {
    pub fn new(catalog: InMemoryCatalog, viewer: Viewer, warning_secs: u32) -> Self {
        Self {
            catalog,
            attempts: AttemptLog::new(),
            viewer,
            warning_secs,
            ticks: None,
            state: AppState::List,
            list: ListState::default(),
            active: None,
            result: None,
            dialog: None,
            notice: None,
        }
    }

    /// Sessions started from now on get a countdown timer sending into `tx`
    pub fn with_ticks(mut self, tx: Sender<QuizEvent>) -> Self {
        self.ticks = Some(tx);
        self
    }

    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.list.query = query;
        self
    }

    pub fn attempts(&self) -> &AttemptLog {
        &self.attempts
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Catalog quizzes with this run's attempts folded into their status once
    /// no retake is left
    pub fn quizzes(&self) -> Vec<Quiz> {
        self.catalog
            .all()
            .into_iter()
            .map(|mut quiz| {
                if let Some(latest) = self.attempts.exhausted(&quiz, self.viewer.id()) {
                    quiz.status = QuizStatus::Completed;
                    quiz.score = Some(latest.score);
                }
                quiz
            })
            .collect()
    }

    pub fn visible_quizzes(&self) -> Vec<Quiz> {
        list_quizzes(&self.quizzes(), &self.list.query)
    }

    pub fn stats(&self) -> QuizStats {
        quiz_stats(&self.quizzes())
    }

    pub fn open(&mut self, quiz_id: &str) {
        self.notice = None;
        match open_quiz(&self.catalog, &self.attempts, &self.viewer, quiz_id) {
            Ok(Opened::Session(session)) => {
                let session = (*session).with_warning_threshold(self.warning_secs);
                let timer = match &self.ticks {
                    Some(tx) if session.is_active() => Some(CountdownTimer::start(
                        tx.clone(),
                        TICK_INTERVAL,
                        || QuizEvent::Tick,
                    )),
                    _ => None,
                };
                self.active = Some(ActiveQuiz { session, timer });
                self.dialog = None;
                self.state = AppState::Taking;
                // a quiz without time is submitted on start
                self.process_session_events();
            }
            Ok(Opened::Review(result)) => {
                self.result = Some(result);
                self.state = AppState::Results;
            }
            Err(err) => {
                tracing::warn!(quiz_id, %err, "cannot open quiz");
                self.notice = Some(err.to_string());
                self.state = AppState::List;
            }
        }
    }

    /// Leave a session without submitting. Nothing is kept.
    pub fn discard(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stop_timer();
            tracing::info!(quiz_id = %active.session.quiz().id, "quiz session discarded");
        }
        self.dialog = None;
        self.state = AppState::List;
    }

    pub fn submit(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.session.submit();
        }
        self.process_session_events();
    }

    pub fn on_tick(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.session.tick();
        }
        self.process_session_events();
    }

    fn process_session_events(&mut self) {
        let events = match self.active.as_mut() {
            Some(active) => active.session.drain_events(),
            None => return,
        };

        for event in events {
            match event {
                SessionEvent::TimeWarning { .. } => {
                    self.dialog = Some(Dialog::TimeWarning);
                }
                SessionEvent::Submitted { .. } => self.finish(),
            }
        }
    }

    fn finish(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.stop_timer();
        self.attempts.record(&self.viewer, &active.session);
        self.result = QuizResult::from_session(&active.session);
        self.dialog = None;
        self.state = AppState::Results;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.discard();
            return Control::Quit;
        }

        match self.state {
            AppState::List => self.on_list_key(key),
            AppState::Taking => {
                self.on_session_key(key);
                Control::Continue
            }
            AppState::Results => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b') | KeyCode::Backspace
                ) {
                    self.result = None;
                    self.state = AppState::List;
                }
                Control::Continue
            }
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) -> Control {
        if self.list.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.list.searching = false,
                KeyCode::Backspace => {
                    self.list.query.search.pop();
                }
                KeyCode::Char(c) => self.list.query.search.push(c),
                _ => {}
            }
            self.list.selected = 0;
            return Control::Continue;
        }

        let count = self.visible_quizzes().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.selected = self.list.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.list.selected + 1 < count {
                    self.list.selected += 1;
                }
            }
            KeyCode::Tab => {
                self.list.query.filter = self.list.query.filter.next();
                self.list.selected = 0;
            }
            KeyCode::Char('o') => {
                self.list.query.sort_by = self.list.query.sort_by.next();
                self.list.selected = 0;
            }
            KeyCode::Char('/') => self.list.searching = true,
            KeyCode::Enter => {
                if let Some(quiz) = self.visible_quizzes().get(self.list.selected) {
                    let id = quiz.id.clone();
                    self.open(&id);
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn on_session_key(&mut self, key: KeyEvent) {
        match self.dialog {
            Some(Dialog::TimeWarning) => {
                self.dialog = None;
                return;
            }
            Some(Dialog::ConfirmSubmit) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => self.submit(),
                    KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                    _ => {}
                }
                return;
            }
            None => {}
        }

        let Some(active) = self.active.as_mut() else {
            return;
        };
        let session = &mut active.session;

        match key.code {
            KeyCode::Esc => self.discard(),
            KeyCode::Left | KeyCode::Char('p') => session.previous_question(),
            KeyCode::Right | KeyCode::Char('n') => session.next_question(),
            KeyCode::Home => {
                let _ = session.go_to_question(0);
            }
            KeyCode::End => {
                let last = session.quiz().question_count().saturating_sub(1);
                let _ = session.go_to_question(last);
            }
            KeyCode::Char('u') => {
                let next_open = session
                    .quiz()
                    .questions
                    .iter()
                    .position(|q| session.selected(&q.id).is_none());
                if let Some(index) = next_open {
                    let _ = session.go_to_question(index);
                }
            }
            KeyCode::Char('s') => self.dialog = Some(Dialog::ConfirmSubmit),
            KeyCode::Enter if session.is_last_question() => {
                self.dialog = Some(Dialog::ConfirmSubmit)
            }
            KeyCode::Enter => session.next_question(),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let option = c as usize - '1' as usize;
                if let Err(err) = session.select_current(option) {
                    tracing::debug!(%err, "answer rejected");
                }
            }
            _ => {}
        }
    }
}
