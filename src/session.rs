use std::collections::HashMap;

use serde::Serialize;

use crate::error::SessionError;
use crate::quiz::{Question, Quiz};

/// Remaining time at which the one-off time warning fires.
pub const TIME_WARNING_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    #[strum(serialize = "submitted")]
    Manual,
    #[strum(serialize = "time ran out")]
    TimedOut,
}

/// Notifications for the presentation layer, collected via [`QuizSession::drain_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TimeWarning { remaining_secs: u32 },
    Submitted { score: u32, reason: SubmitReason },
}

/// Everything needed to render the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub quiz_id: String,
    pub current_index: usize,
    pub question_count: usize,
    pub remaining_secs: u32,
    pub answers: HashMap<String, usize>,
    pub state: SessionState,
    pub score: Option<u32>,
}

impl SessionSnapshot {
    pub fn answered(&self) -> usize {
        self.answers.len()
    }
}

/// One user's attempt at a quiz: countdown, question pointer and answers
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    current_index: usize,
    answers: HashMap<String, usize>,
    remaining_secs: u32,
    state: SessionState,
    score: Option<u32>,
    submit_reason: Option<SubmitReason>,
    warning_threshold: u32,
    warned: bool,
    pending: Vec<SessionEvent>,
}

impl QuizSession {
    pub fn start(quiz: Quiz) -> Self {
        let remaining_secs = quiz.time_limit_secs();
        tracing::info!(
            quiz_id = %quiz.id,
            questions = quiz.question_count(),
            remaining_secs,
            "quiz session started"
        );

        let mut session = Self {
            quiz,
            current_index: 0,
            answers: HashMap::new(),
            remaining_secs,
            state: SessionState::Active,
            score: None,
            submit_reason: None,
            warning_threshold: TIME_WARNING_SECS,
            warned: false,
            pending: Vec::new(),
        };
        if remaining_secs == 0 {
            session.finish(SubmitReason::TimedOut);
        }
        session
    }

    pub fn with_warning_threshold(mut self, secs: u32) -> Self {
        self.warning_threshold = secs;
        self
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current_index)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// At or below the warning threshold
    pub fn is_low_on_time(&self) -> bool {
        self.remaining_secs <= self.warning_threshold
    }

    pub fn answers(&self) -> &HashMap<String, usize> {
        &self.answers
    }

    pub fn selected(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submit_reason
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.quiz.question_count()
    }

    pub fn select_answer(&mut self, question_id: &str, option: usize) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Closed);
        }

        let question = self
            .quiz
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;

        if option >= question.option_count() {
            return Err(SessionError::OptionOutOfRange {
                question_id: question_id.to_string(),
                option,
                count: question.option_count(),
            });
        }

        tracing::debug!(question_id, option, "answer selected");
        self.answers.insert(question_id.to_string(), option);
        Ok(())
    }

    /// Select an option on the question currently shown
    pub fn select_current(&mut self, option: usize) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Closed);
        }
        let id = match self.current_question() {
            Some(q) => q.id.clone(),
            None => {
                return Err(SessionError::InvalidQuestionIndex {
                    index: self.current_index,
                    count: 0,
                })
            }
        };
        self.select_answer(&id, option)
    }

    pub fn go_to_question(&mut self, index: usize) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Closed);
        }

        let count = self.quiz.question_count();
        if index >= count {
            return Err(SessionError::InvalidQuestionIndex { index, count });
        }

        self.current_index = index;
        Ok(())
    }

    pub fn next_question(&mut self) {
        if self.is_active() && !self.is_last_question() {
            self.current_index += 1;
        }
    }

    pub fn previous_question(&mut self) {
        if self.is_active() && self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if self.remaining_secs == 0 {
            self.finish(SubmitReason::TimedOut);
            return;
        }

        if !self.warned && self.remaining_secs <= self.warning_threshold {
            self.warned = true;
            tracing::info!(remaining_secs = self.remaining_secs, "time warning");
            self.pending.push(SessionEvent::TimeWarning {
                remaining_secs: self.remaining_secs,
            });
        }
    }

    /// Grade and freeze the session. Repeated calls return the first score.
    pub fn submit(&mut self) -> u32 {
        self.finish(SubmitReason::Manual)
    }

    fn finish(&mut self, reason: SubmitReason) -> u32 {
        if let Some(score) = self.score {
            return score;
        }

        let score = grade(&self.quiz, &self.answers);
        self.score = Some(score);
        self.submit_reason = Some(reason);
        self.state = SessionState::Submitted;
        self.pending.push(SessionEvent::Submitted { score, reason });

        tracing::info!(
            quiz_id = %self.quiz.id,
            score,
            answered = self.answers.len(),
            %reason,
            "quiz submitted"
        );
        score
    }

    pub fn correct_count(&self) -> usize {
        correct_count(&self.quiz, &self.answers)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            quiz_id: self.quiz.id.clone(),
            current_index: self.current_index,
            question_count: self.quiz.question_count(),
            remaining_secs: self.remaining_secs,
            answers: self.answers.clone(),
            state: self.state,
            score: self.score,
        }
    }
}

fn correct_count(quiz: &Quiz, answers: &HashMap<String, usize>) -> usize {
    quiz.questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|&a| q.is_correct(a)))
        .count()
}

/// Percentage of correctly answered questions, rounded half up. Empty quizzes score 0.
pub fn grade(quiz: &Quiz, answers: &HashMap<String, usize>) -> u32 {
    let total = quiz.question_count();
    if total == 0 {
        return 0;
    }
    let correct = correct_count(quiz, answers);
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::sample_question;
    use assert_matches::assert_matches;

    fn three_question_quiz() -> Quiz {
        Quiz::new("1", "Fundamentals", "Deep Learning").with_questions(vec![
            sample_question("q1", 4, 1),
            sample_question("q2", 4, 0),
            sample_question("q3", 4, 2),
        ])
    }

    fn answer_all(session: &mut QuizSession, picks: &[usize]) {
        for (i, pick) in picks.iter().enumerate() {
            session.select_answer(&format!("q{}", i + 1), *pick).unwrap();
        }
    }

    #[test]
    fn test_start_initial_state() {
        let session = QuizSession::start(three_question_quiz().with_time_limit(30));

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_secs(), 1800);
        assert!(session.answers().is_empty());
        assert_eq!(session.score(), None);
    }

    #[test]
    fn test_start_defaults_remaining_time() {
        let session = QuizSession::start(three_question_quiz());
        assert_eq!(session.remaining_secs(), 1800);
    }

    #[test]
    fn test_zero_time_limit_submits_on_start() {
        let mut session = QuizSession::start(three_question_quiz().with_time_limit(0));

        assert_eq!(session.state(), SessionState::Submitted);
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.score(), Some(0));
        assert_eq!(
            session.select_answer("q1", 1),
            Err(SessionError::Closed)
        );
        assert!(session.answers().is_empty());
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::Submitted {
                score: 0,
                reason: SubmitReason::TimedOut
            }]
        );
    }

    #[test]
    fn test_all_correct_scores_100() {
        let mut session = QuizSession::start(three_question_quiz());
        answer_all(&mut session, &[1, 0, 2]);
        assert_eq!(session.submit(), 100);
    }

    #[test]
    fn test_one_wrong_scores_67() {
        let mut session = QuizSession::start(three_question_quiz());
        answer_all(&mut session, &[1, 1, 2]);
        assert_eq!(session.submit(), 67);
    }

    #[test]
    fn test_single_correct_scores_33() {
        let mut session = QuizSession::start(three_question_quiz());
        session.select_answer("q1", 1).unwrap();
        assert_eq!(session.submit(), 33);
    }

    #[test]
    fn test_no_answers_scores_0() {
        let mut session = QuizSession::start(three_question_quiz());
        assert_eq!(session.submit(), 0);
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn test_empty_quiz_scores_0() {
        let mut session = QuizSession::start(Quiz::new("e", "Empty", "None"));
        assert!(session.current_question().is_none());
        assert_matches!(
            session.go_to_question(0),
            Err(SessionError::InvalidQuestionIndex { index: 0, count: 0 })
        );
        assert_eq!(session.submit(), 0);
    }

    #[test]
    fn test_score_stays_in_range_for_every_pattern() {
        let quiz = three_question_quiz();
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    let mut session = QuizSession::start(quiz.clone());
                    answer_all(&mut session, &[a, b, c]);
                    let score = session.submit();
                    assert!(score <= 100);
                    assert!([0, 33, 67, 100].contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_submit_is_idempotent() {
        let mut session = QuizSession::start(three_question_quiz());
        answer_all(&mut session, &[1, 1, 2]);

        let first = session.submit();
        let snapshot = session.snapshot();
        let events = session.drain_events();
        assert_eq!(events.len(), 1);

        let second = session.submit();
        assert_eq!(first, second);
        assert_eq!(session.snapshot(), snapshot);
        assert!(session.drain_events().is_empty());
        assert_eq!(session.submit_reason(), Some(SubmitReason::Manual));
    }

    #[test]
    fn test_answers_frozen_after_submit() {
        let mut session = QuizSession::start(three_question_quiz());
        session.select_answer("q1", 1).unwrap();
        session.submit();

        assert_eq!(session.select_answer("q2", 0), Err(SessionError::Closed));
        assert_eq!(session.go_to_question(1), Err(SessionError::Closed));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.selected("q2"), None);
    }

    #[test]
    fn test_select_answer_rejects_out_of_range_option() {
        let mut session = QuizSession::start(three_question_quiz());
        session.select_answer("q1", 2).unwrap();

        assert_matches!(
            session.select_answer("q1", 4),
            Err(SessionError::OptionOutOfRange { option: 4, count: 4, .. })
        );
        assert_eq!(session.selected("q1"), Some(2));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn test_select_answer_rejects_unknown_question() {
        let mut session = QuizSession::start(three_question_quiz());
        assert_eq!(
            session.select_answer("q42", 0),
            Err(SessionError::UnknownQuestion("q42".to_string()))
        );
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_select_answer_upserts() {
        let mut session = QuizSession::start(three_question_quiz());
        session.select_answer("q1", 0).unwrap();
        session.select_answer("q1", 3).unwrap();
        assert_eq!(session.selected("q1"), Some(3));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn test_select_current_follows_navigation() {
        let mut session = QuizSession::start(three_question_quiz());
        session.go_to_question(2).unwrap();
        session.select_current(2).unwrap();
        assert_eq!(session.selected("q3"), Some(2));
    }

    #[test]
    fn test_navigation_bounds() {
        let mut session = QuizSession::start(three_question_quiz());

        assert_matches!(
            session.go_to_question(3),
            Err(SessionError::InvalidQuestionIndex { index: 3, count: 3 })
        );
        assert_eq!(session.current_index(), 0);

        session.previous_question();
        assert_eq!(session.current_index(), 0);

        session.next_question();
        session.next_question();
        session.next_question();
        assert_eq!(session.current_index(), 2);
        assert!(session.is_last_question());
    }

    #[test]
    fn test_tick_decrements() {
        let mut session = QuizSession::start(three_question_quiz().with_time_limit(1));
        session.tick();
        assert_eq!(session.remaining_secs(), 59);
    }

    #[test]
    fn test_timeout_auto_submits_with_current_answers() {
        let mut session = QuizSession::start(three_question_quiz().with_time_limit(1));
        session.select_answer("q1", 1).unwrap();
        session.select_answer("q2", 0).unwrap();

        for _ in 0..60 {
            session.tick();
        }

        assert_eq!(session.state(), SessionState::Submitted);
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.score(), Some(67));
        assert_eq!(session.submit_reason(), Some(SubmitReason::TimedOut));

        let submitted: Vec<_> = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Submitted { .. }))
            .collect();
        assert_eq!(
            submitted,
            vec![SessionEvent::Submitted {
                score: 67,
                reason: SubmitReason::TimedOut
            }]
        );
    }

    #[test]
    fn test_ticks_after_submit_are_ignored() {
        let mut session = QuizSession::start(three_question_quiz());
        session.submit();
        let remaining = session.remaining_secs();
        session.tick();
        session.tick();
        assert_eq!(session.remaining_secs(), remaining);
    }

    #[test]
    fn test_manual_then_timeout_submits_once() {
        let mut session = QuizSession::start(three_question_quiz().with_time_limit(1));
        session.submit();
        for _ in 0..120 {
            session.tick();
        }
        let events = session.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(session.submit_reason(), Some(SubmitReason::Manual));
    }

    #[test]
    fn test_time_warning_fires_exactly_once() {
        let mut session = QuizSession::start(three_question_quiz());
        while session.remaining_secs() > 310 {
            session.tick();
        }
        assert!(session.drain_events().is_empty());

        let mut warnings = 0;
        let mut submissions = 0;
        for _ in 0..400 {
            session.tick();
            for event in session.drain_events() {
                match event {
                    SessionEvent::TimeWarning { remaining_secs } => {
                        assert_eq!(remaining_secs, 300);
                        warnings += 1;
                    }
                    SessionEvent::Submitted { .. } => submissions += 1,
                }
            }
        }

        assert_eq!(warnings, 1);
        assert_eq!(submissions, 1);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn test_custom_warning_threshold() {
        let mut session =
            QuizSession::start(three_question_quiz().with_time_limit(1)).with_warning_threshold(10);
        for _ in 0..49 {
            session.tick();
        }
        assert!(session.drain_events().is_empty());
        session.tick();
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::TimeWarning { remaining_secs: 10 }]
        );
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = QuizSession::start(three_question_quiz());
        session.go_to_question(1).unwrap();
        session.select_answer("q2", 0).unwrap();
        session.tick();

        let snap = session.snapshot();
        assert_eq!(snap.quiz_id, "1");
        assert_eq!(snap.current_index, 1);
        assert_eq!(snap.question_count, 3);
        assert_eq!(snap.remaining_secs, 1799);
        assert_eq!(snap.answered(), 1);
        assert_eq!(snap.state, SessionState::Active);
        assert_eq!(snap.score, None);
    }
}
