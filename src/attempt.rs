use chrono::{DateTime, Local};
use serde::Serialize;

use crate::catalog::QuizCatalog;
use crate::error::CatalogError;
use crate::quiz::Quiz;
use crate::session::{QuizSession, SubmitReason};
use crate::users::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Excellent,
    Great,
    Good,
    NeedsReview,
}

impl Feedback {
    pub fn for_score(score: u32) -> Self {
        match score {
            90.. => Feedback::Excellent,
            80..=89 => Feedback::Great,
            70..=79 => Feedback::Good,
            _ => Feedback::NeedsReview,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Feedback::Excellent => "Excellent work! You've mastered this material.",
            Feedback::Great => "Great job! You have a solid understanding of the concepts.",
            Feedback::Good => {
                "Good work! Review the questions you missed to improve your understanding."
            }
            Feedback::NeedsReview => {
                "You might need additional study on this topic. Consider reviewing the course materials again."
            }
        }
    }
}

/// Graded outcome of a quiz, either from a session just submitted or a prior completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub title: String,
    pub course: String,
    pub score: u32,
    pub total: usize,
    pub correct: usize,
    pub feedback: Feedback,
    pub passed: Option<bool>,
    pub reason: Option<SubmitReason>,
}

impl QuizResult {
    fn build(quiz: &Quiz, score: u32, correct: usize, reason: Option<SubmitReason>) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            title: quiz.title.clone(),
            course: quiz.course.clone(),
            score,
            total: quiz.question_count(),
            correct,
            feedback: Feedback::for_score(score),
            passed: quiz.passing_score.map(|pass| score >= pass),
            reason,
        }
    }

    /// Result of a submitted session; `None` while the session is still active
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let score = session.score()?;
        Some(Self::build(
            session.quiz(),
            score,
            session.correct_count(),
            session.submit_reason(),
        ))
    }

    /// Result reconstructed from a stored score, with the correct count derived from it
    pub fn from_score(quiz: &Quiz, score: u32) -> Self {
        let total = quiz.question_count();
        let correct = ((score as f64 / 100.0) * total as f64).round() as usize;
        Self::build(quiz, score, correct.min(total), None)
    }

    pub fn incorrect(&self) -> usize {
        self.total - self.correct
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub quiz_id: String,
    pub user_id: String,
    pub score: u32,
    pub correct: usize,
    pub total: usize,
    pub reason: SubmitReason,
    pub submitted_at: DateTime<Local>,
}

/// Attempts submitted during this run of the program
#[derive(Debug, Clone, Default)]
pub struct AttemptLog {
    records: Vec<AttemptRecord>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome of a submitted session. Active sessions are ignored.
    pub fn record(&mut self, viewer: &Viewer, session: &QuizSession) -> Option<&AttemptRecord> {
        let score = session.score()?;
        let record = AttemptRecord {
            quiz_id: session.quiz().id.clone(),
            user_id: viewer.id().to_string(),
            score,
            correct: session.correct_count(),
            total: session.quiz().question_count(),
            reason: session.submit_reason().unwrap_or(SubmitReason::Manual),
            submitted_at: Local::now(),
        };
        tracing::info!(quiz_id = %record.quiz_id, user_id = %record.user_id, score, "attempt recorded");
        self.records.push(record);
        self.records.last()
    }

    pub fn attempts_for(&self, quiz_id: &str, user_id: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.quiz_id == quiz_id && r.user_id == user_id)
            .count()
    }

    pub fn latest_for(&self, quiz_id: &str, user_id: &str) -> Option<&AttemptRecord> {
        self.records
            .iter()
            .rev()
            .find(|r| r.quiz_id == quiz_id && r.user_id == user_id)
    }

    /// Latest attempt once `user_id` has used up the quiz's allowed attempts
    pub fn exhausted(&self, quiz: &Quiz, user_id: &str) -> Option<&AttemptRecord> {
        let allowed = quiz.max_attempts.unwrap_or(1) as usize;
        if self.attempts_for(&quiz.id, user_id) >= allowed {
            self.latest_for(&quiz.id, user_id)
        } else {
            None
        }
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }
}

/// What the user sees after picking a quiz
#[derive(Debug, Clone)]
pub enum Opened {
    Session(Box<QuizSession>),
    Review(QuizResult),
}

/// Open a quiz for `viewer`: completed quizzes and exhausted attempts show the
/// result, anything else starts a fresh session.
pub fn open_quiz(
    catalog: &dyn QuizCatalog,
    attempts: &AttemptLog,
    viewer: &Viewer,
    quiz_id: &str,
) -> Result<Opened, CatalogError> {
    let quiz = catalog.lookup(quiz_id)?;

    if let Some(latest) = attempts.exhausted(&quiz, viewer.id()) {
        let mut result = QuizResult::from_score(&quiz, latest.score);
        result.correct = latest.correct;
        result.reason = Some(latest.reason);
        return Ok(Opened::Review(result));
    }

    if quiz.is_completed() {
        let score = quiz.score.unwrap_or(0);
        return Ok(Opened::Review(QuizResult::from_score(&quiz, score)));
    }

    Ok(Opened::Session(Box::new(QuizSession::start(quiz))))
}
