use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::QuizDefect;

/// Time allowed when a quiz does not declare a limit.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    #[default]
    #[strum(serialize = "not started")]
    NotStarted,
    #[strum(serialize = "completed")]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer
    }
}

/// A graded, ordered set of questions as loaded from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub course: String,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    /// minutes
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub status: QuizStatus,
    /// score recorded for a quiz that arrives already completed
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(id: impl Into<String>, title: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            course: course.into(),
            due_date: None,
            time_limit: None,
            status: QuizStatus::NotStarted,
            score: None,
            passing_score: None,
            max_attempts: None,
            questions: Vec::new(),
        }
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit = Some(minutes);
        self
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit
            .map(|mins| mins.saturating_mul(60))
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == QuizStatus::Completed
    }

    /// Every correct answer points at an option and question ids are unique
    pub fn validate(&self) -> Result<(), QuizDefect> {
        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(QuizDefect::DuplicateQuestion(question.id.clone()));
            }
            if question.correct_answer >= question.option_count() {
                return Err(QuizDefect::AnswerOutOfRange {
                    question_id: question.id.clone(),
                    answer: question.correct_answer,
                    count: question.option_count(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_question(id: &str, options: usize, correct: usize) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("prompt for {id}"),
        options: (0..options).map(|i| format!("option {i}")).collect(),
        correct_answer: correct,
    }
}
