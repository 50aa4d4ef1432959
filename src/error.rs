//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Rejections from the quiz session controller. None of these mutate the session.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz has already been submitted")]
    Closed,
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(String),
    #[error("option {option} is out of range for question {question_id} ({count} options)")]
    OptionOutOfRange {
        question_id: String,
        option: usize,
        count: usize,
    },
    #[error("question index {index} is out of range ({count} questions)")]
    InvalidQuestionIndex { index: usize, count: usize },
}

/// Errors emitted while loading or querying the quiz catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("quiz {0} not found")]
    NotFound(String),
    #[error("failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("quiz {quiz_id} in {name} is invalid")]
    Invalid {
        name: String,
        quiz_id: String,
        #[source]
        source: QuizDefect,
    },
}

/// A quiz record that cannot be taken as written.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDefect {
    #[error("question {question_id} marks option {answer} correct but has {count} options")]
    AnswerOutOfRange {
        question_id: String,
        answer: usize,
        count: usize,
    },
    #[error("question id {0} is used more than once")]
    DuplicateQuestion(String),
}

/// Errors emitted while saving configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
