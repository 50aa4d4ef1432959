use std::fs;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::quiz::{Quiz, QuizStatus};

static QUIZ_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/data/quizzes");

/// Quizzes due within this window are flagged as due soon
pub const DUE_SOON_HOURS: i64 = 48;

fn validate_all(name: &str, quizzes: &[Quiz]) -> Result<(), CatalogError> {
    for quiz in quizzes {
        quiz.validate().map_err(|source| CatalogError::Invalid {
            name: name.to_string(),
            quiz_id: quiz.id.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Read access to the quizzes a user can take
pub trait QuizCatalog {
    fn get(&self, id: &str) -> Option<Quiz>;
    fn all(&self) -> Vec<Quiz>;

    fn lookup(&self, id: &str) -> Result<Quiz, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    quizzes: Vec<Quiz>,
}

impl InMemoryCatalog {
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self { quizzes }
    }

    /// The quizzes bundled into the binary, ordered by id
    pub fn bundled() -> Result<Self, CatalogError> {
        let quizzes = QUIZ_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .map(|f| -> Result<Quiz, CatalogError> {
                let name = f.path().display().to_string();
                let contents = f.contents_utf8().unwrap_or_default();
                let quiz = serde_json::from_str::<Quiz>(contents).map_err(|source| {
                    CatalogError::Parse {
                        name: name.clone(),
                        source,
                    }
                })?;
                validate_all(&name, std::slice::from_ref(&quiz))?;
                Ok(quiz)
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();

        Ok(Self { quizzes })
    }

    /// Load a JSON array of quizzes from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let quizzes =
            serde_json::from_slice::<Vec<Quiz>>(&bytes).map_err(|source| CatalogError::Parse {
                name: path.display().to_string(),
                source,
            })?;

        validate_all(&path.display().to_string(), &quizzes)?;

        tracing::info!(path = %path.display(), count = quizzes.len(), "catalog loaded");
        Ok(Self { quizzes })
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

impl QuizCatalog for InMemoryCatalog {
    fn get(&self, id: &str) -> Option<Quiz> {
        self.quizzes.iter().find(|q| q.id == id).cloned()
    }

    fn all(&self) -> Vec<Quiz> {
        self.quizzes.clone()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum QuizFilter {
    #[default]
    All,
    Upcoming,
    Completed,
}

impl QuizFilter {
    pub fn next(self) -> Self {
        match self {
            QuizFilter::All => QuizFilter::Upcoming,
            QuizFilter::Upcoming => QuizFilter::Completed,
            QuizFilter::Completed => QuizFilter::All,
        }
    }

    fn accepts(self, quiz: &Quiz) -> bool {
        match self {
            QuizFilter::All => true,
            QuizFilter::Upcoming => quiz.status == QuizStatus::NotStarted,
            QuizFilter::Completed => quiz.status == QuizStatus::Completed,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Title,
    Course,
}

impl SortBy {
    pub fn next(self) -> Self {
        match self {
            SortBy::Date => SortBy::Title,
            SortBy::Title => SortBy::Course,
            SortBy::Course => SortBy::Date,
        }
    }
}

/// Listing criteria for the quiz overview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: QuizFilter,
    pub search: String,
    pub sort_by: SortBy,
}

impl ListQuery {
    fn matches_search(&self, quiz: &Quiz) -> bool {
        let query = self.search.trim().to_lowercase();
        query.is_empty()
            || quiz.title.to_lowercase().contains(&query)
            || quiz.course.to_lowercase().contains(&query)
    }
}

/// Filter, search and sort a set of quizzes. Quizzes without a due date sort last.
pub fn list_quizzes(quizzes: &[Quiz], query: &ListQuery) -> Vec<Quiz> {
    quizzes
        .iter()
        .filter(|q| query.filter.accepts(q) && query.matches_search(q))
        .cloned()
        .sorted_by(|a, b| match query.sort_by {
            SortBy::Date => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            },
            SortBy::Title => a.title.cmp(&b.title),
            SortBy::Course => a.course.cmp(&b.course),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuizStats {
    pub total: usize,
    pub completed: usize,
    pub upcoming: usize,
    pub average_score: f64,
}

pub fn quiz_stats(quizzes: &[Quiz]) -> QuizStats {
    let completed = quizzes.iter().filter(|q| q.is_completed()).count();
    let upcoming = quizzes
        .iter()
        .filter(|q| q.status == QuizStatus::NotStarted)
        .count();
    let score_sum: u32 = quizzes
        .iter()
        .filter(|q| q.is_completed())
        .filter_map(|q| q.score)
        .sum();
    let average_score = if completed == 0 {
        0.0
    } else {
        score_sum as f64 / completed as f64
    };

    QuizStats {
        total: quizzes.len(),
        completed,
        upcoming,
        average_score,
    }
}

pub fn is_due_soon(due: NaiveDateTime, now: NaiveDateTime) -> bool {
    let left = due - now;
    left > TimeDelta::zero() && left < TimeDelta::hours(DUE_SOON_HOURS)
}
