//! Defensive reshaping of backend JSON into view-models.
//!
//! The AI layer behind the API may omit fields, nest them differently or
//! send objects where strings are expected. The functions here absorb that:
//! malformed content turns into fallback values, and only missing data the
//! caller cannot do without becomes an error.

pub mod analysis;
pub mod chat;
pub mod dashboard;
pub mod history;
pub mod insights;
pub mod swaps;

pub use analysis::{AnalysisResponse, EditedItem, ReanalysisRequest};
pub use dashboard::NutritionPeriod;
pub use history::{MealFilter, MealSort};
pub use insights::normalize_insights;
pub use swaps::{normalize_swaps, swaps_outcome};

use crate::error::ClientError;
use crate::render::render_safe;
use serde_json::Value;

/// Result of an operation that may legitimately produce nothing
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    /// The request succeeded but there is nothing to show
    Empty(String),
    /// The response was unusable
    Error(String),
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Empty(reason) => Outcome::Empty(reason),
            Outcome::Error(reason) => Outcome::Error(reason),
        }
    }

    /// Collapse into a `Result`, treating `Empty` as `Ok(None)`
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        match self {
            Outcome::Ok(value) => Ok(Some(value)),
            Outcome::Empty(_) => Ok(None),
            Outcome::Error(reason) => Err(ClientError::ValidationError(reason)),
        }
    }
}

/// Render a JSON value that should hold a list of displayable entries.
/// A lone non-empty string counts as a one-element list; anything else
/// that is not an array yields an empty list.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(render_safe)
            .filter(|entry| !entry.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
