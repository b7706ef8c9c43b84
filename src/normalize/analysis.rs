use super::string_list;
use crate::model::{AnalysisData, FoodItem};
use crate::render::is_truthy;
use log::warn;
use serde::Serialize;
use serde_json::Value;

/// Confidence assigned to items the user edited by hand
pub const EDITED_ITEM_CONFIDENCE: f64 = 95.0;

/// The shapes an analyze / analyze_text response can take
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResponse {
    /// Recognition was ambiguous; the backend wants answers first
    Questions(Vec<String>),
    /// Nutrition breakdown is ready
    Results(AnalysisData),
    /// The call succeeded but carried neither questions nor data
    Empty,
}

impl AnalysisResponse {
    pub fn classify(raw: &Value) -> Self {
        let questions = string_list(raw.get("questions"));
        if !questions.is_empty() {
            return AnalysisResponse::Questions(questions);
        }

        match raw.get("data").and_then(|d| d.get("analysis_data")) {
            Some(data) if is_truthy(data) => AnalysisResponse::Results(analysis_data(data)),
            _ => AnalysisResponse::Empty,
        }
    }
}

/// Deserialize analysis data, falling back to an empty breakdown when the
/// payload is not an object.
pub fn analysis_data(raw: &Value) -> AnalysisData {
    serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
        warn!("Analysis data did not match the expected shape: {}", e);
        AnalysisData::default()
    })
}

/// Extract analysis data from the envelopes the backend uses:
/// `{data: {analysis_data}}` (refine), `{analysis_data}` or the bare object
/// (session results).
pub fn unwrap_analysis(raw: &Value) -> Option<AnalysisData> {
    let candidate = raw
        .get("data")
        .and_then(|d| d.get("analysis_data"))
        .or_else(|| raw.get("analysis_data"))
        .unwrap_or(raw);

    if candidate.is_object() && is_truthy(candidate) {
        Some(analysis_data(candidate))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditedItem {
    pub name: String,
    pub quantity: Option<String>,
}

impl From<&FoodItem> for EditedItem {
    fn from(item: &FoodItem) -> Self {
        EditedItem {
            name: item.name.clone(),
            quantity: item.quantity.clone(),
        }
    }
}

/// Body of `/recommendations/reanalyze-edited-items`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReanalysisRequest {
    pub edited_items: Vec<EditedItem>,
    pub clarifications: String,
}

impl ReanalysisRequest {
    pub fn new(items: Vec<EditedItem>, clarifications: impl Into<String>) -> Self {
        Self {
            edited_items: items,
            clarifications: clarifications.into(),
        }
    }
}

/// Fill in what a reanalysis response may leave out: totals are summed from
/// the items when missing or zero, and items without a confidence get
/// [`EDITED_ITEM_CONFIDENCE`].
pub fn complete_reanalysis(raw: &Value) -> AnalysisData {
    let mut data = analysis_data(raw);

    let has_items = matches!(raw.get("items"), Some(Value::Array(_)));
    if !has_items {
        return data;
    }

    fill_total(&mut data.total_calories, data.items.iter().map(|i| i.calories));
    fill_total(&mut data.total_protein, data.items.iter().map(|i| i.protein));
    fill_total(&mut data.total_carbs, data.items.iter().map(|i| i.carbs));
    fill_total(&mut data.total_fat, data.items.iter().map(|i| i.fat));

    for item in &mut data.items {
        if item.confidence.map_or(true, |c| c == 0.0) {
            item.confidence = Some(EDITED_ITEM_CONFIDENCE);
        }
    }

    data
}

fn fill_total(total: &mut Option<f64>, values: impl Iterator<Item = Option<f64>>) {
    if total.map_or(true, |t| t == 0.0) {
        *total = Some(values.flatten().sum());
    }
}
