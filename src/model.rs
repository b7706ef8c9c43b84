use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Structured recipe extracted from the markdown the recipe endpoint returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeViewModel {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub nutrition_info: String,
    #[serde(default)]
    pub health_benefits: String,
    #[serde(default)]
    pub regional_variations: String,
}

impl Default for RecipeViewModel {
    fn default() -> Self {
        Self {
            title: "Generated Recipe".to_string(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            nutrition_info: String::new(),
            health_benefits: String::new(),
            regional_variations: String::new(),
        }
    }
}

impl RecipeViewModel {
    /// Placeholder shown when the recipe request itself failed
    pub fn failed() -> Self {
        Self {
            title: "Recipe Generation Failed".to_string(),
            nutrition_info: "Unable to generate nutrition information".to_string(),
            health_benefits: "Unable to generate health benefits".to_string(),
            ..Default::default()
        }
    }
}

/// One suggested substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapViewModel {
    pub original: String,
    pub alternative: String,
    pub benefits: String,
    pub indian_benefit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacroBalance {
    pub status: String,
    pub details: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Micronutrients {
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub deficiencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsViewModel {
    pub macro_balance: MacroBalance,
    #[serde(default)]
    pub micronutrients: Micronutrients,
    #[serde(default)]
    pub health_benefits: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub calories: Option<String>,
}

/// One day of a meal plan. `meals` keeps meal types in the order their
/// headers appeared.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    #[serde(default)]
    pub meals: IndexMap<String, Vec<MealItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MealPlanViewModel {
    #[serde(default)]
    pub days: Vec<DayPlan>,
}

/// A recognized food item inside an analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Nutrition breakdown for one meal. Fields the client does not know about
/// are kept in `extra` so they survive a round trip to the recommendation
/// endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisData {
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<FoodItem>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_number", skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub profile: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "lenient_string")]
    pub session_id: String,
}

/// Normalized agentic chat reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub response_type: String,
    pub suggestions: Vec<String>,
    pub confidence: f64,
    pub session_id: Option<String>,
    /// First urgent alert, if the coach raised any
    pub urgent_alert: Option<String>,
    /// Most important proactive feature announcement
    pub proactive_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSummary {
    pub avg_calories: f64,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    pub avg_fiber: f64,
    pub calorie_change: f64,
    pub protein_change: f64,
    pub weight_change: f64,
    pub body_fat_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for MacroSplit {
    fn default() -> Self {
        Self {
            protein: 30.0,
            carbs: 40.0,
            fat: 30.0,
        }
    }
}

/// Nutrition trends for the health insights dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionDashboard {
    pub summary: NutritionSummary,
    pub macronutrients: MacroSplit,
    pub daily_trend: Vec<Value>,
    pub deficiencies: Vec<String>,
    pub stats: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_meals: usize,
    pub avg_calories: i64,
    pub total_calories: i64,
    pub avg_protein: i64,
}

/// Interpret a JSON value as a number the way the web client's
/// `parseFloat(x) || 0` does for numeric strings.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => crate::render::render_safe(&other),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(crate::render::render_safe(&other)),
    })
}

fn lenient_opt_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FoodItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
