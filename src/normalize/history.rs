use crate::model::{number_from_value, HistoryStats};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

fn total_calories(meal: &Value) -> f64 {
    meal_total(meal, "total_calories")
}

fn meal_total(meal: &Value, field: &str) -> f64 {
    meal.get("analysis_data")
        .and_then(|data| data.get(field))
        .and_then(number_from_value)
        .unwrap_or(0.0)
}

/// Parse the `created_at` timestamps the backend emits, with or without
/// an offset.
fn created_at(meal: &Value) -> Option<DateTime<Utc>> {
    let raw = meal.get("created_at")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

impl HistoryStats {
    /// Aggregate statistics over logged meals (`/users/{id}/meals`)
    pub fn from_meals(meals: &[Value]) -> Self {
        if meals.is_empty() {
            return HistoryStats::default();
        }

        let count = meals.len() as f64;
        let calories: f64 = meals.iter().map(total_calories).sum();
        let protein: f64 = meals.iter().map(|m| meal_total(m, "total_protein")).sum();

        HistoryStats {
            total_meals: meals.len(),
            avg_calories: (calories / count).round() as i64,
            total_calories: calories.round() as i64,
            avg_protein: (protein / count).round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MealSort {
    #[default]
    Newest,
    Oldest,
    CaloriesHigh,
    CaloriesLow,
}

impl FromStr for MealSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(MealSort::Newest),
            "oldest" => Ok(MealSort::Oldest),
            "calories-high" => Ok(MealSort::CaloriesHigh),
            "calories-low" => Ok(MealSort::CaloriesLow),
            other => Err(format!("Unknown sort order '{}'", other)),
        }
    }
}

/// Client-side filtering of the meal history list
#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Case-insensitive substring matched against item names
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: MealSort,
}

impl MealFilter {
    pub fn apply(&self, meals: &[Value]) -> Vec<Value> {
        let mut filtered: Vec<Value> = meals
            .iter()
            .filter(|meal| self.matches_search(meal))
            .filter(|meal| self.matches_dates(meal))
            .cloned()
            .collect();

        filtered.sort_by(|a, b| match self.sort {
            MealSort::Oldest => created_at(a).cmp(&created_at(b)),
            MealSort::Newest => created_at(b).cmp(&created_at(a)),
            MealSort::CaloriesHigh => total_calories(b)
                .partial_cmp(&total_calories(a))
                .unwrap_or(Ordering::Equal),
            MealSort::CaloriesLow => total_calories(a)
                .partial_cmp(&total_calories(b))
                .unwrap_or(Ordering::Equal),
        });

        filtered
    }

    fn matches_search(&self, meal: &Value) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => needle.to_lowercase(),
            _ => return true,
        };

        meal.get("analysis_data")
            .and_then(|data| data.get("items"))
            .and_then(Value::as_array)
            .map_or(false, |items| {
                items.iter().any(|item| {
                    item.get("name")
                        .and_then(Value::as_str)
                        .map_or(false, |name| name.to_lowercase().contains(&needle))
                })
            })
    }

    fn matches_dates(&self, meal: &Value) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = created_at(meal).map(|dt| dt.date_naive()) else {
            return false;
        };
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}
