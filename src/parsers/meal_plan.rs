use crate::error::ClientError;
use crate::model::{DayPlan, MealItem, MealPlanViewModel};
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref DAY_REGEX: Regex = Regex::new(
        r"(?i)^[#*\s]*(day\s+\d+|monday|tuesday|wednesday|thursday|friday|saturday|sunday)"
    )
    .expect("day pattern should be valid");
    static ref MEAL_REGEX: Regex = Regex::new(r"(?i)^[#*\s]*(breakfast|lunch|dinner|snack)")
        .expect("meal pattern should be valid");
    static ref CALORIES_REGEX: Regex =
        Regex::new(r"(?i)(\d+)\s*k?cal").expect("calorie pattern should be valid");
    static ref CALORIE_TOKEN_REGEX: Regex = Regex::new(r"(?i)\(\s*\d+\s*k?cal(?:orie)?s?\s*\)")
        .expect("calorie token pattern should be valid");
}

const DECORATION: &[char] = &['#', '*', '-', '•', ' ', '\t'];
// Markdown emphasis allowed around headers; `-` bullets always mark items
const EMPHASIS: &[char] = &['#', '*', ' ', '\t'];

/// Parse a plain-text meal plan into days and meal buckets.
///
/// ```text
/// Day 1
/// Breakfast
/// Oats (300 cal)
/// Lunch
/// Salad
/// ```
///
/// Lines that appear before the first day header, and food lines before the
/// first meal header of a day, have nothing to attach to and are dropped.
pub fn parse_meal_plan(text: &str) -> MealPlanViewModel {
    let mut days = Vec::new();
    let mut current_day: Option<DayPlan> = None;
    let mut current_meal: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if DAY_REGEX.is_match(line) {
            if let Some(day) = current_day.take() {
                days.push(day);
            }
            current_day = Some(DayPlan {
                day: line.trim_matches(EMPHASIS).to_string(),
                ..Default::default()
            });
            current_meal = None;
        } else if MEAL_REGEX.is_match(line) {
            let meal = line.trim_matches(EMPHASIS).to_lowercase();
            if let Some(day) = current_day.as_mut() {
                day.meals.entry(meal.clone()).or_default();
            }
            current_meal = Some(meal);
        } else if let (Some(day), Some(meal)) = (current_day.as_mut(), current_meal.as_ref()) {
            day.meals.entry(meal.clone()).or_default().push(meal_item(line));
        } else {
            debug!("Dropping meal plan line without day/meal context: {}", line);
        }
    }

    if let Some(day) = current_day {
        days.push(day);
    }

    MealPlanViewModel { days }
}

fn meal_item(line: &str) -> MealItem {
    let calories = CALORIES_REGEX
        .captures(line)
        .map(|caps| caps[1].to_string());
    let name = CALORIE_TOKEN_REGEX.replace(line, "");
    let name = name.trim().trim_start_matches(DECORATION).trim();

    MealItem {
        name: if name.is_empty() {
            line.to_string()
        } else {
            name.to_string()
        },
        calories,
    }
}

/// The different shapes a meal-plan response can take
#[derive(Debug, Clone, PartialEq)]
pub enum MealPlanPayload {
    /// Structured plan from the intelligent planner (`meal_plan`)
    Structured(Value),
    /// Plan that arrived as prose and was parsed
    Parsed(MealPlanViewModel),
}

impl MealPlanPayload {
    /// Resolve a planner response: `meal_plan` wins, then `plan` (parsed when
    /// it is a string).
    pub fn from_response(response: &Value) -> Result<Self, ClientError> {
        if let Some(plan) = response.get("meal_plan").filter(|v| crate::render::is_truthy(v)) {
            return Ok(MealPlanPayload::Structured(plan.clone()));
        }

        match response.get("plan") {
            Some(Value::String(text)) => Ok(MealPlanPayload::Parsed(parse_meal_plan(text))),
            Some(plan) if crate::render::is_truthy(plan) => {
                Ok(MealPlanPayload::Structured(plan.clone()))
            }
            _ => {
                warn!("Meal plan response carried neither `meal_plan` nor `plan`");
                Err(ClientError::ValidationError(
                    "No meal plan data received".to_string(),
                ))
            }
        }
    }
}
