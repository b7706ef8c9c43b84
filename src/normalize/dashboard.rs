use super::string_list;
use crate::model::{number_from_value, MacroSplit, NutritionDashboard, NutritionSummary};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Reporting window for the nutrition-insights dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NutritionPeriod {
    #[default]
    SevenDays,
    OneMonth,
    ThreeMonths,
}

impl NutritionPeriod {
    /// Value of the `period` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            NutritionPeriod::SevenDays => "7d",
            NutritionPeriod::OneMonth => "1m",
            NutritionPeriod::ThreeMonths => "3m",
        }
    }
}

impl fmt::Display for NutritionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for NutritionPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" | "7days" => Ok(NutritionPeriod::SevenDays),
            "1m" | "1month" => Ok(NutritionPeriod::OneMonth),
            "3m" | "3months" => Ok(NutritionPeriod::ThreeMonths),
            other => Err(format!("Unknown period '{}', expected 7d, 1m or 3m", other)),
        }
    }
}

impl NutritionDashboard {
    /// Transform a `/dashboard/nutrition-insights/{user}` response. The
    /// payload is wrapped in `data`; every missing part gets a neutral default.
    pub fn from_response(raw: &Value) -> Self {
        let empty = Value::Null;
        let data = raw.get("data").unwrap_or(&empty);
        let average = |key: &str| {
            data.get("averages")
                .and_then(|a| a.get(key))
                .and_then(number_from_value)
                .unwrap_or(0.0)
        };

        NutritionDashboard {
            summary: NutritionSummary {
                avg_calories: average("calories"),
                avg_protein: average("protein"),
                avg_carbs: average("carbs"),
                avg_fat: average("fat"),
                avg_fiber: average("fiber"),
                ..Default::default()
            },
            macronutrients: data
                .get("macronutrients")
                .filter(|m| m.is_object())
                .map(macro_split)
                .unwrap_or_default(),
            daily_trend: data
                .get("daily_trend")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            deficiencies: string_list(data.get("deficiencies")),
            stats: data
                .get("stats")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

fn macro_split(value: &Value) -> MacroSplit {
    let share = |key: &str| value.get(key).and_then(number_from_value).unwrap_or(0.0);
    MacroSplit {
        protein: share("protein"),
        carbs: share("carbs"),
        fat: share("fat"),
    }
}
