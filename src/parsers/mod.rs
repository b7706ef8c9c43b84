//! Parsers for the semi-structured text the AI endpoints produce.
//!
//! Both parsers are fallbacks for responses that arrive as prose instead of
//! JSON; they never fail and return whatever they could recognize.

pub mod meal_plan;
pub mod recipe;

pub use meal_plan::{parse_meal_plan, MealPlanPayload};
pub use recipe::parse_recipe;
