use super::client::ensure_success;
use super::ApiClient;
use crate::error::ClientError;
use crate::model::{ChatReply, User};
use crate::parsers::MealPlanPayload;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// What the user asks the meal planner for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlanPreferences {
    pub days: u32,
    pub meals_per_day: u32,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub dietary_restrictions: String,
    #[serde(default)]
    pub calorie_target: Option<u32>,
    #[serde(default)]
    pub budget: String,
}

impl Default for MealPlanPreferences {
    fn default() -> Self {
        Self {
            days: 7,
            meals_per_day: 3,
            cuisine: String::new(),
            dietary_restrictions: String::new(),
            calorie_target: None,
            budget: String::new(),
        }
    }
}

impl MealPlanPreferences {
    /// Body of `POST /agentic/meal-plan/{user}`
    pub fn planner_request(&self) -> Value {
        json!({
            "plan_type": if self.days == 7 { "weekly" } else { "custom" },
            "duration_days": self.days,
            "goals": {
                "calorie_target": self.calorie_target,
                "dietary_restrictions": self.dietary_restrictions,
                "cuisine_preference": self.cuisine,
                "meals_per_day": self.meals_per_day,
                "budget": self.budget,
            }
        })
    }

    /// Body of the basic planner: the preferences overlaid with the user's
    /// profile fields.
    pub fn basic_request(&self, profile: &Value) -> Result<Value, ClientError> {
        let mut body = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(profile) = profile {
            body.extend(profile.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(Value::Object(body))
    }
}

impl ApiClient {
    /// Send one message to the health coach. `body` carries the message and
    /// its conversation context.
    pub async fn chat(&self, user_id: &str, body: &Value) -> Result<ChatReply, ClientError> {
        let request = self
            .http()
            .post(self.url(&format!("/agentic/chat/{}", user_id)))
            .json(body);
        let raw = self.json(request, "Enhanced chat failed").await?;
        Ok(ChatReply::from_response(&raw))
    }

    /// Generate a meal plan with the intelligent planner, falling back to the
    /// basic generator when the planner answers with an error status.
    pub async fn meal_plan(
        &self,
        user: &User,
        preferences: &MealPlanPreferences,
    ) -> Result<MealPlanPayload, ClientError> {
        let response = self
            .http()
            .post(self.url(&format!("/agentic/meal-plan/{}", user.id)))
            .json(&preferences.planner_request())
            .send()
            .await?;

        if response.status().is_success() {
            let body: Value = response.json().await?;
            info!("Intelligent meal plan generated for user {}", user.id);
            return MealPlanPayload::from_response(&body);
        }

        warn!(
            "Intelligent planner answered {}, using the basic planner",
            response.status()
        );
        self.basic_meal_plan(user, preferences).await
    }

    pub async fn basic_meal_plan(
        &self,
        user: &User,
        preferences: &MealPlanPreferences,
    ) -> Result<MealPlanPayload, ClientError> {
        let request = self
            .http()
            .post(self.url(&format!("/recommendations/meal_plan/{}", user.id)))
            .json(&preferences.basic_request(&user.profile)?);
        let response = ensure_success(request.send().await?, "Meal plan generation failed")?;
        let body: Value = response.json().await?;
        MealPlanPayload::from_response(&body)
    }
}
