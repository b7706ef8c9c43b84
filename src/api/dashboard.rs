use super::ApiClient;
use crate::error::ClientError;
use crate::model::NutritionDashboard;
use crate::normalize::NutritionPeriod;
use log::debug;
use serde_json::Value;

impl ApiClient {
    async fn try_get(&self, path: &str) -> Result<Option<Value>, ClientError> {
        let response = self.http().get(self.url(path)).send().await?;
        if !response.status().is_success() {
            debug!("{} answered {}", path, response.status());
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Insights for the home dashboard. Tries the agentic dashboard, then the
    /// daily dashboard's `data`, then the basic agent insights; `None` when
    /// every source declined.
    pub async fn dashboard_insights(&self, user_id: &str) -> Result<Option<Value>, ClientError> {
        if let Some(insights) = self.try_get(&format!("/agentic/dashboard/{}", user_id)).await? {
            return Ok(Some(insights));
        }

        if let Some(daily) = self.try_get(&format!("/dashboard/daily/{}", user_id)).await? {
            return Ok(Some(daily.get("data").cloned().unwrap_or(Value::Null)));
        }

        self.try_get(&format!("/agent/insights/{}", user_id)).await
    }

    pub async fn nutrition_dashboard(
        &self,
        user_id: &str,
        period: NutritionPeriod,
    ) -> Result<NutritionDashboard, ClientError> {
        let request = self
            .http()
            .get(self.url(&format!("/dashboard/nutrition-insights/{}", user_id)))
            .query(&[("period", period.as_query())]);
        let raw = self.json(request, "Failed to fetch nutrition data").await?;
        Ok(NutritionDashboard::from_response(&raw))
    }
}
