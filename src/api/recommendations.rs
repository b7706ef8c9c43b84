use super::ApiClient;
use crate::error::ClientError;
use crate::model::{AnalysisData, InsightsViewModel, RecipeViewModel, SwapViewModel};
use crate::normalize::{normalize_insights, swaps_outcome, Outcome};
use crate::parsers::parse_recipe;
use crate::render::{is_truthy, render_safe};
use log::debug;
use serde_json::Value;

impl ApiClient {
    async fn recommend(&self, path: &str, analysis: &AnalysisData, context: &str) -> Result<Value, ClientError> {
        let request = self.http().post(self.url(path)).json(analysis);
        self.json(request, context).await
    }

    /// Generate a recipe for the analysed meal. The backend answers with
    /// markdown under `recipe`.
    pub async fn generate_recipe(&self, analysis: &AnalysisData) -> Result<RecipeViewModel, ClientError> {
        let body = self
            .recommend("/recommendations/recipe", analysis, "Recipe generation failed")
            .await?;

        match body.get("recipe").filter(|r| is_truthy(r)) {
            Some(Value::String(markdown)) => Ok(parse_recipe(markdown)),
            Some(other) => {
                debug!("Recipe arrived as structured data, rendering before parsing");
                Ok(parse_recipe(&render_safe(other)))
            }
            None => Err(ClientError::ValidationError(
                "No recipe data received from server".to_string(),
            )),
        }
    }

    pub async fn healthy_swaps(
        &self,
        analysis: &AnalysisData,
    ) -> Result<Outcome<Vec<SwapViewModel>>, ClientError> {
        let body = self
            .recommend("/recommendations/swaps", analysis, "Healthy swaps failed")
            .await?;
        Ok(swaps_outcome(&body))
    }

    pub async fn nutrition_insights(
        &self,
        analysis: &AnalysisData,
    ) -> Result<InsightsViewModel, ClientError> {
        let body = self
            .recommend(
                "/recommendations/nutrition-insights",
                analysis,
                "Nutrition insights failed",
            )
            .await?;
        normalize_insights(&body)
    }
}
