mod agentic;
mod analysis;
mod client;
mod dashboard;
mod recommendations;
mod session;

pub use agentic::MealPlanPreferences;
pub use client::ApiClient;

use crate::error::ClientError;
use crate::image::ImageUpload;
use crate::normalize::ReanalysisRequest;
use async_trait::async_trait;
use serde_json::Value;

/// Backend operations the analysis flow depends on
///
/// [`ApiClient`] is the HTTP implementation; tests substitute their own.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Start a new analysis session and return its id
    async fn create_session(&self) -> Result<String, ClientError>;

    async fn upload_image(&self, session_id: &str, image: &ImageUpload)
        -> Result<(), ClientError>;

    async fn analyze_image(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError>;

    async fn analyze_text(
        &self,
        session_id: &str,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError>;

    /// Answer the clarification questions, in question order
    async fn refine(&self, session_id: &str, answers: &[String]) -> Result<Value, ClientError>;

    async fn skip_clarification(&self, session_id: &str) -> Result<(), ClientError>;

    async fn analysis_results(&self, session_id: &str) -> Result<Value, ClientError>;

    async fn reanalyze_edited_items(
        &self,
        request: &ReanalysisRequest,
    ) -> Result<Value, ClientError>;
}
