use super::{AnalysisBackend, ApiClient};
use crate::error::ClientError;
use crate::image::ImageUpload;
use crate::normalize::ReanalysisRequest;
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde_json::{json, Value};

impl ApiClient {
    fn with_user(&self, request: RequestBuilder, user_id: Option<&str>) -> RequestBuilder {
        match user_id {
            Some(id) => request.query(&[("user_id", id)]),
            None => request,
        }
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn create_session(&self) -> Result<String, ClientError> {
        Ok(ApiClient::create_session(self).await?.session_id)
    }

    async fn upload_image(
        &self,
        session_id: &str,
        image: &ImageUpload,
    ) -> Result<(), ClientError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime_type)?;
        let form = Form::new().part("file", part);

        debug!("Uploading {} to session {}", image.file_name, session_id);
        let request = self
            .http()
            .post(self.url(&format!("/analysis/upload/{}", session_id)))
            .multipart(form);
        self.send(request, "Upload failed").await
    }

    async fn analyze_image(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = self.with_user(
            self.http()
                .post(self.url(&format!("/analysis/analyze/{}", session_id))),
            user_id,
        );
        self.json(request, "Analysis failed").await
    }

    async fn analyze_text(
        &self,
        session_id: &str,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = self.with_user(
            self.http()
                .post(self.url(&format!("/analysis/analyze_text/{}", session_id)))
                .json(&json!({ "text": text })),
            user_id,
        );
        self.json(request, "Text analysis failed").await
    }

    async fn refine(&self, session_id: &str, answers: &[String]) -> Result<Value, ClientError> {
        let request = self
            .http()
            .post(self.url(&format!("/analysis/refine/{}", session_id)))
            .json(answers);
        self.json(request, "Refinement failed").await
    }

    async fn skip_clarification(&self, session_id: &str) -> Result<(), ClientError> {
        let request = self.http().post(
            self.url(&format!("/analysis/skip_clarification/{}", session_id)),
        );
        self.send(request, "Skip failed").await
    }

    async fn analysis_results(&self, session_id: &str) -> Result<Value, ClientError> {
        let request = self
            .http()
            .get(self.url(&format!("/analysis/results/{}", session_id)));
        self.json(request, "Results fetch failed").await
    }

    async fn reanalyze_edited_items(
        &self,
        request: &ReanalysisRequest,
    ) -> Result<Value, ClientError> {
        let http = self
            .http()
            .post(self.url("/recommendations/reanalyze-edited-items"))
            .json(request);
        self.json(http, "Reanalysis failed").await
    }
}
