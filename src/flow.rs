//! The food-analysis flow: `Input → Loading → Questions → Results`.
//!
//! Every submission takes a new generation number. A backend response is only
//! applied if no newer submission (or reset) happened while it was in flight.

use crate::api::AnalysisBackend;
use crate::error::ClientError;
use crate::image::ImageSource;
use crate::model::AnalysisData;
use crate::normalize::analysis::{complete_reanalysis, unwrap_analysis};
use crate::normalize::{AnalysisResponse, EditedItem, ReanalysisRequest};
use crate::store::{Action, AppStore, ToastKind};
use log::{debug, info};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Input,
    Loading,
    Questions,
    Results,
}

#[derive(Debug, Default)]
struct FlowState {
    step: Step,
    questions: Vec<String>,
    results: Option<AnalysisData>,
    generation: u64,
}

pub struct AnalysisFlow {
    backend: Arc<dyn AnalysisBackend>,
    store: AppStore,
    state: Mutex<FlowState>,
    max_image_bytes: u64,
}

impl AnalysisFlow {
    pub fn new(backend: Arc<dyn AnalysisBackend>, store: AppStore) -> Self {
        Self {
            backend,
            store,
            state: Mutex::new(FlowState::default()),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        // A poisoned lock still holds consistent plain data
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn step(&self) -> Step {
        self.lock().step
    }

    pub fn questions(&self) -> Vec<String> {
        self.lock().questions.clone()
    }

    pub fn results(&self) -> Option<AnalysisData> {
        self.lock().results.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn error(&self, message: impl Into<String>) {
        self.store.notify(message, ToastKind::Error);
    }

    /// Enter `Loading` and return the generation of the new submission
    fn begin(&self, clear: bool) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.step = Step::Loading;
        if clear {
            state.questions.clear();
            state.results = None;
        }
        state.generation
    }

    /// Apply `update` unless a newer submission superseded `generation`
    fn settle(&self, generation: u64, update: impl FnOnce(&mut FlowState) -> Option<String>) -> Step {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                "Discarding response for generation {} (current is {})",
                generation, state.generation
            );
            return state.step;
        }
        let toast = update(&mut state);
        let step = state.step;
        drop(state);

        if let Some(message) = toast {
            self.error(message);
        }
        step
    }

    async fn ensure_session(&self) -> Result<String, ClientError> {
        if let Some(id) = self.store.session_id() {
            return Ok(id);
        }
        let id = self.backend.create_session().await?;
        self.store.dispatch(Action::SetSession(id.clone()));
        Ok(id)
    }

    fn user_id(&self) -> Option<String> {
        self.store.user().map(|user| user.id)
    }

    /// Route an analyze / analyze_text outcome to the next step
    fn finish_analysis(
        &self,
        generation: u64,
        result: Result<Value, ClientError>,
        failure: &str,
    ) -> Step {
        self.settle(generation, |state| match result {
            Ok(raw) => match AnalysisResponse::classify(&raw) {
                AnalysisResponse::Questions(questions) => {
                    info!("Analysis needs {} clarification(s)", questions.len());
                    state.questions = questions;
                    state.step = Step::Questions;
                    None
                }
                AnalysisResponse::Results(data) => {
                    state.results = Some(data);
                    state.step = Step::Results;
                    None
                }
                AnalysisResponse::Empty => {
                    state.step = Step::Input;
                    Some("Analysis completed but no data received".to_string())
                }
            },
            Err(e) => {
                state.step = Step::Input;
                Some(format!("{}: {}", failure, e))
            }
        })
    }

    pub async fn submit_text(&self, text: &str) -> Step {
        if text.trim().is_empty() {
            self.error("Please enter some food items first");
            return self.step();
        }
        if !self.store.is_online() {
            self.error("Cannot analyze while offline");
            return self.step();
        }

        let generation = self.begin(true);
        let result = async {
            let session_id = self.ensure_session().await?;
            self.backend
                .analyze_text(&session_id, text, self.user_id().as_deref())
                .await
        }
        .await;

        self.finish_analysis(generation, result, "Text analysis failed")
    }

    pub async fn submit_image(&self, source: &ImageSource) -> Step {
        if !self.store.is_online() {
            self.error("Cannot analyze while offline");
            return self.step();
        }
        let image = match source.load(self.max_image_bytes).await {
            Ok(image) => image,
            Err(e) => {
                self.error(e.to_string());
                return self.step();
            }
        };

        let generation = self.begin(true);
        let result = async {
            let session_id = self.ensure_session().await?;
            self.backend.upload_image(&session_id, &image).await?;
            self.backend
                .analyze_image(&session_id, self.user_id().as_deref())
                .await
        }
        .await;

        self.finish_analysis(generation, result, "Analysis failed")
    }

    /// Answer the pending questions, one answer per question in order
    pub async fn submit_answers(&self, answers: &[String]) -> Step {
        let expected = {
            let state = self.lock();
            if state.step != Step::Questions {
                debug!("Ignoring answers outside the questions step");
                return state.step;
            }
            state.questions.len()
        };

        if answers.len() < expected || answers.iter().any(|a| a.trim().is_empty()) {
            self.error("Please answer all questions before submitting");
            return Step::Questions;
        }

        let generation = self.begin(false);
        let result = async {
            let session_id = self.ensure_session().await?;
            self.backend.refine(&session_id, &answers[..expected]).await
        }
        .await;

        self.settle(generation, |state| match result {
            Ok(raw) => {
                state.results = Some(unwrap_analysis(&raw).unwrap_or_default());
                state.step = Step::Results;
                None
            }
            Err(e) => {
                state.step = Step::Input;
                Some(format!("Failed to refine analysis: {}", e))
            }
        })
    }

    /// Skip the clarification questions and take the session's current results
    pub async fn skip_questions(&self) -> Step {
        if self.step() != Step::Questions {
            debug!("Ignoring skip outside the questions step");
            return self.step();
        }

        let generation = self.begin(false);
        let result = async {
            let session_id = self.ensure_session().await?;
            self.backend.skip_clarification(&session_id).await?;
            self.backend.analysis_results(&session_id).await
        }
        .await;

        self.settle(generation, |state| match result {
            Ok(raw) => {
                state.results = Some(unwrap_analysis(&raw).unwrap_or_default());
                state.step = Step::Results;
                None
            }
            Err(e) => {
                state.step = Step::Input;
                Some(format!("Failed to skip questions: {}", e))
            }
        })
    }

    /// Re-run the analysis over items the user corrected by hand. On failure
    /// the previous results stay in place.
    pub async fn apply_edits(&self, items: Vec<EditedItem>, clarifications: &str) -> Step {
        if self.step() != Step::Results {
            debug!("Ignoring edits outside the results step");
            return self.step();
        }
        if !self.store.is_online() {
            self.error("Cannot apply recipe edits while offline");
            return Step::Results;
        }

        let request = ReanalysisRequest::new(items, clarifications);
        let generation = self.begin(false);
        let result = self.backend.reanalyze_edited_items(&request).await;

        let succeeded = result.is_ok();
        let step = self.settle(generation, |state| {
            state.step = Step::Results;
            match result {
                Ok(raw) => {
                    state.results = Some(complete_reanalysis(&raw));
                    None
                }
                Err(e) => Some(format!("Failed to reanalyze: {}", e)),
            }
        });
        if succeeded && self.generation() == generation {
            self.store.notify("Analysis updated with fresh estimates", ToastKind::Success);
        }
        step
    }

    /// Resume at `Results` with an analysis obtained earlier
    pub fn show_results(&self, data: AnalysisData) {
        let mut state = self.lock();
        state.generation += 1;
        state.step = Step::Results;
        state.questions.clear();
        state.results = Some(data);
    }

    /// Start over. Responses still in flight are discarded.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.step = Step::Input;
        state.questions.clear();
        state.results = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageUpload;
    use crate::store::ConnectionStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeBackend {
        analyze: Mutex<Vec<Result<Value, u16>>>,
        refine_calls: AtomicUsize,
        refine_status: Option<u16>,
        entered: Notify,
        release: Notify,
    }

    impl FakeBackend {
        fn with_responses(responses: Vec<Result<Value, u16>>) -> Self {
            Self {
                analyze: Mutex::new(responses.into_iter().rev().collect()),
                ..Default::default()
            }
        }

        fn next(&self) -> Result<Value, ClientError> {
            self.analyze
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(json!({})))
                .map_err(|status| ClientError::StatusError {
                    context: "Text analysis failed".into(),
                    status,
                })
        }
    }

    #[async_trait]
    impl AnalysisBackend for FakeBackend {
        async fn create_session(&self) -> Result<String, ClientError> {
            Ok("fresh".to_string())
        }

        async fn upload_image(&self, _: &str, _: &ImageUpload) -> Result<(), ClientError> {
            Ok(())
        }

        async fn analyze_image(&self, _: &str, _: Option<&str>) -> Result<Value, ClientError> {
            self.next()
        }

        async fn analyze_text(
            &self,
            _: &str,
            text: &str,
            _: Option<&str>,
        ) -> Result<Value, ClientError> {
            if text == "slow" {
                self.entered.notify_one();
                self.release.notified().await;
                return Ok(json!({"data": {"analysis_data": {"items": [{"name": "Stale"}]}}}));
            }
            self.next()
        }

        async fn refine(&self, _: &str, _: &[String]) -> Result<Value, ClientError> {
            self.refine_calls.fetch_add(1, Ordering::SeqCst);
            match self.refine_status {
                Some(status) => Err(ClientError::StatusError {
                    context: "Refinement failed".into(),
                    status,
                }),
                None => Ok(json!({"data": {"analysis_data": {"items": [{"name": "Large dosa"}]}}})),
            }
        }

        async fn skip_clarification(&self, _: &str) -> Result<(), ClientError> {
            Ok(())
        }

        async fn analysis_results(&self, _: &str) -> Result<Value, ClientError> {
            Ok(json!({"items": [{"name": "Dosa"}], "total_calories": 300}))
        }

        async fn reanalyze_edited_items(
            &self,
            request: &ReanalysisRequest,
        ) -> Result<Value, ClientError> {
            let items: Vec<Value> = request
                .edited_items
                .iter()
                .map(|i| json!({"name": i.name, "calories": 100}))
                .collect();
            Ok(json!({ "items": items }))
        }
    }

    fn online_store() -> AppStore {
        let store = AppStore::default();
        store.dispatch(Action::SetConnection(ConnectionStatus::Online));
        store
    }

    fn flow(backend: FakeBackend) -> (AnalysisFlow, Arc<FakeBackend>, AppStore) {
        let backend = Arc::new(backend);
        let store = online_store();
        (AnalysisFlow::new(backend.clone(), store.clone()), backend, store)
    }

    fn toast(store: &AppStore) -> String {
        store.snapshot().toast.map(|t| t.message).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_questions_then_answers() {
        let mut backend =
            FakeBackend::with_responses(vec![Ok(json!({"questions": ["What size?"]}))]);
        backend.refine_status = None;
        let (flow, backend, store) = flow(backend);

        assert_eq!(flow.submit_text("dosa").await, Step::Questions);
        assert_eq!(flow.questions(), vec!["What size?"]);
        assert_eq!(store.session_id().as_deref(), Some("fresh"));

        assert_eq!(flow.submit_answers(&["  ".to_string()]).await, Step::Questions);
        assert_eq!(toast(&store), "Please answer all questions before submitting");
        assert_eq!(backend.refine_calls.load(Ordering::SeqCst), 0);

        assert_eq!(flow.submit_answers(&["large".to_string()]).await, Step::Results);
        assert_eq!(backend.refine_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.results().unwrap().items[0].name, "Large dosa");
    }

    #[tokio::test]
    async fn test_direct_results() {
        let (flow, _, _) = flow(FakeBackend::with_responses(vec![Ok(json!({
            "data": {"analysis_data": {"items": [{"name": "Upma"}], "total_calories": 250}}
        }))]));
        assert_eq!(flow.submit_text("upma").await, Step::Results);
        assert_eq!(flow.results().unwrap().total_calories, Some(250.0));
    }

    #[tokio::test]
    async fn test_blank_text_and_offline_are_rejected() {
        let (flow, _, store) = flow(FakeBackend::default());
        assert_eq!(flow.submit_text("   ").await, Step::Input);
        assert_eq!(toast(&store), "Please enter some food items first");

        store.dispatch(Action::SetConnection(ConnectionStatus::Offline));
        assert_eq!(flow.submit_text("poha").await, Step::Input);
        assert_eq!(toast(&store), "Cannot analyze while offline");
        assert_eq!(flow.generation(), 0);
    }

    #[tokio::test]
    async fn test_empty_response_and_failure_return_to_input() {
        let (flow, _, store) = flow(FakeBackend::with_responses(vec![
            Ok(json!({"status": "ok"})),
            Err(500),
        ]));
        assert_eq!(flow.submit_text("poha").await, Step::Input);
        assert_eq!(toast(&store), "Analysis completed but no data received");

        assert_eq!(flow.submit_text("poha").await, Step::Input);
        assert_eq!(
            toast(&store),
            "Text analysis failed: Text analysis failed: 500"
        );
    }

    #[tokio::test]
    async fn test_refine_failure_returns_to_input() {
        let mut backend =
            FakeBackend::with_responses(vec![Ok(json!({"questions": ["Oil?"]}))]);
        backend.refine_status = Some(502);
        let (flow, _, store) = flow(backend);

        flow.submit_text("paratha").await;
        assert_eq!(flow.submit_answers(&["ghee".to_string()]).await, Step::Input);
        assert_eq!(
            toast(&store),
            "Failed to refine analysis: Refinement failed: 502"
        );
    }

    #[tokio::test]
    async fn test_skip_questions_fetches_results() {
        let (flow, _, _) = flow(FakeBackend::with_responses(vec![Ok(
            json!({"questions": ["Any chutney?"]}),
        )]));
        flow.submit_text("dosa").await;
        assert_eq!(flow.skip_questions().await, Step::Results);
        assert_eq!(flow.results().unwrap().items[0].name, "Dosa");
    }

    #[tokio::test]
    async fn test_apply_edits_fills_totals() {
        let (flow, _, _) = flow(FakeBackend::with_responses(vec![Ok(json!({
            "data": {"analysis_data": {"items": [{"name": "Rice"}]}}
        }))]));
        flow.submit_text("rice").await;

        let items = vec![
            EditedItem { name: "Brown rice".into(), quantity: Some("1 cup".into()) },
            EditedItem { name: "Rajma".into(), quantity: None },
        ];
        assert_eq!(flow.apply_edits(items, "").await, Step::Results);
        let results = flow.results().unwrap();
        assert_eq!(results.total_calories, Some(200.0));
        assert_eq!(results.items[1].confidence, Some(95.0));
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (flow, backend, _) = flow(FakeBackend::with_responses(vec![Ok(json!({
            "data": {"analysis_data": {"items": [{"name": "Fresh"}]}}
        }))]));
        let flow = Arc::new(flow);

        let slow = {
            let flow = flow.clone();
            tokio::spawn(async move { flow.submit_text("slow").await })
        };
        backend.entered.notified().await;

        assert_eq!(flow.submit_text("fast").await, Step::Results);
        backend.release.notify_one();
        slow.await.unwrap();

        assert_eq!(flow.step(), Step::Results);
        assert_eq!(flow.results().unwrap().items[0].name, "Fresh");
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_response() {
        let (flow, backend, _) = flow(FakeBackend::default());
        let flow = Arc::new(flow);

        let slow = {
            let flow = flow.clone();
            tokio::spawn(async move { flow.submit_text("slow").await })
        };
        backend.entered.notified().await;
        flow.reset();
        backend.release.notify_one();

        assert_eq!(slow.await.unwrap(), Step::Input);
        assert!(flow.results().is_none());
    }
}
