//! User-facing operations. Each one checks preconditions, calls the backend
//! and reports the outcome through a toast, the way the web screens do.

use crate::api::{ApiClient, MealPlanPreferences};
use crate::auth::GoogleProfile;
use crate::builder::AppBuilder;
use crate::coach::{apology, ChatSession};
use crate::config::ClientConfig;
use crate::flow::AnalysisFlow;
use crate::model::{
    AnalysisData, ChatReply, HistoryStats, InsightsViewModel, NutritionDashboard,
    RecipeViewModel, SwapViewModel, User,
};
use crate::normalize::{MealFilter, NutritionPeriod, Outcome};
use crate::parsers::MealPlanPayload;
use crate::store::{Action, AppStore, ConnectionStatus, ToastKind};
use log::{error, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Application handle: backend client plus shared state
#[derive(Debug, Clone)]
pub struct App {
    api: ApiClient,
    store: AppStore,
    config: ClientConfig,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn new(api: ApiClient, store: AppStore, config: ClientConfig) -> Self {
        Self { api, store, config }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn analysis_flow(&self) -> AnalysisFlow {
        AnalysisFlow::new(Arc::new(self.api.clone()), self.store.clone())
            .with_max_image_bytes(self.config.max_image_bytes)
    }

    fn toast(&self, message: impl Into<String>, kind: ToastKind) {
        self.store.notify(message, kind);
    }

    /// Probe the backend and record whether it is reachable
    pub async fn test_connection(&self) -> bool {
        let online = match self.api.health().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Backend unreachable: {}", e);
                false
            }
        };
        let status = if online {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        };
        self.store.dispatch(Action::SetConnection(status));
        online
    }

    pub async fn init_session(&self) -> bool {
        if !self.store.is_online() {
            self.toast("Cannot create session while offline", ToastKind::Error);
            return false;
        }
        match self.api.create_session().await {
            Ok(session) => {
                self.store.dispatch(Action::SetSession(session.session_id));
                true
            }
            Err(e) => {
                error!("Session creation error: {}", e);
                self.toast(format!("Failed to create session: {}", e), ToastKind::Error);
                false
            }
        }
    }

    /// Startup: probe the backend, then reuse the stored session (or create
    /// one) and restore the stored user. Returns whether the backend is online.
    pub async fn start(&self) -> bool {
        if !self.test_connection().await {
            return false;
        }

        let stored = self
            .store
            .storage()
            .map(|storage| storage.load().unwrap_or_default())
            .unwrap_or_default();

        match stored.session_id {
            Some(id) => self.store.dispatch(Action::SetSession(id)),
            None => {
                self.init_session().await;
            }
        }

        if let Some(user_id) = stored.user_id {
            match self.api.get_user(&user_id).await {
                Ok(user) => {
                    info!("Restored user {}", user.id);
                    self.store.dispatch(Action::SignIn(user));
                }
                Err(e) => {
                    warn!("Failed to restore user session: {}", e);
                    if let Some(storage) = self.store.storage() {
                        if let Err(e) = storage.update(|s| s.user_id = None) {
                            warn!("Could not clear stored user: {}", e);
                        }
                    }
                }
            }
        }
        true
    }

    pub async fn login(&self, profile: &GoogleProfile) -> Option<User> {
        if !self.store.is_online() {
            self.toast(
                "Cannot sign in while offline. Please check your connection.",
                ToastKind::Error,
            );
            return None;
        }
        match self.api.login_google(profile).await {
            Ok(user) => {
                self.store.dispatch(Action::SignIn(user.clone()));
                self.toast(
                    format!("Welcome, {}!", profile.display_name()),
                    ToastKind::Success,
                );
                Some(user)
            }
            Err(e) => {
                error!("Authentication error: {}", e);
                self.toast(format!("Authentication failed: {}", e), ToastKind::Error);
                None
            }
        }
    }

    pub fn logout(&self) {
        self.store.dispatch(Action::SignOut);
        self.toast("Logged out successfully", ToastKind::Info);
    }

    pub async fn update_profile(&self, profile: &Value) -> Option<User> {
        let user = self.store.user()?;
        if !self.store.is_online() {
            self.toast("Cannot save profile while offline", ToastKind::Error);
            return None;
        }
        match self.api.update_user(&user.id, profile).await {
            Ok(updated) => {
                self.store.dispatch(Action::UpdateUser(updated.clone()));
                self.toast("Profile saved successfully!", ToastKind::Success);
                Some(updated)
            }
            Err(e) => {
                self.toast(format!("Profile save failed: {}", e), ToastKind::Error);
                None
            }
        }
    }

    /// Generate a recipe for an analysed meal. When generation fails the
    /// placeholder recipe is returned so there is still something to show.
    pub async fn generate_recipe(&self, analysis: &AnalysisData) -> Option<RecipeViewModel> {
        if !self.store.is_online() {
            self.toast("Cannot generate recipe while offline", ToastKind::Error);
            return None;
        }
        self.toast("Generating recipe...", ToastKind::Info);
        match self.api.generate_recipe(analysis).await {
            Ok(recipe) => {
                self.toast("Recipe generated successfully!", ToastKind::Success);
                Some(recipe)
            }
            Err(e) => {
                error!("Recipe generation error: {}", e);
                self.toast(format!("Failed to generate recipe: {}", e), ToastKind::Error);
                Some(RecipeViewModel::failed())
            }
        }
    }

    pub async fn healthy_swaps(&self, analysis: &AnalysisData) -> Option<Vec<SwapViewModel>> {
        if !self.store.is_online() {
            self.toast("Cannot get healthy swaps while offline", ToastKind::Error);
            return None;
        }
        self.toast("Finding healthy alternatives...", ToastKind::Info);
        match self.api.healthy_swaps(analysis).await {
            Ok(Outcome::Ok(swaps)) => {
                self.toast("Healthy swaps found!", ToastKind::Success);
                Some(swaps)
            }
            Ok(Outcome::Empty(reason)) => {
                self.toast(reason, ToastKind::Info);
                Some(Vec::new())
            }
            Ok(Outcome::Error(reason)) => {
                self.toast(format!("Failed to get healthy swaps: {}", reason), ToastKind::Error);
                None
            }
            Err(e) => {
                self.toast(format!("Failed to get healthy swaps: {}", e), ToastKind::Error);
                None
            }
        }
    }

    pub async fn nutrition_insights(&self, analysis: &AnalysisData) -> Option<InsightsViewModel> {
        if !self.store.is_online() {
            self.toast("Cannot get nutrition insights while offline", ToastKind::Error);
            return None;
        }
        self.toast("Analyzing nutrition insights...", ToastKind::Info);
        match self.api.nutrition_insights(analysis).await {
            Ok(insights) => {
                self.toast("Nutrition insights ready!", ToastKind::Success);
                Some(insights)
            }
            Err(e) => {
                self.toast(
                    format!("Failed to get nutrition insights: {}", e),
                    ToastKind::Error,
                );
                None
            }
        }
    }

    pub async fn meal_plan(&self, preferences: &MealPlanPreferences) -> Option<MealPlanPayload> {
        let Some(user) = self.store.user() else {
            self.toast(
                "Please login first to generate a personalized meal plan",
                ToastKind::Error,
            );
            return None;
        };
        if !self.store.is_online() {
            self.toast("Cannot generate meal plan while offline", ToastKind::Error);
            return None;
        }
        match self.api.meal_plan(&user, preferences).await {
            Ok(plan) => {
                self.toast("Meal plan generated successfully!", ToastKind::Success);
                Some(plan)
            }
            Err(e) => {
                self.toast(format!("Failed to generate meal plan: {}", e), ToastKind::Error);
                None
            }
        }
    }

    /// Send one message to the health coach. Failures come back as an
    /// apology reply rather than an error.
    pub async fn chat(&self, session: &mut ChatSession, message: &str) -> Option<ChatReply> {
        if message.trim().is_empty() {
            return None;
        }
        if !self.store.is_online() {
            self.toast("This feature requires an internet connection", ToastKind::Error);
            return None;
        }
        let Some(user) = self.store.user() else {
            self.toast(
                "Please login for personalized AI health coaching",
                ToastKind::Warning,
            );
            return None;
        };

        let body = session.request_body(&user, message);
        match self.api.chat(&user.id, &body).await {
            Ok(reply) => {
                if let Some(alert) = &reply.urgent_alert {
                    self.toast(alert.clone(), ToastKind::Warning);
                } else if let Some(hint) = &reply.proactive_hint {
                    self.toast(hint.clone(), ToastKind::Info);
                }
                session.record(message, &reply);
                Some(reply)
            }
            Err(e) => {
                error!("Chat error: {}", e);
                Some(apology(&e))
            }
        }
    }

    /// Home dashboard insights; quietly empty when unavailable
    pub async fn dashboard(&self) -> Option<Value> {
        let user = self.store.user()?;
        if !self.store.is_online() {
            return None;
        }
        match self.api.dashboard_insights(&user.id).await {
            Ok(insights) => insights,
            Err(e) => {
                error!("Failed to load insights: {}", e);
                None
            }
        }
    }

    pub async fn nutrition(&self, period: NutritionPeriod) -> Option<NutritionDashboard> {
        let user = self.store.user()?;
        match self.api.nutrition_dashboard(&user.id, period).await {
            Ok(dashboard) => Some(dashboard),
            Err(e) => {
                error!("Error fetching nutrition data: {}", e);
                self.toast("Failed to load nutrition data", ToastKind::Error);
                None
            }
        }
    }

    /// Logged meals after filtering, with statistics over the whole history
    pub async fn history(&self, filter: &MealFilter) -> Option<(Vec<Value>, HistoryStats)> {
        let user = self.store.user()?;
        if !self.store.is_online() {
            return None;
        }
        match self.api.user_meals(&user.id).await {
            Ok(meals) => {
                let stats = HistoryStats::from_meals(&meals);
                Some((filter.apply(&meals), stats))
            }
            Err(e) => {
                error!("History error: {}", e);
                self.toast("Failed to load meal history", ToastKind::Error);
                None
            }
        }
    }
}
