//! Client library for the Celestia nutrition-tracking backend.
//!
//! The backend does the recognition, nutrition estimates and coaching; this
//! crate talks to it and turns its loosely shaped answers into typed
//! view-models that are always safe to display.
//!
//! ```
//! use celestia_client::{parse_recipe, render_safe};
//! use serde_json::json;
//!
//! let recipe = parse_recipe("## Poha\n### Ingredients\n- 1 cup poha\n- 1 onion");
//! assert_eq!(recipe.title, "Poha");
//! assert_eq!(recipe.ingredients.len(), 2);
//!
//! assert_eq!(render_safe(&json!({"title": "Tip", "message": "Drink water"})), "Tip: Drink water");
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod builder;
pub mod coach;
pub mod config;
pub mod error;
pub mod flow;
pub mod image;
pub mod model;
pub mod normalize;
pub mod parsers;
pub mod render;
pub mod store;

pub use api::{AnalysisBackend, ApiClient, MealPlanPreferences};
pub use app::App;
pub use auth::GoogleProfile;
pub use builder::AppBuilder;
pub use coach::ChatSession;
pub use config::{base_url_for_host, ClientConfig};
pub use error::ClientError;
pub use flow::{AnalysisFlow, Step};
pub use image::ImageSource;
pub use model::{
    AnalysisData, ChatReply, FoodItem, HistoryStats, InsightsViewModel, MealPlanViewModel,
    NutritionDashboard, RecipeViewModel, SwapViewModel, User,
};
pub use normalize::{
    normalize_insights, normalize_swaps, AnalysisResponse, MealFilter, MealSort, NutritionPeriod,
    Outcome,
};
pub use parsers::{parse_meal_plan, parse_recipe, MealPlanPayload};
pub use render::{render_safe, render_serialize};
pub use store::{Action, AppState, AppStore, ConnectionStatus, SessionStorage, Toast, ToastKind};
