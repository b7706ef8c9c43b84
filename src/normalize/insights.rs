use super::string_list;
use crate::error::ClientError;
use crate::model::{InsightsViewModel, MacroBalance, Micronutrients};
use crate::render::{is_truthy, render_safe};
use serde_json::Value;

/// Normalize a `/recommendations/nutrition-insights` response.
///
/// Fails when the backend reported an error or left out `macro_balance`;
/// every other field falls back to a default.
pub fn normalize_insights(raw: &Value) -> Result<InsightsViewModel, ClientError> {
    if let Some(error) = raw.get("error").filter(|e| is_truthy(e)) {
        return Err(ClientError::ValidationError(render_safe(error)));
    }

    let macro_balance = raw
        .get("macro_balance")
        .filter(|m| is_truthy(m))
        .ok_or_else(|| {
            ClientError::ValidationError(
                "Invalid response structure: missing macro_balance data".to_string(),
            )
        })?;

    let micronutrients = raw
        .get("micronutrients")
        .map(|m| Micronutrients {
            highlights: string_list(m.get("highlights")),
            deficiencies: string_list(m.get("deficiencies")),
        })
        .unwrap_or_default();

    Ok(InsightsViewModel {
        macro_balance: MacroBalance {
            status: text_or(macro_balance.get("status"), "unknown"),
            details: text_or(macro_balance.get("details"), "No details available"),
            recommendations: string_list(macro_balance.get("recommendations")),
        },
        micronutrients,
        health_benefits: string_list(raw.get("health_benefits")),
        concerns: string_list(raw.get("concerns")),
        recommendations: string_list(raw.get("recommendations")),
    })
}

fn text_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .filter(|v| is_truthy(v))
        .map(render_safe)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_response() {
        let insights = normalize_insights(&json!({
            "macro_balance": {
                "status": "balanced",
                "details": "Good protein share",
                "recommendations": ["Add greens"]
            },
            "micronutrients": {"highlights": ["Iron"], "deficiencies": ["Vitamin D"]},
            "health_benefits": ["Sustained energy"],
            "concerns": [{"title": "Sodium", "message": "slightly high"}],
            "recommendations": ["Drink water"]
        }))
        .unwrap();

        assert_eq!(insights.macro_balance.status, "balanced");
        assert_eq!(insights.macro_balance.recommendations, vec!["Add greens"]);
        assert_eq!(insights.micronutrients.deficiencies, vec!["Vitamin D"]);
        assert_eq!(insights.concerns, vec!["Sodium: slightly high"]);
        assert_eq!(insights.recommendations, vec!["Drink water"]);
    }

    #[test]
    fn test_defaults_for_sparse_response() {
        let insights = normalize_insights(&json!({"macro_balance": {"note": "x"}})).unwrap();
        assert_eq!(insights.macro_balance.status, "unknown");
        assert_eq!(insights.macro_balance.details, "No details available");
        assert!(insights.macro_balance.recommendations.is_empty());
        assert!(insights.micronutrients.highlights.is_empty());
        assert!(insights.health_benefits.is_empty());
        assert!(insights.concerns.is_empty());
        assert!(insights.recommendations.is_empty());
    }

    #[test]
    fn test_missing_macro_balance_fails() {
        let err = normalize_insights(&json!({"concerns": []})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid response structure: missing macro_balance data"
        );
    }

    #[test]
    fn test_backend_error_is_surfaced() {
        let err = normalize_insights(&json!({
            "error": "Gemini quota exceeded",
            "macro_balance": {"status": "ok"}
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Gemini quota exceeded");
    }
}
