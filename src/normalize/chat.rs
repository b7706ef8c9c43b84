use super::string_list;
use crate::model::{number_from_value, ChatReply};
use crate::render::{is_truthy, render_safe};
use serde_json::Value;

const DEFAULT_REPLY: &str = "I'm here to help with your health questions!";

/// Suggestions are offered as quick replies only when there are a few of them
const MAX_QUICK_REPLIES: usize = 3;

impl ChatReply {
    /// Normalize an `/agentic/chat/{user}` response
    pub fn from_response(raw: &Value) -> Self {
        let message = raw
            .get("message")
            .map(render_safe)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPLY.to_string());

        let response_type = raw
            .get("response_type")
            .filter(|v| is_truthy(v))
            .map(render_safe)
            .unwrap_or_else(|| "general".to_string());

        let confidence = raw
            .get("confidence")
            .and_then(number_from_value)
            .filter(|c| *c != 0.0)
            .unwrap_or(0.8);

        let session_id = raw
            .get("session_id")
            .filter(|v| is_truthy(v))
            .map(render_safe);

        let urgent_alert = raw
            .get("urgent_alerts")
            .and_then(Value::as_array)
            .and_then(|alerts| alerts.first())
            .map(|alert| alert.get("message").map(render_safe).unwrap_or_else(|| render_safe(alert)))
            .filter(|alert| !alert.is_empty());

        ChatReply {
            message,
            response_type,
            suggestions: string_list(raw.get("suggested_actions")),
            confidence,
            session_id,
            urgent_alert,
            proactive_hint: raw.get("proactive_features").and_then(proactive_hint),
        }
    }

    /// Suggestions worth showing as quick-reply buttons
    pub fn quick_replies(&self) -> &[String] {
        if (1..=MAX_QUICK_REPLIES).contains(&self.suggestions.len()) {
            &self.suggestions
        } else {
            &[]
        }
    }
}

// Only the most important announcement is surfaced
fn proactive_hint(features: &Value) -> Option<String> {
    let count = |key: &str| features.get(key).and_then(number_from_value).unwrap_or(0.0);

    if count("health_insights") > 0.0 {
        Some("New health insights available!".to_string())
    } else if features.get("meal_plan_suggested").map_or(false, is_truthy) {
        Some("Meal plan suggestion ready!".to_string())
    } else if count("notifications_generated") > 0.0 {
        Some("Personalized tips generated!".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_reply() {
        let reply = ChatReply::from_response(&json!({
            "message": {"content": "Try adding more dal."},
            "response_type": "nutrition_advice",
            "suggested_actions": ["Log lunch", "Plan dinner"],
            "confidence": 0.93,
            "session_id": "health_coach_1",
            "urgent_alerts": [{"message": "Sodium is very high today"}],
            "proactive_features": {"health_insights": 0, "meal_plan_suggested": true}
        }));

        assert_eq!(reply.message, "Try adding more dal.");
        assert_eq!(reply.response_type, "nutrition_advice");
        assert_eq!(reply.quick_replies().len(), 2);
        assert_eq!(reply.confidence, 0.93);
        assert_eq!(reply.session_id.as_deref(), Some("health_coach_1"));
        assert_eq!(reply.urgent_alert.as_deref(), Some("Sodium is very high today"));
        assert_eq!(reply.proactive_hint.as_deref(), Some("Meal plan suggestion ready!"));
    }

    #[test]
    fn test_defaults() {
        let reply = ChatReply::from_response(&json!({}));
        assert_eq!(reply.message, DEFAULT_REPLY);
        assert_eq!(reply.response_type, "general");
        assert_eq!(reply.confidence, 0.8);
        assert!(reply.suggestions.is_empty());
        assert!(reply.urgent_alert.is_none());
        assert!(reply.proactive_hint.is_none());
    }

    #[test]
    fn test_too_many_suggestions_are_not_quick_replies() {
        let reply = ChatReply::from_response(&json!({
            "message": "ok",
            "suggested_actions": ["a", "b", "c", "d"]
        }));
        assert_eq!(reply.suggestions.len(), 4);
        assert!(reply.quick_replies().is_empty());
    }

    #[test]
    fn test_health_insights_take_priority() {
        let hint = proactive_hint(&json!({
            "health_insights": 2,
            "meal_plan_suggested": true,
            "notifications_generated": 1
        }));
        assert_eq!(hint.as_deref(), Some("New health insights available!"));
        assert_eq!(
            proactive_hint(&json!({"notifications_generated": 3})).as_deref(),
            Some("Personalized tips generated!")
        );
    }
}
