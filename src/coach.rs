use crate::error::ClientError;
use crate::model::{ChatReply, User};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;

/// Exchanges kept locally
const HISTORY_LIMIT: usize = 8;
/// Exchanges sent along with each message
const CONTEXT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub user: String,
    pub agent: String,
    pub session_id: Option<String>,
    pub timestamp: String,
}

/// Conversation state for the health coach
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: VecDeque<Exchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> impl Iterator<Item = &Exchange> {
        self.history.iter()
    }

    /// Build the `/agentic/chat/{user}` body for `message`
    pub fn request_body(&self, user: &User, message: &str) -> Value {
        let now = Utc::now();
        let session = format!("health_coach_{}", now.timestamp_millis());
        let recent: Vec<&Exchange> = self
            .history
            .iter()
            .skip(self.history.len().saturating_sub(CONTEXT_LIMIT))
            .collect();
        let profile = if user.profile.is_null() {
            json!({})
        } else {
            user.profile.clone()
        };

        json!({
            "message": message,
            "session_id": session,
            "context": {
                "user_id": user.id,
                "chat_history": recent,
                "current_session": session,
                "interaction_type": "health_coaching",
                "user_profile": profile,
                "request_timestamp": now.to_rfc3339(),
                "preferences": {
                    "response_style": "concise_friendly",
                    "max_response_length": "medium",
                    "include_context_hints": true
                }
            }
        })
    }

    pub fn record(&mut self, message: &str, reply: &ChatReply) {
        self.history.push_back(Exchange {
            user: message.to_string(),
            agent: reply.message.clone(),
            session_id: reply.session_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
        });
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

/// Reply shown in the conversation when the coach could not be reached
pub fn apology(error: &ClientError) -> ChatReply {
    let hint = match error {
        ClientError::StatusError { status: 404, .. } => "Please make sure you're logged in",
        ClientError::StatusError { status: 500, .. } => "Give me a moment to reconnect",
        _ => "Check your connection and try again",
    };
    ChatReply {
        message: format!("Oops! I'm having trouble right now. {}", hint),
        response_type: "error".to_string(),
        suggestions: Vec::new(),
        confidence: 0.0,
        session_id: None,
        urgent_alert: None,
        proactive_hint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apology_by_status() {
        let not_found = ClientError::StatusError {
            context: "Enhanced chat failed".into(),
            status: 404,
        };
        assert!(apology(&not_found).message.ends_with("make sure you're logged in"));
        let offline = ClientError::OfflineError("offline".into());
        assert_eq!(apology(&offline).response_type, "error");
        assert!(apology(&offline).message.ends_with("try again"));
    }

    fn reply(message: &str) -> ChatReply {
        ChatReply::from_response(&json!({ "message": message }))
    }

    #[test]
    fn test_history_is_capped() {
        let mut chat = ChatSession::new();
        for i in 0..10 {
            chat.record(&format!("q{}", i), &reply(&format!("a{}", i)));
        }
        let users: Vec<&str> = chat.history().map(|e| e.user.as_str()).collect();
        assert_eq!(users.len(), 8);
        assert_eq!(users[0], "q2");
    }

    #[test]
    fn test_request_body_sends_recent_context() {
        let mut chat = ChatSession::new();
        for i in 0..5 {
            chat.record(&format!("q{}", i), &reply("ok"));
        }
        let user = User {
            id: "u1".to_string(),
            ..Default::default()
        };

        let body = chat.request_body(&user, "Is ragi good for me?");
        assert_eq!(body["message"], "Is ragi good for me?");
        assert!(body["session_id"]
            .as_str()
            .unwrap()
            .starts_with("health_coach_"));
        let history = body["context"]["chat_history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0]["user"], "q2");
        assert_eq!(body["context"]["user_profile"], json!({}));
        assert_eq!(body["context"]["preferences"]["include_context_hints"], true);
    }
}
