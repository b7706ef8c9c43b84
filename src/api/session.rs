use super::ApiClient;
use crate::auth::GoogleProfile;
use crate::error::ClientError;
use crate::model::{Session, User};
use log::{debug, info};
use serde_json::Value;

impl ApiClient {
    /// Probe `GET /health` with the short probe timeout
    pub async fn health(&self) -> Result<Value, ClientError> {
        let request = self
            .http()
            .get(self.url("/health"))
            .timeout(self.probe_timeout());
        self.json(request, "Server responded with").await
    }

    pub async fn create_session(&self) -> Result<Session, ClientError> {
        let body = self
            .json(
                self.http().post(self.url("/sessions/")),
                "Session creation failed",
            )
            .await?;
        let session: Session = serde_json::from_value(body)?;
        info!("Created session {}", session.session_id);
        Ok(session)
    }

    pub async fn login_google(&self, profile: &GoogleProfile) -> Result<User, ClientError> {
        let request = self.http().post(self.url("/users/google")).json(profile);
        let body = self.json(request, "Authentication failed").await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ClientError> {
        let request = self.http().get(self.url(&format!("/users/{}", user_id)));
        let body = self.json(request, "User fetch failed").await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Replace the user's profile with `profile` and return the updated user
    pub async fn update_user(&self, user_id: &str, profile: &Value) -> Result<User, ClientError> {
        let request = self
            .http()
            .put(self.url(&format!("/users/{}", user_id)))
            .json(profile);
        let body = self.json(request, "Profile update failed").await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Logged meals, newest first as the backend returns them. A response
    /// that is not an array counts as no meals.
    pub async fn user_meals(&self, user_id: &str) -> Result<Vec<Value>, ClientError> {
        let request = self
            .http()
            .get(self.url(&format!("/users/{}/meals", user_id)));
        match self.json(request, "History fetch failed").await? {
            Value::Array(meals) => Ok(meals),
            other => {
                debug!("Meal history was not an array: {}", other);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/sessions/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"session_id": "abc-123"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let session = client.create_session().await.unwrap();
        assert_eq!(session.session_id, "abc-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_session_failure_context() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/")
            .with_status(503)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.create_session().await.unwrap_err();
        assert_eq!(err.to_string(), "Session creation failed: 503");
    }

    #[tokio::test]
    async fn test_login_posts_profile() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/users/google")
            .match_body(Matcher::PartialJson(json!({
                "google_id": "g-1",
                "email": "asha@example.com"
            })))
            .with_status(200)
            .with_body(r#"{"id": 7, "email": "asha@example.com", "name": "Asha"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let user = client
            .login_google(&GoogleProfile {
                google_id: "g-1".to_string(),
                email: "asha@example.com".to_string(),
                name: "Asha".to_string(),
                picture: None,
            })
            .await
            .unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.name.as_deref(), Some("Asha"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_user_meals_tolerates_non_array() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/users/7/meals")
            .with_status(200)
            .with_body(r#"{"meals": []}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        assert!(client.user_meals("7").await.unwrap().is_empty());
    }
}
