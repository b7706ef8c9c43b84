use crate::error::ClientError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Body of `POST /users/google`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

#[derive(Deserialize)]
struct CredentialClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleProfile {
    /// Read the profile claims out of a Google Sign-In ID token.
    ///
    /// The token is issued and verified by Google and the backend; the
    /// client only decodes the payload segment.
    pub fn from_credential(credential: &str) -> Result<Self, ClientError> {
        let payload = credential.split('.').nth(1).ok_or_else(|| {
            ClientError::InvalidInput("Credential is not a JWT".to_string())
        })?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims: CredentialClaims = serde_json::from_slice(&bytes)?;

        Ok(GoogleProfile {
            google_id: claims.sub,
            name: claims.name.unwrap_or_else(|| claims.email.clone()),
            email: claims.email,
            picture: claims.picture,
        })
    }

    /// Name used in the welcome message
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_decode_credential() {
        let profile = GoogleProfile::from_credential(&token(
            r#"{"sub":"1234","email":"asha@example.com","name":"Asha","picture":"https://img/p.png"}"#,
        ))
        .unwrap();
        assert_eq!(profile.google_id, "1234");
        assert_eq!(profile.display_name(), "Asha");
        assert_eq!(profile.picture.as_deref(), Some("https://img/p.png"));
    }

    #[test]
    fn test_missing_name_falls_back_to_email() {
        let profile =
            GoogleProfile::from_credential(&token(r#"{"sub":"1","email":"x@example.com"}"#))
                .unwrap();
        assert_eq!(profile.name, "x@example.com");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(GoogleProfile::from_credential("not-a-token").is_err());
        assert!(GoogleProfile::from_credential("a.!!!.c").is_err());
    }
}
