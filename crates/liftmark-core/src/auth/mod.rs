//! Shared auth/session client logic.

use std::fmt;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{compact_text, normalize_text_option, unix_timestamp_now};

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    /// Identifier of the signed-in user, the gate for remote sync.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Durable session storage (keychain on the CLI, memory in tests).
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Client for the Liftmark auth endpoints (`{base}/v1/auth/*`).
#[derive(Clone)]
pub struct AuthClient<S: SessionPersistence> {
    auth_url: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> AuthClient<S> {
    pub fn new(base_url: impl AsRef<str>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(base_url.as_ref())?;
        Ok(Self {
            auth_url,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Sign in with email/password and persist the resulting session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidConfiguration("email must not be empty"));
        }

        let response = self
            .client
            .post(format!("{}/sign-in", self.auth_url))
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;
        let session = parse_session_response(response).await?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    /// Restore the persisted session, refreshing it when expired.
    ///
    /// A refresh failure clears the stale session and reports no session
    /// rather than erroring; the caller simply sees a signed-out state.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !session.is_expired() {
            return Ok(Some(session));
        }

        match self.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Session refresh failed, signing out: {error}");
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    /// Exchange a refresh token for a new session and persist it.
    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        let response = self
            .client
            .post(format!("{}/refresh", self.auth_url))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let session = parse_session_response(response).await?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    /// Revoke the session server-side and clear the persisted copy.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/sign-out", self.auth_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<AuthUser>,
}

impl TryFrom<SessionResponse> for AuthSession {
    type Error = AuthError;

    fn try_from(value: SessionResponse) -> AuthResult<Self> {
        let access_token = value
            .access_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::Api("response did not include accessToken".to_string()))?;

        let refresh_token = value
            .refresh_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::Api("response did not include refreshToken".to_string()))?;

        let expires_at = value
            .expires_at
            .or_else(|| {
                value
                    .expires_in
                    .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
            })
            .ok_or_else(|| {
                AuthError::Api("response did not include expiresAt/expiresIn".to_string())
            })?;

        let user = value
            .user
            .ok_or_else(|| AuthError::Api("response did not include user".to_string()))?;

        Ok(Self {
            access_token,
            refresh_token,
            expires_at,
            user,
        })
    }
}

async fn parse_session_response(response: reqwest::Response) -> AuthResult<AuthSession> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Api(parse_api_error(status, &body)));
    }

    let payload = response.json::<SessionResponse>().await?;
    payload.try_into()
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<AuthErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

/// Normalize a configured API base URL into the auth endpoint root.
pub fn normalize_auth_url(base_url: &str) -> AuthResult<String> {
    let base = normalize_text_option(Some(base_url.to_string()))
        .ok_or(AuthError::InvalidConfiguration("base URL must not be empty"))?;
    if !crate::util::is_http_url(&base) {
        return Err(AuthError::InvalidConfiguration(
            "base URL must include http:// or https://",
        ));
    }

    let base = base.trim_end_matches('/');
    if base.ends_with("/v1/auth") {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}/v1/auth"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_auth_url_appends_suffix() {
        let normalized = normalize_auth_url("https://api.liftmark.app").unwrap();
        assert_eq!(normalized, "https://api.liftmark.app/v1/auth");
    }

    #[test]
    fn normalize_auth_url_keeps_suffix() {
        let normalized = normalize_auth_url("https://api.liftmark.app/v1/auth/").unwrap();
        assert_eq!(normalized, "https://api.liftmark.app/v1/auth");
    }

    #[test]
    fn normalize_auth_url_rejects_invalid_values() {
        assert!(normalize_auth_url("  ").is_err());
        assert!(normalize_auth_url("api.liftmark.app").is_err());
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user-1".to_string(),
                email: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn session_response_falls_back_to_expires_in() {
        let payload = SessionResponse {
            access_token: Some("token".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
            expires_in: Some(3600),
            user: Some(AuthUser {
                id: "user-1".to_string(),
                email: Some("a@b.c".to_string()),
            }),
        };

        let session = AuthSession::try_from(payload).unwrap();
        assert!(session.expires_at > unix_timestamp_now());
        assert!(!session.is_expired());
    }

    #[test]
    fn session_response_requires_tokens() {
        let payload = SessionResponse {
            access_token: Some("  ".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(1),
            expires_in: None,
            user: None,
        };
        assert!(AuthSession::try_from(payload).is_err());
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        let rendered = parse_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"invalid credentials"}"#,
        );
        assert_eq!(rendered, "invalid credentials (401)");
    }

    #[test]
    fn parse_api_error_falls_back_to_status() {
        let rendered = parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(rendered, "HTTP 500");
    }

    #[test]
    fn expired_session_detected_with_skew() {
        let session = AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: unix_timestamp_now() + 30,
            user: AuthUser {
                id: "user-1".to_string(),
                email: None,
            },
        };
        // Within the 60s skew window counts as expired
        assert!(session.is_expired());
    }
}
