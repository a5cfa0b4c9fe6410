//! Remote favorites service client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExerciseId, RemoteFavorite};
use crate::util::{compact_text, is_http_url, normalize_text_option};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid favorites API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Favorites API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Favorites API error: {0}")]
    Api(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The remote favorites service for the signed-in user.
///
/// The service exposes full snapshots only: fetch-all and replace-all,
/// no incremental sync protocol.
#[allow(async_fn_in_trait)]
pub trait FavoritesApi {
    /// Fetch the server's full favorite snapshot
    async fn fetch_favorites(&self, access_token: &str) -> ApiResult<Vec<RemoteFavorite>>;

    /// Replace the server's favorite set with `exercise_ids`
    async fn replace_favorites(
        &self,
        access_token: &str,
        exercise_ids: &[ExerciseId],
    ) -> ApiResult<()>;
}

/// HTTP implementation of `FavoritesApi` against the Liftmark API.
#[derive(Clone)]
pub struct HttpFavoritesApi {
    favorites_url: String,
    client: reqwest::Client,
}

impl HttpFavoritesApi {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            favorites_url: format!("{base_url}/v1/favorites"),
            client: reqwest::Client::builder().build()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FavoritesResponse {
    favorites: Vec<RemoteFavorite>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceFavoritesRequest<'a> {
    exercise_ids: &'a [ExerciseId],
}

impl FavoritesApi for HttpFavoritesApi {
    async fn fetch_favorites(&self, access_token: &str) -> ApiResult<Vec<RemoteFavorite>> {
        let response = self
            .client
            .get(&self.favorites_url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }

        let payload = response.json::<FavoritesResponse>().await?;
        Ok(payload.favorites)
    }

    async fn replace_favorites(
        &self,
        access_token: &str,
        exercise_ids: &[ExerciseId],
    ) -> ApiResult<()> {
        let response = self
            .client
            .put(&self.favorites_url)
            .bearer_auth(access_token)
            .json(&ReplaceFavoritesRequest { exercise_ids })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
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

fn normalize_base_url(raw: String) -> ApiResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        ApiError::InvalidConfiguration("base URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(ApiError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
