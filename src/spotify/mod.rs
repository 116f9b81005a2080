//! # Spotify Integration Module
//!
//! This module is the only place that knows about the Spotify Web API. It
//! implements the pipeline's [`Transport`], [`crate::pipeline::ChildSource`]
//! and [`crate::pipeline::BatchLookup`] seams on top of reqwest and maps
//! Spotify's collections onto the exported tables.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer
//!     ↓
//! Pipeline (pages, expand, references, resolve)
//!     ↓
//! Spotify Integration Layer
//!     ├── Authentication (client credentials)
//!     ├── Playlists (user playlists, playlist tracks)
//!     ├── Artists (several-artists batch lookup)
//!     └── Export (table layouts)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Request context
//!
//! Authentication happens once per run. Its result is folded into a
//! [`RequestContext`] together with the API base URL, the user ID and the HTTP
//! client. The context is immutable and is passed by reference to every call;
//! nothing below this point reads configuration.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client credentials exchange
//! - `GET /users/{user_id}/playlists` - paginated playlists of a user
//! - `GET /playlists/{playlist_id}/tracks` - paginated tracks, with field selection
//! - `GET /artists?ids=...` - up to 50 artists per call
//!
//! ## Error Handling
//!
//! Non-success responses become a [`FetchError`] carrying the URL, the HTTP
//! status and the structured error from the body. There is no retry; the
//! pipeline decides how far a failure reaches.

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::{
    Res,
    error::{Error, FetchError},
    pipeline::Transport,
    types::{ApiErrorBody, Token},
};

pub mod artists;
pub mod auth;
pub mod export;
pub mod playlists;

/// Everything a request needs, built once after authentication.
#[derive(Clone)]
pub struct RequestContext {
    client: Client,
    api_url: String,
    user_id: String,
    token: Token,
}

impl RequestContext {
    pub fn new(client: Client, api_url: impl Into<String>, user_id: impl Into<String>, token: Token) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            user_id: user_id.into(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Transport for RequestContext {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token.access_token)
            .send()
            .await
            .map_err(|e| FetchError::new(url, "request_failed", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(url, status, &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::new(url, "invalid_json", e.to_string()))
    }
}

/// Builds a [`FetchError`] from a non-success response body.
pub fn error_from_response(url: &str, status: StatusCode, body: &str) -> FetchError {
    let error = match ApiErrorBody::parse(body) {
        Some(parsed) => FetchError::new(url, parsed.error, parsed.description),
        None => FetchError::new(
            url,
            status.canonical_reason().unwrap_or("http_error"),
            body.trim(),
        ),
    };
    error.with_status(status.as_u16())
}

/// Joins `segments` onto `api_url` (percent-encoding each one) and appends `query`.
///
/// # Example
///
/// ```
/// let url = endpoint_url("https://api.spotify.com/v1", &["users", "me", "playlists"], &[("limit", "50".to_string())])?;
/// assert_eq!(url, "https://api.spotify.com/v1/users/me/playlists?limit=50");
/// ```
pub fn endpoint_url(api_url: &str, segments: &[&str], query: &[(&str, String)]) -> Res<String> {
    let mut url = Url::parse(api_url)
        .map_err(|e| Error::Config(format!("Invalid API URL {}: {}", api_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("API URL {} cannot take a path", api_url)))?
        .pop_if_empty()
        .extend(segments);

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url.to_string())
}
