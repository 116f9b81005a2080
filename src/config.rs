//! Configuration management for the Spotify playlist exporter.
//!
//! This module handles loading and accessing configuration values from environment
//! variables, `.env` files and the credentials file. Values are read once when a
//! run starts and folded into an immutable [`crate::spotify::RequestContext`];
//! nothing downstream reads the environment again.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command-line flags (highest priority, applied by the CLI layer)
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{Res, error::Error};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_CREDENTIALS_FILE: &str = ".creds.json";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Maximum number of artist IDs the several-artists endpoint accepts.
pub const ARTIST_BATCH_LIMIT: usize = 50;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `spotab/.env` inside the platform-specific local
/// data directory:
/// - Linux: `~/.local/share/spotab/.env`
/// - macOS: `~/Library/Application Support/spotab/.env`
/// - Windows: `%LOCALAPPDATA%/spotab/.env`
///
/// # Errors
///
/// Returns [`Error::Config`] if the directory cannot be created or the `.env`
/// file exists but cannot be read or parsed. A missing file is not an error;
/// plain environment variables and defaults apply.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Config(format!("Cannot create {}: {}", parent.display(), e)))?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map_err(|e| Error::Config(format!("Cannot load {}: {}", path.display(), e)))?;
    Ok(())
}

/// Returns the application's local data directory (`<data_local_dir>/spotab`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotab");
    path
}

/// Returns the Spotify Web API base URL without a trailing slash.
///
/// Reads `SPOTIFY_API_URL`, falling back to [`DEFAULT_API_URL`].
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the token endpoint used for the client credentials exchange.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, falling back to [`DEFAULT_TOKEN_URL`].
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string())
}

/// Returns the Spotify user whose playlists are exported, if configured.
pub fn spotify_user() -> Option<String> {
    env::var("SPOTIFY_USER_ID").ok().filter(|u| !u.is_empty())
}

/// Returns the path of the JSON credentials file.
pub fn credentials_path() -> PathBuf {
    env::var("SPOTAB_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_FILE))
}

/// Returns the directory CSV tables are written to.
pub fn output_dir() -> PathBuf {
    env::var("SPOTAB_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// Client credentials registered with Spotify's developer platform.
///
/// The on-disk format is the one the exporter has always used:
///
/// ```json
/// { "CLIENT_ID": "...", "CLIENT_SECRET": "..." }
/// ```
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "CLIENT_ID")]
    pub client_id: String,
    #[serde(rename = "CLIENT_SECRET")]
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads credentials from a JSON file.
    pub async fn load(path: &Path) -> Res<Self> {
        let content = async_fs::read_to_string(path).await?;
        let creds: Credentials = serde_json::from_str(&content)?;
        if creds.client_id.is_empty() || creds.client_secret.is_empty() {
            return Err(Error::Config(format!(
                "{} has an empty CLIENT_ID or CLIENT_SECRET",
                path.display()
            )));
        }
        Ok(creds)
    }

    /// Reads `SPOTIFY_API_AUTH_CLIENT_ID` and `SPOTIFY_API_AUTH_CLIENT_SECRET`.
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("SPOTIFY_API_AUTH_CLIENT_ID").ok()?;
        let client_secret = env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").ok()?;
        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }
        Some(Self {
            client_id,
            client_secret,
        })
    }

    /// Loads credentials from `path` when it exists, otherwise from the environment.
    pub async fn resolve(path: &Path) -> Res<Self> {
        if path.is_file() {
            return Self::load(path).await;
        }

        Self::from_env().ok_or_else(|| {
            Error::Config(format!(
                "No credentials found: {} does not exist and SPOTIFY_API_AUTH_CLIENT_ID/SPOTIFY_API_AUTH_CLIENT_SECRET are not set",
                path.display()
            ))
        })
    }
}
