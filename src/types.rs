use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// One page of a paginated collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
}

impl Page {
    /// Continuation URL, treating an empty string like an absent one.
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// The structured part of an error response.
///
/// The accounts service answers with `{error, error_description}` while the
/// Web API nests `{status, message}` under `error`; both land here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error: String,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detail {
        status: Option<u16>,
        message: Option<String>,
    },
}

#[derive(Deserialize)]
struct RawErrorBody {
    error: ErrorField,
    error_description: Option<String>,
}

impl ApiErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        let raw: RawErrorBody = serde_json::from_str(body).ok()?;
        let parsed = match raw.error {
            ErrorField::Text(error) => ApiErrorBody {
                error,
                description: raw.error_description.unwrap_or_default(),
            },
            ErrorField::Detail { status, message } => ApiErrorBody {
                error: status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                description: message.or(raw.error_description).unwrap_or_default(),
            },
        };
        Some(parsed)
    }
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct TableSummaryRow {
    pub table: String,
    pub rows: usize,
    pub skipped: usize,
    pub file: String,
}

/// Run metadata written next to the CSV tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub user_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub playlists: usize,
    pub tracks: usize,
    pub artist_references: usize,
    pub artists_resolved: usize,
    pub failed_playlists: usize,
    pub failed_artist_chunks: usize,
    pub unresolved_artists: Vec<String>,
    pub skipped_rows: usize,
}
