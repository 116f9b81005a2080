use std::{cmp::Ordering, time::Duration};

use chrono::{SecondsFormat, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::types::PlaylistTableRow;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner used for every long-running stage.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS),
    );
    pb
}

/// Renders a scalar JSON value as a CSV cell.
///
/// Strings are written without quotes, `null` becomes the empty cell. Containers
/// never reach a table after flattening but fall back to their JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Reads a string at a JSON pointer (`/track/id`), ignoring empty strings.
pub fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Number of calls needed to cover `len` references in chunks of `chunk_size`.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

pub fn sort_playlist_table_rows(rows: &mut Vec<PlaylistTableRow>) {
    rows.sort_by(|a, b| {
        match a.name.to_lowercase().cmp(&b.name.to_lowercase()) {
            Ordering::Equal => a.id.cmp(&b.id), // secondary sort: id ascending
            other => other,
        }
    });
}

/// Playlist name as shown in listings; unnamed playlists get a placeholder.
pub fn playlist_row(playlist: &Value) -> PlaylistTableRow {
    PlaylistTableRow {
        name: string_at(playlist, "/name").unwrap_or_else(|| "<unnamed>".to_string()),
        owner: string_at(playlist, "/owner/display_name")
            .or_else(|| string_at(playlist, "/owner/id"))
            .unwrap_or_default(),
        tracks: playlist
            .pointer("/tracks/total")
            .map(cell_text)
            .unwrap_or_default(),
        id: string_at(playlist, "/id").unwrap_or_default(),
    }
}
