use serde_json::Value;

use crate::{
    Res,
    error::FetchError,
    pipeline::{ChildSource, Transport, fetch_all},
    spotify::{RequestContext, endpoint_url},
    utils,
};

pub const PLAYLIST_PAGE_LIMIT: u32 = 50;
pub const TRACK_PAGE_LIMIT: u32 = 100;

/// Server-side field selection for playlist tracks. `next` must stay in the
/// selection or pagination stops after the first page.
pub const TRACK_FIELDS: &str = "next,items(added_at,track(id,name,popularity,duration_ms,explicit,album(id,name,release_date),artists(id,name)))";

pub fn user_playlists_url(ctx: &RequestContext) -> Res<String> {
    endpoint_url(
        ctx.api_url(),
        &["users", ctx.user_id(), "playlists"],
        &[("limit", PLAYLIST_PAGE_LIMIT.to_string())],
    )
}

pub fn playlist_tracks_url(api_url: &str, playlist_id: &str) -> Res<String> {
    endpoint_url(
        api_url,
        &["playlists", playlist_id, "tracks"],
        &[
            ("limit", TRACK_PAGE_LIMIT.to_string()),
            ("fields", TRACK_FIELDS.to_string()),
        ],
    )
}

/// Retrieves every playlist of the context's user, following pagination.
///
/// # Errors
///
/// Fails fast: a single failing page aborts the walk with an
/// [`crate::error::Error::Fetch`] naming the URL.
pub async fn get_user_playlists(ctx: &RequestContext) -> Res<Vec<Value>> {
    let url = user_playlists_url(ctx)?;
    Ok(fetch_all(ctx, &url).await?)
}

/// Tracks of one playlist, fetched page by page.
pub struct PlaylistTracks<'a, T: Transport> {
    transport: &'a T,
    api_url: String,
}

impl<'a, T: Transport> PlaylistTracks<'a, T> {
    pub fn new(transport: &'a T, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
        }
    }
}

impl<T: Transport> ChildSource for PlaylistTracks<'_, T> {
    async fn children(&self, parent_id: &str) -> Result<Vec<Value>, FetchError> {
        let url = playlist_tracks_url(&self.api_url, parent_id)
            .map_err(|e| FetchError::new(&self.api_url, "invalid_url", e.to_string()))?;
        fetch_all(self.transport, &url).await
    }
}

/// `(playlist_id, track_id, artist_id)` for every artist credited on every
/// track, in track order and then credit order.
pub fn track_artist_rows(tracks: &[Value], parent_key: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for item in tracks {
        let (Some(playlist_id), Some(track_id)) = (
            item.get(parent_key).and_then(Value::as_str),
            utils::string_at(item, "/track/id"),
        ) else {
            continue;
        };

        let Some(artists) = item.pointer("/track/artists").and_then(Value::as_array) else {
            continue;
        };
        for artist in artists {
            if let Some(artist_id) = utils::string_at(artist, "/id") {
                rows.push(vec![playlist_id.to_string(), track_id.clone(), artist_id]);
            }
        }
    }
    rows
}
