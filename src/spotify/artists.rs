use serde_json::Value;

use crate::{
    error::FetchError,
    pipeline::{BatchLookup, Transport},
    spotify::endpoint_url,
    utils,
};

/// Artist IDs credited on one expanded track item (`track.artists[*].id`).
///
/// Items without a track (local files, removed tracks) yield nothing; an
/// artist without an ID yields `None`.
pub fn track_artist_ids(item: &Value) -> Vec<Option<String>> {
    match item.pointer("/track/artists").and_then(Value::as_array) {
        Some(artists) => artists
            .iter()
            .map(|a| a.get("id").and_then(Value::as_str).map(str::to_string))
            .collect(),
        None => Vec::new(),
    }
}

/// `(artist_id, genre)` for every genre tag of every artist, in input order.
pub fn artist_genre_pairs(artists: &[Value]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for artist in artists {
        let Some(artist_id) = utils::string_at(artist, "/id") else {
            continue;
        };
        let Some(genres) = artist.get("genres").and_then(Value::as_array) else {
            continue;
        };
        for genre in genres.iter().filter_map(Value::as_str) {
            pairs.push((artist_id.clone(), genre.to_string()));
        }
    }
    pairs
}

/// The several-artists endpoint, `GET /artists?ids=a,b,c`.
///
/// Spotify answers with `{"artists": [...]}` and a `null` entry for every
/// ID it does not know. The batch limit is
/// [`crate::config::ARTIST_BATCH_LIMIT`]; chunking is the resolver's job.
pub struct SeveralArtists<'a, T: Transport> {
    transport: &'a T,
    api_url: String,
}

impl<'a, T: Transport> SeveralArtists<'a, T> {
    pub fn new(transport: &'a T, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
        }
    }
}

impl<T: Transport> BatchLookup for SeveralArtists<'_, T> {
    async fn lookup(&self, ids: &[String]) -> Result<Vec<Value>, FetchError> {
        let url = endpoint_url(&self.api_url, &["artists"], &[("ids", ids.join(","))])
            .map_err(|e| FetchError::new(&self.api_url, "invalid_url", e.to_string()))?;

        let body = self.transport.get_json(&url).await?;
        match body.get("artists").and_then(Value::as_array) {
            Some(artists) => Ok(artists.clone()),
            None => Err(FetchError::new(
                url,
                "invalid_response",
                "The response has no `artists` array",
            )),
        }
    }
}
