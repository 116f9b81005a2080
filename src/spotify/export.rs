//! Table layouts for the exported collections.
//!
//! Column names are the keys the [`Flattener`] produces with its default `_`
//! separator, so `owner.id` becomes `owner_id` and `track.album.name` becomes
//! `track_album_name`.

use serde_json::Value;

use crate::{
    error::RowError,
    flatten::{FlatRecord, Flattener},
    spotify::{artists, playlists},
    table::{Table, TableBuilder},
};

/// Field holding a playlist's ID in the playlists collection.
pub const PLAYLIST_ID_FIELD: &str = "id";

/// Key stamped onto every track item with its playlist's ID.
pub const PARENT_KEY: &str = "playlist_id";

pub const PLAYLIST_FIELDS: &[&str] = &[
    "id",
    "name",
    "owner_id",
    "snapshot_id",
    "tracks_total",
    "public",
    "collaborative",
];

pub const TRACK_FIELDS: &[&str] = &[
    "playlist_id",
    "added_at",
    "track_id",
    "track_name",
    "track_album_id",
    "track_album_name",
    "track_album_release_date",
    "track_duration_ms",
    "track_popularity",
    "track_explicit",
];

pub const TRACK_ARTIST_FIELDS: &[&str] = &["playlist_id", "track_id", "artist_id"];

pub const ARTIST_FIELDS: &[&str] = &["id", "name", "popularity", "followers_total", "uri"];

pub const ARTIST_GENRE_FIELDS: [&str; 2] = ["artist_id", "genre"];

/// Every table of one run, in write order, plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct Export {
    pub tables: Vec<Table>,
    pub skipped: Vec<RowError>,
}

impl Export {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Number of rows skipped while building `name`.
    pub fn skipped_in(&self, name: &str) -> usize {
        self.skipped.iter().filter(|e| e.table() == name).count()
    }
}

/// Flattens the raw collections and projects them onto the table layouts.
///
/// A record that cannot be flattened (a key collision, nesting beyond the
/// depth guard) or that lacks a column is skipped and reported in
/// [`Export::skipped`]; the other rows are still written.
pub fn build_tables(
    flattener: &Flattener,
    playlists: &[Value],
    tracks: &[Value],
    artists: &[Value],
) -> Export {
    let mut export = Export::default();

    for (name, fields, items) in [
        ("playlists", PLAYLIST_FIELDS, playlists),
        ("tracks", TRACK_FIELDS, tracks),
        ("artists", ARTIST_FIELDS, artists),
    ] {
        let (records, origins) = flatten_rows(flattener, name, items, &mut export.skipped);
        let (table, skipped) = TableBuilder::new(name, fields).build_lenient(&records);
        export.tables.push(table);
        export.skipped.extend(skipped.into_iter().map(|mut e| {
            e.row = origins[e.row];
            RowError::Missing(e)
        }));
    }

    export.tables.push(Table::from_rows(
        "track_artists",
        TRACK_ARTIST_FIELDS,
        playlists::track_artist_rows(tracks, PARENT_KEY),
    ));
    export.tables.push(Table::from_pairs(
        "artist_genres",
        ARTIST_GENRE_FIELDS,
        artists::artist_genre_pairs(artists),
    ));

    export
}

/// Flattens `items` one by one; failures are recorded under their input row.
/// Returns the records together with the input row each one came from.
fn flatten_rows(
    flattener: &Flattener,
    table: &str,
    items: &[Value],
    skipped: &mut Vec<RowError>,
) -> (Vec<FlatRecord>, Vec<usize>) {
    let mut records = Vec::with_capacity(items.len());
    let mut origins = Vec::with_capacity(items.len());
    for (row, item) in items.iter().enumerate() {
        match flattener.flatten(item.clone()) {
            Ok(record) => {
                records.push(record);
                origins.push(row);
            }
            Err(error) => skipped.push(RowError::Unflattenable {
                table: table.to_string(),
                row,
                error,
            }),
        }
    }
    (records, origins)
}
