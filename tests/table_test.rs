mod common;

use common::*;
use indicatif::ProgressBar;
use serde_json::{Value, json};
use spotab::{
    error::{FlattenError, RowError},
    flatten::Flattener,
    pipeline,
    spotify::{artists, export, playlists},
    table::{Table, TableBuilder},
};

fn records(values: Vec<Value>) -> Vec<spotab::flatten::FlatRecord> {
    Flattener::default().flatten_all(values).unwrap()
}

fn csv_string(table: &Table) -> String {
    let mut out: Vec<u8> = Vec::new();
    table.write_csv_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn sample_playlists() -> Vec<Value> {
    vec![
        json!({
            "id": "pl1",
            "name": "Road Trip",
            "owner": {"id": "u1", "display_name": "User One"},
            "snapshot_id": "s1",
            "tracks": {"href": "https://api.test/v1/playlists/pl1/tracks", "total": 2},
            "public": true,
            "collaborative": false,
            "images": [{"url": "https://i.test/1.jpg", "height": 640, "width": 640}]
        }),
        json!({
            "id": "pl2",
            "name": "Broken",
            "owner": {"id": "u1", "display_name": "User One"},
            "snapshot_id": "s2",
            "tracks": {"href": "https://api.test/v1/playlists/pl2/tracks", "total": 5},
            "public": false,
            "collaborative": false,
            "images": []
        }),
    ]
}

fn track(id: &str, name: &str, artist_ids: &[&str]) -> Value {
    let artists: Vec<Value> = artist_ids
        .iter()
        .map(|a| json!({"id": a, "name": format!("Artist {a}")}))
        .collect();
    json!({
        "added_at": "2024-05-01T10:00:00Z",
        "track": {
            "id": id,
            "name": name,
            "popularity": 50,
            "duration_ms": 200000,
            "explicit": false,
            "album": {"id": format!("al-{id}"), "name": "Album", "release_date": "2020"},
            "artists": artists
        }
    })
}

fn artist(id: &str, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Artist {id}"),
        "popularity": 70,
        "followers": {"href": null, "total": 1200},
        "genres": genres,
        "uri": format!("spotify:artist:{id}"),
        "images": [{"url": "https://i.test/a.jpg"}]
    })
}

#[test]
fn test_build_projects_columns_in_order() {
    let recs = records(vec![json!({"id": "a1", "name": "One", "followers": {"total": 3}})]);

    let table = TableBuilder::new("artists", &["name", "id", "followers_total"])
        .build(&recs)
        .unwrap();

    assert_eq!(table.header, vec!["name", "id", "followers_total"]);
    assert_eq!(table.rows, vec![vec![json!("One"), json!("a1"), json!(3)]]);
}

#[test]
fn test_build_fails_on_missing_field() {
    let recs = records(vec![json!({"id": "a1", "name": "One"}), json!({"id": "a2"})]);

    let err = TableBuilder::new("artists", &["id", "name"]).build(&recs).unwrap_err();

    assert_eq!(err.table, "artists");
    assert_eq!(err.row, 1);
    assert_eq!(err.field, "name");
}

#[test]
fn test_build_lenient_skips_and_reports() {
    let recs = records(vec![
        json!({"id": "a1", "name": "One"}),
        json!({"id": "a2"}),
        json!({"id": "a3", "name": "Three"}),
    ]);

    let (table, skipped) = TableBuilder::new("artists", &["id", "name"]).build_lenient(&recs);

    assert_eq!(table.len(), 2);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].row, 1);
    assert_eq!(
        table.column("id").unwrap(),
        vec![&json!("a1"), &json!("a3")]
    );
}

#[test]
fn test_null_field_is_kept_as_empty_cell() {
    let recs = records(vec![json!({"id": "p1", "public": null})]);

    let table = TableBuilder::new("playlists", &["id", "public"]).build(&recs).unwrap();

    assert_eq!(csv_string(&table), "id,public\np1,\n");
}

#[test]
fn test_csv_quotes_and_scalars() {
    let recs = records(vec![json!({"name": "Rock, Paper \"Scissors\"", "n": 3, "ok": true})]);

    let table = TableBuilder::new("misc", &["name", "n", "ok"]).build(&recs).unwrap();

    assert_eq!(
        csv_string(&table),
        "name,n,ok\n\"Rock, Paper \"\"Scissors\"\"\",3,true\n"
    );
}

#[test]
fn test_from_pairs_keeps_duplicates() {
    let table = Table::from_pairs(
        "artist_genres",
        ["artist_id", "genre"],
        vec![
            ("a1".to_string(), "rock".to_string()),
            ("a1".to_string(), "rock".to_string()),
        ],
    );

    assert_eq!(table.width(), 2);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_from_rows_pads_to_header() {
    let table = Table::from_rows("t", &["a", "b", "c"], vec![vec!["1".to_string()]]);

    assert_eq!(table.rows[0], vec![json!("1"), Value::Null, Value::Null]);
}

#[tokio::test]
async fn test_write_csv_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("artists.csv");
    let table = Table::from_pairs("artists", ["id", "name"], vec![("a1".to_string(), "One".to_string())]);

    table.write_csv(&path).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "id,name\na1,One\n");
}

#[test]
fn test_build_tables_from_spotify_payloads() {
    let playlists = sample_playlists();
    let mut tracks = vec![
        track("t1", "First", &["a1", "a2"]),
        track("t2", "Second", &["a2"]),
        json!({"added_at": "2024-05-02T10:00:00Z", "track": null}),
    ];
    for item in tracks.iter_mut() {
        item["playlist_id"] = json!("pl1");
    }
    let artists = vec![artist("a1", &["rock", "indie"]), artist("a2", &[])];

    let export =
        export::build_tables(&Flattener::default(), &playlists, &tracks, &artists);

    let names: Vec<&str> = export.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["playlists", "tracks", "artists", "track_artists", "artist_genres"]
    );

    let playlists_table = export.table("playlists").unwrap();
    assert_eq!(playlists_table.len(), 2);
    assert_eq!(
        playlists_table.column("owner_id").unwrap(),
        vec![&json!("u1"), &json!("u1")]
    );

    // The null track has no track_id and is skipped
    let tracks_table = export.table("tracks").unwrap();
    assert_eq!(tracks_table.len(), 2);
    assert_eq!(export.skipped_in("tracks"), 1);
    assert_eq!(
        tracks_table.column("track_album_id").unwrap(),
        vec![&json!("al-t1"), &json!("al-t2")]
    );

    let track_artists = export.table("track_artists").unwrap();
    assert_eq!(track_artists.len(), 3);
    assert_eq!(
        track_artists.rows[1],
        vec![json!("pl1"), json!("t1"), json!("a2")]
    );

    let artists_table = export.table("artists").unwrap();
    assert_eq!(
        artists_table.column("followers_total").unwrap(),
        vec![&json!(1200), &json!(1200)]
    );

    let genres = export.table("artist_genres").unwrap();
    assert_eq!(csv_string(genres), "artist_id,genre\na1,rock\na1,indie\n");
}

#[tokio::test]
async fn test_export_over_fake_api() {
    let playlists = sample_playlists();
    let transport = FakeTransport::new()
        .with(
            "https://api.test/v1/playlists/pl1/tracks",
            page(
                vec![
                    track("t1", "First", &["a1", "a2"]),
                    track("t2", "Second", &["a2", "a3"]),
                ],
                None,
            ),
        )
        .failing("https://api.test/v1/playlists/pl2/tracks", 404, "Not found")
        .with(
            "https://api.test/v1/artists",
            json!({"artists": [artist("a3", &["jazz"]), null, artist("a1", &["rock"])]}),
        );

    let source = playlists::PlaylistTracks::new(&transport, API_URL);
    let expansion = pipeline::expand(
        &playlists,
        export::PLAYLIST_ID_FIELD,
        export::PARENT_KEY,
        &source,
        &ProgressBar::hidden(),
    )
    .await;
    assert_eq!(expansion.items.len(), 2);
    assert_eq!(expansion.failures.len(), 1);

    let references = pipeline::extract(&expansion.items, artists::track_artist_ids);
    assert_eq!(references.as_slice(), &["a1", "a2", "a3"]);

    let lookup = artists::SeveralArtists::new(&transport, API_URL);
    let resolution = pipeline::resolve(references.as_slice(), 50, &lookup, &ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(resolution.calls, 1);
    assert_eq!(resolution.unresolved, vec!["a2".to_string()]);

    let artist_call = transport.calls().last().cloned().unwrap();
    assert!(artist_call.starts_with("https://api.test/v1/artists?ids=a1%2Ca2%2Ca3"));

    let export = export::build_tables(
        &Flattener::default(),
        &playlists,
        &expansion.items,
        &resolution.entities,
    );

    let artists_table = export.table("artists").unwrap();
    assert_eq!(
        artists_table.column("id").unwrap(),
        vec![&json!("a1"), &json!("a3")]
    );
    assert_eq!(export.table("track_artists").unwrap().len(), 4);
    assert!(export.skipped.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let summary = spotab::cli::write_tables(&export, dir.path()).await.unwrap();
    assert_eq!(summary.len(), 5);
    assert!(dir.path().join("track_artists.csv").is_file());
}

#[test]
fn test_colliding_keys_skip_the_row() {
    let mut clashing = sample_playlists().remove(0);
    clashing["owner_id"] = json!("explicit-owner");
    let playlists = vec![clashing, sample_playlists().remove(1)];

    let export = export::build_tables(&Flattener::default(), &playlists, &[], &[]);

    let table = export.table("playlists").unwrap();
    assert_eq!(table.column("id").unwrap(), vec![&json!("pl2")]);
    assert_eq!(
        table.column("owner_id").unwrap(),
        vec![&json!("u1")]
    );
    assert_eq!(
        export.skipped,
        vec![RowError::Unflattenable {
            table: "playlists".to_string(),
            row: 0,
            error: FlattenError::KeyCollision {
                key: "owner_id".to_string()
            },
        }]
    );
    assert_eq!(export.skipped_in("playlists"), 1);
}

#[test]
fn test_skipped_rows_keep_their_input_position() {
    let mut tracks = vec![
        json!({"added_at": "x", "track": {"id": "t0"}, "track_id": "clash"}),
        track("t1", "First", &["a1"]),
        json!({"added_at": "y", "track": null}),
    ];
    for item in tracks.iter_mut() {
        item["playlist_id"] = json!("pl1");
    }

    let export = export::build_tables(&Flattener::default(), &[], &tracks, &[]);

    let rows: Vec<usize> = export
        .skipped
        .iter()
        .map(|e| match e {
            RowError::Missing(e) => e.row,
            RowError::Unflattenable { row, .. } => *row,
        })
        .collect();
    assert_eq!(rows, vec![0, 2]);
    assert_eq!(export.table("tracks").unwrap().len(), 1);
}
