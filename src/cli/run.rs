use std::path::{Path, PathBuf};

use serde_json::Value;
use tabled::Table;

use crate::{
    Res,
    cli::auth::{connect, resolve_user},
    config, error,
    flatten::Flattener,
    info,
    management::{CHECKPOINT_ARTISTS, CHECKPOINT_PLAYLISTS, CHECKPOINT_TRACKS, CheckpointManager},
    pipeline::{self, ReferenceSet, Resolution},
    spotify::{
        RequestContext, artists,
        export::{self, Export},
        playlists,
    },
    success,
    types::{RunManifest, TableSummaryRow},
    utils, warning,
};

pub struct RunOptions {
    pub user: Option<String>,
    pub out: Option<PathBuf>,
    pub checkpoint: bool,
    pub resume: bool,
    pub chunk_size: usize,
}

/// Runs the whole export: playlists, their tracks, the artists behind the
/// tracks, then every table written as CSV next to a run manifest.
///
/// Authentication and the playlists walk are fatal when they fail since
/// nothing downstream can run without them. A playlist whose tracks cannot
/// be fetched and an artist chunk that cannot be resolved are reported and
/// skipped.
///
/// With `checkpoint` the raw collections are written to the checkpoint
/// directory; the tracks checkpoint only when every playlist expanded. With
/// `resume` collections found there are loaded instead of fetched, and
/// artists referenced by the tracks but missing from the artists checkpoint
/// are still resolved.
pub async fn run(opts: RunOptions) {
    let started_at = utils::timestamp_now();
    let user_id = resolve_user(opts.user);
    let out_dir = opts.out.unwrap_or_else(config::output_dir);
    let checkpoints = CheckpointManager::for_user(&user_id);

    let ctx = connect(&user_id).await;
    success!("Authenticated. Exporting playlists of user {}", user_id);

    let playlist_items = match resumed(&checkpoints, CHECKPOINT_PLAYLISTS, opts.resume).await {
        Some(p) => p,
        None => {
            let pb = utils::spinner(format!("Fetching playlists of {}...", user_id));
            let fetched = playlists::get_user_playlists(&ctx).await;
            pb.finish_and_clear();
            match fetched {
                Ok(p) => p,
                Err(e) => error!("Failed to fetch playlists: {}", e),
            }
        }
    };
    success!("{} playlists", playlist_items.len());
    save_checkpoint(&checkpoints, CHECKPOINT_PLAYLISTS, &playlist_items, 0, opts.checkpoint).await;

    let (tracks, failed_playlists) =
        match resumed(&checkpoints, CHECKPOINT_TRACKS, opts.resume).await {
            Some(t) => (t, 0),
            None => fetch_tracks(&ctx, &playlist_items).await,
        };
    success!("{} tracks across {} playlists", tracks.len(), playlist_items.len());
    save_checkpoint(
        &checkpoints,
        CHECKPOINT_TRACKS,
        &tracks,
        failed_playlists,
        opts.checkpoint,
    )
    .await;

    let references = pipeline::extract(&tracks, artists::track_artist_ids);
    info!("{} distinct artists referenced", references.len());

    let known = resumed(&checkpoints, CHECKPOINT_ARTISTS, opts.resume)
        .await
        .unwrap_or_default();
    let resolution = resolve_artists(&ctx, &references, known, opts.chunk_size).await;
    success!(
        "{} of {} artists resolved",
        resolution.entities.len(),
        references.len()
    );
    save_checkpoint(
        &checkpoints,
        CHECKPOINT_ARTISTS,
        &resolution.entities,
        0,
        opts.checkpoint,
    )
    .await;

    let export = export::build_tables(
        &Flattener::default(),
        &playlist_items,
        &tracks,
        &resolution.entities,
    );
    for skipped in &export.skipped {
        warning!("{}", skipped);
    }

    let summary = match write_tables(&export, &out_dir).await {
        Ok(summary) => summary,
        Err(e) => error!("Cannot write tables to {}. Err: {}", out_dir.display(), e),
    };
    println!("{}", Table::new(summary));

    let manifest = RunManifest {
        user_id: user_id.clone(),
        started_at,
        finished_at: utils::timestamp_now(),
        playlists: playlist_items.len(),
        tracks: tracks.len(),
        artist_references: references.len(),
        artists_resolved: resolution.entities.len(),
        failed_playlists,
        failed_artist_chunks: resolution.failures.len(),
        unresolved_artists: resolution.unresolved,
        skipped_rows: export.skipped.len(),
    };
    if let Err(e) = CheckpointManager::new(&out_dir).persist("manifest", &manifest).await {
        warning!("Cannot write run manifest. Err: {}", e);
    }

    success!("Tables written to {}", out_dir.display());
}

async fn fetch_tracks(ctx: &RequestContext, playlist_items: &[Value]) -> (Vec<Value>, usize) {
    let pb = utils::spinner("Fetching playlist tracks...");
    let source = playlists::PlaylistTracks::new(ctx, ctx.api_url());
    let expansion = pipeline::expand(
        playlist_items,
        export::PLAYLIST_ID_FIELD,
        export::PARENT_KEY,
        &source,
        &pb,
    )
    .await;
    pb.finish_and_clear();

    for failure in &expansion.failures {
        warning!("{}", failure);
    }
    (expansion.items, expansion.failures.len())
}

/// Resolves every referenced artist not already in `known`.
async fn resolve_artists(
    ctx: &RequestContext,
    references: &ReferenceSet,
    known: Vec<Value>,
    chunk_size: usize,
) -> Resolution {
    let pb = utils::spinner("Resolving artists...");
    let lookup = artists::SeveralArtists::new(ctx, ctx.api_url());
    let resolved =
        pipeline::resolve_missing(references.as_slice(), known, chunk_size, &lookup, &pb).await;
    pb.finish_and_clear();

    let resolution = match resolved {
        Ok(r) => r,
        Err(e) => error!("Cannot resolve artists. Err: {}", e),
    };

    for failure in &resolution.failures {
        warning!("{}", failure);
    }
    if !resolution.unresolved.is_empty() {
        warning!(
            "{} artists were not returned by the lookup: {}",
            resolution.unresolved.len(),
            resolution.unresolved.join(",")
        );
    }

    resolution
}

/// Loads a checkpoint when resuming; `None` means fetch from remote.
async fn resumed(checkpoints: &CheckpointManager, name: &str, resume: bool) -> Option<Vec<Value>> {
    if !resume {
        return None;
    }
    if !checkpoints.exists(name) {
        warning!("No {} checkpoint in {}, fetching from remote", name, checkpoints.dir().display());
        return None;
    }

    match checkpoints.load::<Vec<Value>>(name).await {
        Ok(items) => {
            info!("Loaded {} {} from checkpoint", items.len(), name);
            Some(items)
        }
        Err(e) => {
            warning!("Cannot load {} checkpoint, fetching from remote. Err: {}", name, e);
            None
        }
    }
}

async fn save_checkpoint(
    checkpoints: &CheckpointManager,
    name: &str,
    items: &[Value],
    failures: usize,
    enabled: bool,
) {
    if !enabled {
        return;
    }
    match checkpoints.persist_complete(name, items, failures).await {
        Ok(Some(path)) => info!("Checkpoint written to {}", path.display()),
        Ok(None) => warning!(
            "No {} checkpoint written: {} requests failed, a resume will fetch them again",
            name,
            failures
        ),
        Err(e) => warning!("Cannot write {} checkpoint. Err: {}", name, e),
    }
}

/// Writes every table as `<out_dir>/<name>.csv`.
pub async fn write_tables(export: &Export, out_dir: &Path) -> Res<Vec<TableSummaryRow>> {
    let mut summary = Vec::with_capacity(export.tables.len());
    for table in &export.tables {
        let path = out_dir.join(format!("{}.csv", table.name));
        table.write_csv(&path).await?;
        summary.push(TableSummaryRow {
            table: table.name.clone(),
            rows: table.len(),
            skipped: export.skipped_in(&table.name),
            file: path.display().to_string(),
        });
    }
    Ok(summary)
}
