use tabled::Table;

use crate::{
    cli::auth::{connect, resolve_user},
    error,
    spotify::playlists,
    success,
    types::PlaylistTableRow,
    utils, warning,
};

/// Lists the playlists of a user as a table, optionally filtered by name.
pub async fn list_playlists(user: Option<String>, search: Option<String>) {
    let user_id = resolve_user(user);
    let ctx = connect(&user_id).await;

    let pb = utils::spinner(format!("Fetching playlists of {}...", user_id));
    let remote = match playlists::get_user_playlists(&ctx).await {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlists: {}", e);
        }
    };
    pb.finish_and_clear();

    let mut rows: Vec<PlaylistTableRow> = remote.iter().map(utils::playlist_row).collect();
    utils::sort_playlist_table_rows(&mut rows);

    if let Some(search) = search {
        let search_term = search.to_lowercase();
        rows.retain(|r| r.name.to_lowercase().contains(&search_term));
    }

    if rows.is_empty() {
        warning!("No playlists found for user {}", user_id);
        return;
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    success!("{} playlists of user {}", count, user_id);
}
