use std::collections::HashSet;

use serde_json::Value;

use crate::{error::FetchError, pipeline::Transport, types::Page};

/// Follows `next` links from `start_url` and returns every item in page order.
///
/// The walk stops when a page's `next` is absent, `null` or empty. It is
/// fail-fast: the first failing page aborts the walk and the items collected
/// so far are dropped. A `next` link pointing at a page already fetched in this
/// walk is reported as an error rather than followed.
///
/// # Example
///
/// ```
/// let playlists = fetch_all(&ctx, &spotify::playlists::user_playlists_url(&ctx)?).await?;
/// ```
pub async fn fetch_all<T: Transport>(
    transport: &T,
    start_url: &str,
) -> Result<Vec<Value>, FetchError> {
    let mut items: Vec<Value> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next: Option<String> = Some(start_url.to_string());

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            return Err(FetchError::new(
                url,
                "page_cycle",
                "The continuation link points at a page that was already fetched",
            ));
        }

        let page = fetch_page(transport, &url).await?;
        next = page.next_url().map(str::to_string);
        items.extend(page.items);
    }

    Ok(items)
}

/// Fetches and decodes a single page.
pub async fn fetch_page<T: Transport>(transport: &T, url: &str) -> Result<Page, FetchError> {
    let body = transport.get_json(url).await?;
    serde_json::from_value::<Page>(body)
        .map_err(|e| FetchError::new(url, "invalid_page", e.to_string()))
}
