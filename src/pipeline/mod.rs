//! # Entity Resolution Pipeline
//!
//! A small, generic pipeline that turns a paginated primary collection into
//! denormalized lookup tables. It knows nothing about Spotify; the Spotify
//! specifics live behind the three traits in this module.
//!
//! ```text
//! PageFetcher        fetch_all(start_url)          -> primary items
//!      ↓
//! CollectionExpander expand(items, ChildSource)     -> expanded items (stamped with parent id)
//!      ↓
//! ReferenceExtractor extract(expanded, path_fn)     -> ordered, deduplicated references
//!      ↓
//! BatchResolver      resolve(refs, n, BatchLookup)  -> resolved entities
//!      ↓
//! Flattener / TableBuilder                          -> CSV tables
//! ```
//!
//! ## Failure scoping
//!
//! Each stage decides how far a failed request reaches:
//! - a failed page aborts its whole walk and discards what was collected
//! - a failed parent contributes no children; the next parent still runs
//! - a failed chunk contributes no entities; the next chunk still runs
//!
//! Tolerated failures are returned as values next to the results so the
//! caller can report them.
//!
//! ## Execution model
//!
//! Strictly sequential: every call is awaited before the next one is issued,
//! and page or chunk `i + 1` is never requested before `i` is consumed.

use serde_json::Value;

use crate::error::FetchError;

pub mod expand;
pub mod pages;
pub mod references;
pub mod resolve;

pub use expand::{ExpandFailure, Expansion, expand};
pub use pages::fetch_all;
pub use references::{ReferenceSet, extract};
pub use resolve::{ChunkFailure, Resolution, resolve, resolve_missing};

/// Issues a single authenticated GET and returns the decoded JSON body.
///
/// Non-success responses must be mapped to a [`FetchError`] carrying the URL
/// and the API's structured error.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Fetches the dependent collection of one primary item.
#[allow(async_fn_in_trait)]
pub trait ChildSource {
    async fn children(&self, parent_id: &str) -> Result<Vec<Value>, FetchError>;
}

/// Resolves a bounded batch of references in one call.
///
/// Implementations may return entities in any order and may include `null`
/// entries for IDs the upstream service does not know.
#[allow(async_fn_in_trait)]
pub trait BatchLookup {
    async fn lookup(&self, ids: &[String]) -> Result<Vec<Value>, FetchError>;
}
