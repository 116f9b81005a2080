use std::{collections::HashMap, fmt};

use indicatif::ProgressBar;
use serde_json::Value;

use crate::{
    Res,
    error::{Error, FetchError},
    pipeline::BatchLookup,
    utils,
};

/// A chunk whose lookup call failed; `start..end` indexes the reference list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub start: usize,
    pub end: usize,
    pub error: FetchError,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "References {}..{} were not resolved: {}",
            self.start, self.end, self.error
        )
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    /// Resolved entities, chunk by chunk, each chunk in reference order
    pub entities: Vec<Value>,
    pub failures: Vec<ChunkFailure>,
    /// References from successful chunks that the lookup did not return
    pub unresolved: Vec<String>,
    /// Number of lookup calls issued
    pub calls: usize,
}

/// Resolves `references` through `lookup`, at most `chunk_size` per call.
///
/// Chunks are consecutive slices of the input and are requested one after
/// the other. Returned entities are matched to references by their embedded
/// `id`, never by position, so the lookup may answer in any order; `null`
/// entries and entities nobody asked for are ignored. A failed call is
/// recorded in [`Resolution::failures`] and the next chunk is still requested.
///
/// # Errors
///
/// Returns [`Error::Config`] when `chunk_size` is zero; no call is issued.
pub async fn resolve<L: BatchLookup>(
    references: &[String],
    chunk_size: usize,
    lookup: &L,
    progress: &ProgressBar,
) -> Res<Resolution> {
    if chunk_size == 0 {
        return Err(Error::Config("chunk size must be at least 1".to_string()));
    }

    let mut resolution = Resolution::default();
    let total_chunks = utils::chunk_count(references.len(), chunk_size);

    for (chunk_idx, chunk) in references.chunks(chunk_size).enumerate() {
        let start = chunk_idx * chunk_size;
        let end = start + chunk.len();

        progress.set_message(format!(
            "Resolving references {start}..{end} (chunk {count}/{total})",
            start = start,
            end = end,
            count = chunk_idx + 1,
            total = total_chunks
        ));

        resolution.calls += 1;
        match lookup.lookup(chunk).await {
            Ok(found) => {
                let (matched, missing) = match_by_id(chunk, found);
                resolution.entities.extend(matched);
                resolution.unresolved.extend(missing);
            }
            Err(error) => resolution.failures.push(ChunkFailure { start, end, error }),
        }
    }

    Ok(resolution)
}

/// Resolves only the references that `known` does not already cover.
///
/// Used when resuming from previously resolved entities. `known` entities whose
/// `id` is among `references` are kept, in reference order, ahead of the newly
/// resolved ones; the others are dropped. Calls, failures and unresolved IDs in
/// the returned [`Resolution`] describe the gap only, and failure bounds index
/// the list of references that were still missing.
pub async fn resolve_missing<L: BatchLookup>(
    references: &[String],
    known: Vec<Value>,
    chunk_size: usize,
    lookup: &L,
    progress: &ProgressBar,
) -> Res<Resolution> {
    let (mut entities, missing) = match_by_id(references, known);
    let mut resolution = resolve(&missing, chunk_size, lookup, progress).await?;

    entities.append(&mut resolution.entities);
    resolution.entities = entities;
    Ok(resolution)
}

/// Pairs each requested ID with the entity carrying that `id`.
fn match_by_id(requested: &[String], found: Vec<Value>) -> (Vec<Value>, Vec<String>) {
    let mut by_id: HashMap<String, Value> = HashMap::new();
    for entity in found {
        let Some(id) = entity.get("id").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        by_id.entry(id).or_insert(entity);
    }

    let mut matched = Vec::with_capacity(requested.len());
    let mut missing = Vec::new();
    for id in requested {
        match by_id.remove(id) {
            Some(entity) => matched.push(entity),
            None => missing.push(id.clone()),
        }
    }

    (matched, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_by_id_ignores_position_and_nulls() {
        let requested = vec!["a1".to_string(), "a2".to_string(), "a3".to_string()];
        let found = vec![
            json!({"id": "a3", "name": "Three"}),
            Value::Null,
            json!({"id": "zz", "name": "Stranger"}),
            json!({"id": "a1", "name": "One"}),
        ];

        let (matched, missing) = match_by_id(&requested, found);

        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0]["name"], "One");
        assert_eq!(matched[1]["name"], "Three");
        assert_eq!(missing, vec!["a2".to_string()]);
    }
}
