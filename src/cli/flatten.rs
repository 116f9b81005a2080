use std::path::Path;

use serde_json::Value;

use crate::{
    Res, error,
    flatten::{FlatRecord, FlattenConfig, Flattener},
};

/// Flattens a JSON file and prints the flat records as indented JSON.
///
/// An object yields one record; an array yields one record per element.
pub async fn flatten_file(path: &Path, separator: String, max_depth: usize) {
    let flattener = Flattener::new(FlattenConfig {
        separator,
        max_depth,
    });

    match flatten_json_file(path, &flattener).await {
        Ok(records) => match serde_json::to_string_pretty(&records) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Cannot serialize flat records. Err: {}", e),
        },
        Err(e) => error!("Cannot flatten {}. Err: {}", path.display(), e),
    }
}

pub async fn flatten_json_file(path: &Path, flattener: &Flattener) -> Res<Vec<FlatRecord>> {
    let content = async_fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&content)?;

    let records = match value {
        Value::Array(items) => flattener.flatten_all(items)?,
        other => vec![flattener.flatten(other)?],
    };
    Ok(records)
}
