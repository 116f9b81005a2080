use std::fmt;

use indicatif::ProgressBar;
use serde_json::{Map, Value};

use crate::{error::FetchError, pipeline::ChildSource};

/// Why a primary item contributed no children.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpandFailure {
    /// The primary item at `position` has no string ID under the ID field.
    MissingId { position: usize },
    /// The dependent fetch for `parent_id` failed.
    Fetch { parent_id: String, error: FetchError },
}

impl fmt::Display for ExpandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandFailure::MissingId { position } => {
                write!(f, "Item #{} has no id and was skipped", position)
            }
            ExpandFailure::Fetch { parent_id, error } => {
                write!(f, "Skipped {}: {}", parent_id, error)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Expansion {
    pub items: Vec<Value>,
    pub failures: Vec<ExpandFailure>,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Expands every primary item into its dependent collection.
///
/// Parents are processed in input order and their children are appended in
/// the order the source returns them. Each child is stamped with
/// `parent_key = <parent id>`; non-object children are wrapped as
/// `{"value": child}` first. A parent whose fetch fails contributes nothing and
/// is recorded in [`Expansion::failures`]; the remaining parents still run.
pub async fn expand<S: ChildSource>(
    primary: &[Value],
    id_field: &str,
    parent_key: &str,
    source: &S,
    progress: &ProgressBar,
) -> Expansion {
    let mut expansion = Expansion::default();
    let total = primary.len();

    for (position, item) in primary.iter().enumerate() {
        let Some(parent_id) = item
            .get(id_field)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
        else {
            expansion
                .failures
                .push(ExpandFailure::MissingId { position });
            continue;
        };

        progress.set_message(format!(
            "Fetching children of {parent_id} ({count}/{total})",
            parent_id = parent_id,
            count = position + 1,
            total = total
        ));

        match source.children(parent_id).await {
            Ok(children) => {
                expansion.items.extend(
                    children
                        .into_iter()
                        .map(|child| stamp(child, parent_key, parent_id)),
                );
            }
            Err(error) => expansion.failures.push(ExpandFailure::Fetch {
                parent_id: parent_id.to_string(),
                error,
            }),
        }
    }

    expansion
}

fn stamp(child: Value, parent_key: &str, parent_id: &str) -> Value {
    let mut obj = match child {
        Value::Object(obj) => obj,
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("value".to_string(), other);
            wrapped
        }
    };
    obj.insert(parent_key.to_string(), Value::String(parent_id.to_string()));
    Value::Object(obj)
}
