//! Collapse nested JSON into single-level records for tabular export.
//!
//! Flattening runs as a worklist of passes over the current record. Each pass
//! unpacks one level: an object value `k: {s: v}` becomes `k_s: v`, a sequence
//! value `k: [v0, v1]` becomes `k_0: v0, k_1: v1`. An object sitting inside a
//! sequence is unpacked in the same pass as its index (`k_0_s`), so a list of
//! objects costs a single pass. Passes repeat until no value is a container.
//!
//! Two values that land on the same key (`{"a_b": 1, "a": {"b": 2}}`) are a
//! [`FlattenError::KeyCollision`]; neither value is dropped silently.

use serde_json::{Map, Value};

use crate::error::FlattenError;

/// A single-level record; no value is an object or an array.
pub type FlatRecord = Map<String, Value>;

/// Configuration for the flattening process
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Joins a parent key with a sub-key or an index
    pub separator: String,

    /// Maximum number of passes before the input is rejected
    pub max_depth: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from("_"),
            max_depth: 64,
        }
    }
}

pub struct Flattener {
    config: FlattenConfig,
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(FlattenConfig::default())
    }
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    /// Flatten an object (or an array, keyed by index) into a [`FlatRecord`].
    ///
    /// Fails with [`FlattenError::TooDeep`] when the input is still nested
    /// after `max_depth` passes, with [`FlattenError::NotAContainer`] for a
    /// bare scalar and with [`FlattenError::KeyCollision`] when two values
    /// would share a key.
    pub fn flatten(&self, value: Value) -> Result<FlatRecord, FlattenError> {
        let mut record: FlatRecord = match value {
            Value::Object(map) => map,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string(), item))
                .collect(),
            _ => return Err(FlattenError::NotAContainer),
        };

        let mut passes = 0;
        while is_nested(&record) {
            if passes >= self.config.max_depth {
                return Err(FlattenError::TooDeep {
                    max_depth: self.config.max_depth,
                });
            }
            record = self.flatten_pass(record)?;
            passes += 1;
        }

        Ok(record)
    }

    /// Flatten every value, stopping at the first failure.
    pub fn flatten_all(&self, values: Vec<Value>) -> Result<Vec<FlatRecord>, FlattenError> {
        values.into_iter().map(|v| self.flatten(v)).collect()
    }

    /// Run a single pass, unpacking exactly one level of nesting.
    ///
    /// Fails with [`FlattenError::KeyCollision`] when two values land on the
    /// same key, including a key already produced by an earlier pass.
    pub fn flatten_pass(&self, record: FlatRecord) -> Result<FlatRecord, FlattenError> {
        let mut out = Map::new();

        for (key, value) in record {
            match value {
                Value::Object(obj) => {
                    for (sub_key, sub_value) in obj {
                        insert_unique(&mut out, self.join(&key, &sub_key), sub_value)?;
                    }
                }
                Value::Array(items) => {
                    for (idx, item) in items.into_iter().enumerate() {
                        let indexed = self.join(&key, &idx.to_string());
                        match item {
                            Value::Object(obj) => {
                                for (sub_key, sub_value) in obj {
                                    insert_unique(&mut out, self.join(&indexed, &sub_key), sub_value)?;
                                }
                            }
                            other => insert_unique(&mut out, indexed, other)?,
                        }
                    }
                }
                scalar => insert_unique(&mut out, key, scalar)?,
            }
        }

        Ok(out)
    }

    fn join(&self, parent: &str, child: &str) -> String {
        format!("{}{}{}", parent, self.config.separator, child)
    }
}

/// True while at least one value is still an object or an array.
pub fn is_nested(record: &FlatRecord) -> bool {
    record
        .values()
        .any(|v| matches!(v, Value::Object(_) | Value::Array(_)))
}

fn insert_unique(out: &mut FlatRecord, key: String, value: Value) -> Result<(), FlattenError> {
    if out.contains_key(&key) {
        return Err(FlattenError::KeyCollision { key });
    }
    out.insert(key, value);
    Ok(())
}
