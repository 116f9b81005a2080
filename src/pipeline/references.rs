use std::collections::HashSet;

use serde_json::Value;

/// An insertion-ordered set of references.
///
/// Duplicates are dropped silently and empty strings are never admitted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `reference` unless it is empty or already present.
    /// Returns `true` if it was added.
    pub fn insert(&mut self, reference: impl Into<String>) -> bool {
        let reference = reference.into();
        if reference.is_empty() || self.seen.contains(&reference) {
            return false;
        }
        self.seen.insert(reference.clone());
        self.order.push(reference);
        true
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.seen.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl FromIterator<String> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = ReferenceSet::new();
        for reference in iter {
            set.insert(reference);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collects the references embedded in `items`.
///
/// `path_fn` reaches into one item and yields its candidate references;
/// `None` and empty candidates are skipped. The result keeps first-seen order.
///
/// # Example
///
/// ```
/// let artist_ids = extract(&tracks, spotify::artists::track_artist_ids);
/// ```
pub fn extract<F>(items: &[Value], path_fn: F) -> ReferenceSet
where
    F: Fn(&Value) -> Vec<Option<String>>,
{
    items
        .iter()
        .flat_map(|item| path_fn(item))
        .flatten()
        .collect()
}
