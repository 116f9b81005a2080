#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

use serde_json::{Value, json};
use spotab::{
    error::FetchError,
    pipeline::{BatchLookup, ChildSource, Transport},
};

pub const API_URL: &str = "https://api.test/v1";

/// Canned responses keyed by URL. A key without a query string also answers
/// every URL that only differs from it in the query.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, Result<Value, FetchError>>,
    calls: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub fn failing(mut self, url: &str, status: u16, description: &str) -> Self {
        let error = FetchError::new(url, status.to_string(), description).with_status(status);
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.borrow_mut().push(url.to_string());

        let base = url.split('?').next().unwrap_or(url);
        match self.responses.get(url).or_else(|| self.responses.get(base)) {
            Some(response) => response.clone(),
            None => Err(FetchError::new(url, "404", "Resource not found").with_status(404)),
        }
    }
}

/// A page body as the collection endpoints return it.
pub fn page(items: Vec<Value>, next: Option<&str>) -> Value {
    json!({ "items": items, "next": next })
}

/// `count` items named `<prefix>-<n>`, numbered from `first`.
pub fn numbered_items(prefix: &str, first: usize, count: usize) -> Vec<Value> {
    (first..first + count)
        .map(|n| json!({ "id": format!("{prefix}-{n}") }))
        .collect()
}

/// Children keyed by parent ID; parents in `failing` answer with an error.
#[derive(Default)]
pub struct FakeChildren {
    children: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeChildren {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parent_id: &str, children: Vec<Value>) -> Self {
        self.children.insert(parent_id.to_string(), children);
        self
    }

    pub fn failing(mut self, parent_id: &str) -> Self {
        self.failing.insert(parent_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ChildSource for FakeChildren {
    async fn children(&self, parent_id: &str) -> Result<Vec<Value>, FetchError> {
        self.calls.borrow_mut().push(parent_id.to_string());

        if self.failing.contains(parent_id) {
            return Err(FetchError::new(
                format!("{API_URL}/playlists/{parent_id}/tracks"),
                "500",
                "Server error",
            )
            .with_status(500));
        }
        Ok(self.children.get(parent_id).cloned().unwrap_or_default())
    }
}

/// Answers every ID with `{"id", "name"}` in reverse order of the request.
///
/// Calls listed in `failing_calls` (zero based) fail; IDs in `unknown` come
/// back as `null`.
#[derive(Default)]
pub struct FakeLookup {
    failing_calls: HashSet<usize>,
    unknown: HashSet<String>,
    calls: Cell<usize>,
    chunk_sizes: RefCell<Vec<usize>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    pub fn unknown(mut self, id: &str) -> Self {
        self.unknown.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.borrow().clone()
    }
}

impl BatchLookup for FakeLookup {
    async fn lookup(&self, ids: &[String]) -> Result<Vec<Value>, FetchError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.chunk_sizes.borrow_mut().push(ids.len());

        if self.failing_calls.contains(&call) {
            return Err(FetchError::new(
                format!("{API_URL}/artists?ids={}", ids.join(",")),
                "429",
                "API rate limit exceeded",
            )
            .with_status(429));
        }

        Ok(ids
            .iter()
            .rev()
            .map(|id| {
                if self.unknown.contains(id) {
                    Value::Null
                } else {
                    json!({ "id": id, "name": format!("Artist {id}") })
                }
            })
            .collect())
    }
}

pub fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|n| format!("{prefix}{n}")).collect()
}
