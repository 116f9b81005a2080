//! Error types shared by the pipeline, the Spotify client and the CLI.
//!
//! Fetch failures are scoped to one unit of work (a page walk, a parent, a
//! chunk) and are carried as values by the pipeline stages that tolerate
//! them. Only [`Error::Auth`] is always fatal to a run.

use std::{fmt, io};

use thiserror::Error;

/// Top level error for everything `spotab` does.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication against {url} failed with error {error}\nError details: {description}")]
    Auth {
        url: String,
        error: String,
        description: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A non-success response (or transport failure) for one request.
///
/// Carries the offending URL and the structured error the API returned so
/// the message printed to the user names both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub url: String,
    pub status: Option<u16>,
    pub error: String,
    pub description: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            error: error.into(),
            description: description.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error accessing url {} with error {}", self.url, self.error)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        write!(f, "\nError details: {}", self.description)
    }
}

impl std::error::Error for FetchError {}

/// A record lacks a field the table's column list asks for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Table {table}: row {row} is missing field `{field}`")]
pub struct MappingError {
    pub table: String,
    pub row: usize,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("Input is still nested after {max_depth} passes")]
    TooDeep { max_depth: usize },

    #[error("Cannot flatten a scalar value; expected an object or an array")]
    NotAContainer,

    #[error("Two values flatten to the key `{key}`")]
    KeyCollision { key: String },
}

/// Why a record was left out of a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error(transparent)]
    Missing(#[from] MappingError),

    #[error("Table {table}: row {row} cannot be flattened: {error}")]
    Unflattenable {
        table: String,
        row: usize,
        error: FlattenError,
    },
}

impl RowError {
    pub fn table(&self) -> &str {
        match self {
            RowError::Missing(e) => &e.table,
            RowError::Unflattenable { table, .. } => table,
        }
    }
}
