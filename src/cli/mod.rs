//! # CLI Module
//!
//! This module provides the command-line interface layer for spotab. Each
//! command wires configuration, authentication and the pipeline together and
//! is responsible for everything the user sees: spinners, warnings for
//! tolerated failures, fatal errors and summary tables.
//!
//! ## Commands
//!
//! - [`auth`] - Checks the client credentials by requesting a token
//! - [`run`] - Exports playlists, tracks and artists as CSV tables
//! - [`list_playlists`] - Displays the playlists of a user
//! - [`flatten_file`] - Flattens a local JSON file into flat records
//!
//! ## Error reporting
//!
//! - **Fatal**: missing credentials, authentication failure, failure to
//!   fetch the playlists themselves, failure to write the tables
//! - **Reported and skipped**: a playlist whose tracks cannot be fetched, an
//!   artist chunk that cannot be resolved, a record missing a table column
//!
//! Every message names the URL that failed and the description the API
//! returned.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotab auth                                  # Check credentials
//! spotab playlists --user 1258359139           # List playlists
//! spotab run --user 1258359139 --checkpoint    # Export and keep raw JSON
//! spotab run --user 1258359139 --resume        # Rebuild tables from checkpoints
//! spotab flatten playlists.json                # Inspect flattened keys
//! ```

mod auth;
mod flatten;
mod playlists;
mod run;

pub use auth::auth;
pub use flatten::{flatten_file, flatten_json_file};
pub use playlists::list_playlists;
pub use run::{RunOptions, run, write_tables};
