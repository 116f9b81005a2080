use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Res, config};

pub const CHECKPOINT_PLAYLISTS: &str = "playlists";
pub const CHECKPOINT_TRACKS: &str = "tracks";
pub const CHECKPOINT_ARTISTS: &str = "artists";

/// Raw collections written to disk so a later run can reload them instead
/// of fetching again. Nothing is written or read unless the caller asks.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Checkpoints for one user under `<data_local_dir>/spotab/cache/<user>`.
    pub fn for_user(user_id: &str) -> Self {
        let mut dir = config::data_dir();
        dir.push("cache");
        dir.push(user_id);
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Res<T> {
        let content = async_fs::read_to_string(self.path(name)).await?;
        let value: T = serde_json::from_str(&content)?;
        Ok(value)
    }

    /// Writes `value` as indented UTF-8 JSON and returns the file path.
    pub async fn persist<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Res<PathBuf> {
        async_fs::create_dir_all(&self.dir).await?;

        let path = self.path(name);
        let json = serde_json::to_string_pretty(value)?;
        async_fs::write(&path, json).await?;
        Ok(path)
    }

    /// Writes `value` only when the stage that produced it had no `failures`.
    ///
    /// Otherwise any earlier checkpoint under `name` is removed and `None` is
    /// returned, so a checkpoint on disk always holds a complete collection.
    pub async fn persist_complete<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
        failures: usize,
    ) -> Res<Option<PathBuf>> {
        if failures > 0 {
            self.clear(name).await?;
            return Ok(None);
        }
        self.persist(name, value).await.map(Some)
    }

    pub async fn clear(&self, name: &str) -> Res<()> {
        let path = self.path(name);
        if path.is_file() {
            async_fs::remove_file(path).await?;
        }
        Ok(())
    }
}
