mod checkpoint;

pub use checkpoint::CHECKPOINT_ARTISTS;
pub use checkpoint::CHECKPOINT_PLAYLISTS;
pub use checkpoint::CHECKPOINT_TRACKS;
pub use checkpoint::CheckpointManager;
