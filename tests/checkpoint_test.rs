use serde_json::{Value, json};
use spotab::management::{CHECKPOINT_TRACKS, CheckpointManager};

#[tokio::test]
async fn test_persist_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoints = CheckpointManager::new(dir.path().join("cache"));
    let tracks = vec![
        json!({"playlist_id": "pl1", "track": {"id": "t1"}}),
        json!({"playlist_id": "pl1", "track": null}),
    ];

    assert!(!checkpoints.exists(CHECKPOINT_TRACKS));
    let path = checkpoints.persist(CHECKPOINT_TRACKS, &tracks).await.unwrap();

    assert_eq!(path, dir.path().join("cache").join("tracks.json"));
    assert!(checkpoints.exists(CHECKPOINT_TRACKS));

    let loaded: Vec<Value> = checkpoints.load(CHECKPOINT_TRACKS).await.unwrap();
    assert_eq!(loaded, tracks);
}

#[tokio::test]
async fn test_checkpoint_is_indented_json() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoints = CheckpointManager::new(dir.path());

    let path = checkpoints.persist("artists", &[json!({"id": "a1"})]).await.unwrap();

    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("\n  {"));
}

#[tokio::test]
async fn test_load_missing_checkpoint_fails() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoints = CheckpointManager::new(dir.path());

    assert!(checkpoints.load::<Vec<Value>>("playlists").await.is_err());
}

#[tokio::test]
async fn test_clear() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoints = CheckpointManager::new(dir.path());
    checkpoints.persist("playlists", &Vec::<Value>::new()).await.unwrap();

    checkpoints.clear("playlists").await.unwrap();
    assert!(!checkpoints.exists("playlists"));

    // clearing twice is fine
    checkpoints.clear("playlists").await.unwrap();
}

#[tokio::test]
async fn test_partial_collection_is_not_checkpointed() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoints = CheckpointManager::new(dir.path());
    let complete = vec![json!({"playlist_id": "pl1"}), json!({"playlist_id": "pl2"})];
    let partial = vec![json!({"playlist_id": "pl1"})];

    let written = checkpoints
        .persist_complete(CHECKPOINT_TRACKS, &complete, 0)
        .await
        .unwrap();
    assert!(written.is_some());

    // a later run where one playlist failed must not leave the old file behind
    let written = checkpoints
        .persist_complete(CHECKPOINT_TRACKS, &partial, 1)
        .await
        .unwrap();
    assert!(written.is_none());
    assert!(!checkpoints.exists(CHECKPOINT_TRACKS));
}
