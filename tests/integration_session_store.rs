//! Integration tests for session-history persistence
//!
//! Exercises the blob-backed session store: empty-history initialization,
//! deterministic blob paths, turn filtering, and feedback mutation.

use fraudsight::session::{retain_non_empty, FsBlobStore, SessionStore, Turn};
use tempfile::TempDir;

fn store(dir: &TempDir) -> SessionStore {
    SessionStore::new(
        Box::new(FsBlobStore::new_with_root(dir.path())),
        "gen-ai-memory/chat_history",
    )
}

#[tokio::test]
async fn test_empty_history_load_then_save_creates_one_blob() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sessions = store(&dir);

    // Absence is a valid first-message state, and loading is idempotent
    assert!(sessions.load("session-1").await.unwrap().is_none());
    assert!(sessions.load("session-1").await.unwrap().is_none());

    sessions
        .save("session-1", vec![Turn::user("hello")])
        .await
        .unwrap();

    let blob_path = dir
        .path()
        .join("gen-ai-memory/chat_history/session-1/history_session-1.json");
    assert!(blob_path.exists());

    // Exactly one blob exists under the session directory
    let entries: Vec<_> = std::fs::read_dir(blob_path.parent().unwrap())
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_persisted_document_shape() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sessions = store(&dir);

    sessions
        .save(
            "session-2",
            vec![Turn::user("question"), Turn::assistant("answer")],
        )
        .await
        .unwrap();

    let blob_path = dir
        .path()
        .join("gen-ai-memory/chat_history/session-2/history_session-2.json");
    let raw = std::fs::read_to_string(blob_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(parsed["session_id"], "session-2");
    assert_eq!(parsed["chat_history"][0]["role"], "user");
    assert_eq!(parsed["chat_history"][0]["chat"], "question");
    assert_eq!(parsed["chat_history"][1]["role"], "assistant");
}

#[test]
fn test_turn_filtering_drops_only_empty_turns() {
    let turns = vec![
        Turn::user("keep me"),
        Turn::assistant(""),
        Turn::user(""),
        Turn::assistant("keep me too"),
    ];

    let kept = retain_non_empty(turns);

    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].chat, "keep me");
    assert_eq!(kept[1].chat, "keep me too");
}

#[tokio::test]
async fn test_feedback_mutation_survives_round_trip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sessions = store(&dir);

    let mut turns = vec![
        Turn::user("u1"),
        Turn::assistant("a1"),
        Turn::user("u2"),
        Turn::assistant("a2"),
    ];
    turns.last_mut().unwrap().feedback_good_or_not = Some(1);
    turns.last_mut().unwrap().feedback_text = Some("helpful".to_string());

    sessions.save("session-3", turns).await.unwrap();
    let loaded = sessions.load("session-3").await.unwrap().unwrap();

    assert_eq!(loaded[3].feedback_good_or_not, Some(1));
    assert_eq!(loaded[3].feedback_text.as_deref(), Some("helpful"));
    // Earlier turns carry no feedback fields
    assert!(loaded[1].feedback_good_or_not.is_none());
}

#[tokio::test]
async fn test_distinct_sessions_map_to_distinct_blobs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sessions = store(&dir);

    sessions.save("a", vec![Turn::user("for a")]).await.unwrap();
    sessions.save("b", vec![Turn::user("for b")]).await.unwrap();

    let loaded_a = sessions.load("a").await.unwrap().unwrap();
    let loaded_b = sessions.load("b").await.unwrap().unwrap();

    assert_eq!(loaded_a[0].chat, "for a");
    assert_eq!(loaded_b[0].chat, "for b");
}
