mod common;

use common::FakeEditor;
use futures::executor::block_on;
use sketchbook_core::{NotificationLog, Severity};
use sketchbook_snapshot::{
    HistoryBrowser, KeyValueStore, MemoryStore, PanelState, SnapshotHistory, StorageError,
    STORAGE_KEY,
};

fn history_with(count: usize) -> (MemoryStore, SnapshotHistory<MemoryStore>, FakeEditor) {
    let store = MemoryStore::new();
    let mut history = SnapshotHistory::load(store.clone());
    let mut editor = FakeEditor::with_shapes(&["shape:a"]);
    let log = NotificationLog::new();
    for n in 0..count {
        editor.document = serde_json::json!({ "revision": n, "shapes": ["shape:a"] });
        block_on(history.capture(&editor, &log)).unwrap();
    }
    (store, history, editor)
}

#[test]
fn load_imports_exact_blob_and_closes() {
    let (_store, history, mut editor) = history_with(2);
    let log = NotificationLog::new();
    let mut browser = HistoryBrowser::default();
    browser.open();

    let target = history.snapshots()[1].clone();
    editor.document = serde_json::json!({ "revision": "live edits" });

    assert!(browser.load(&history, &mut editor, &log, &target.id));

    assert_eq!(browser.state(), PanelState::Closed);
    assert_eq!(editor.imported, vec![target.data.clone()]);
    assert_eq!(editor.document["revision"], 0);
    assert_eq!(log.count(Severity::Success), 1);
}

#[test]
fn failed_import_keeps_panel_open() {
    let (_store, history, mut editor) = history_with(1);
    editor.fail_import = true;
    let log = NotificationLog::new();
    let mut browser = HistoryBrowser::default();
    browser.open();

    let id = history.snapshots()[0].id.clone();
    assert!(!browser.load(&history, &mut editor, &log, &id));

    assert!(browser.is_open());
    assert_eq!(log.count(Severity::Error), 1);
    assert!(log
        .last()
        .unwrap()
        .description
        .unwrap()
        .contains("schema mismatch"));
}

#[test]
fn unknown_id_is_reported() {
    let (_store, history, mut editor) = history_with(1);
    let log = NotificationLog::new();
    let mut browser = HistoryBrowser::default();
    browser.open();

    assert!(!browser.load(&history, &mut editor, &log, "snapshot-missing"));
    assert!(browser.is_open());
    assert!(editor.imported.is_empty());
    assert_eq!(log.count(Severity::Error), 1);
}

#[test]
fn delete_through_browser_persists() {
    let (store, mut history, _editor) = history_with(3);
    let log = NotificationLog::new();
    let mut browser = HistoryBrowser::default();
    browser.open();

    let ids: Vec<String> = history.snapshots().iter().map(|s| s.id.clone()).collect();
    assert!(browser.delete(&mut history, &log, &ids[1]));
    assert!(!browser.delete(&mut history, &log, &ids[1]));

    let remaining: Vec<&str> = history.snapshots().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(remaining, [ids[0].as_str(), ids[2].as_str()]);
    assert!(browser.is_open());
    assert!(log.is_empty());

    let raw = store.get(STORAGE_KEY).unwrap().unwrap();
    assert!(!raw.contains(&ids[1]));
}

#[test]
fn cards_follow_collection_order_with_decoded_previews() {
    let (_store, history, _editor) = history_with(2);
    let browser = HistoryBrowser::new("%Y");

    let cards = browser.cards(&history);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, history.snapshots()[0].id);
    assert_eq!(cards[1].id, history.snapshots()[1].id);
    for card in &cards {
        assert_eq!(card.formatted_time.len(), 4);
        let svg = String::from_utf8(card.preview_svg.clone().unwrap()).unwrap();
        assert!(svg.contains("shape:a"));
    }

    let empty = SnapshotHistory::load(MemoryStore::new());
    assert!(browser.cards(&empty).is_empty());
}

/// Accepts reads, rejects every write.
struct FullStore {
    inner: MemoryStore,
}

impl KeyValueStore for FullStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteRejected {
            key: key.to_string(),
            reason: "quota exceeded".into(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn rejected_delete_is_reported_and_changes_nothing() {
    let (store, history, _editor) = history_with(2);
    let stored = store.get(STORAGE_KEY).unwrap();
    let ids: Vec<String> = history.snapshots().iter().map(|s| s.id.clone()).collect();

    let mut history = SnapshotHistory::load(FullStore {
        inner: store.clone(),
    });
    let log = NotificationLog::new();
    let mut browser = HistoryBrowser::default();
    browser.open();

    assert!(!browser.delete(&mut history, &log, &ids[0]));

    assert_eq!(log.count(Severity::Error), 1);
    assert!(log
        .last()
        .unwrap()
        .description
        .unwrap()
        .contains("quota exceeded"));
    assert_eq!(history.len(), 2);
    assert!(history.contains(&ids[0]));
    assert_eq!(browser.state(), PanelState::Open);
    assert_eq!(store.get(STORAGE_KEY).unwrap(), stored);
}
