//! sketchbook-snapshot: named point-in-time captures of a canvas editor.
//!
//! Design rules:
//! - One storage key holds the whole history as a JSON array, newest first.
//! - Memory and storage are identical after every mutation; writes are whole-list.
//! - Corrupted stored data is discarded, never fatal.
//! - Editor state is opaque: stored and restored verbatim.
//! - At most one capture is pending at a time; commits see the latest list.

pub mod browser;
pub mod capture;
pub mod config;
pub mod history;
pub mod record;
pub mod storage;

/// Storage key holding the snapshot list.
pub const STORAGE_KEY: &str = "sketchbook.snapshots";

pub use browser::{
    format_timestamp, is_valid_timestamp_format, HistoryBrowser, PanelState, SnapshotCard,
    DEFAULT_TIMESTAMP_FORMAT,
    EMPTY_HISTORY_MESSAGE,
};
pub use capture::{CaptureError, CaptureGuard, CaptureSlot, PendingCapture};
pub use config::{config_path, ConfigError, SnapshotConfig};
pub use history::{report_capture_error, SnapshotHistory};
pub use record::{CapturedSnapshot, Snapshot};
#[cfg(feature = "local-storage")]
pub use storage::LocalStorage;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
