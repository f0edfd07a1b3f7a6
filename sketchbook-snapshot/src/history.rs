//! Persistence adapter: the snapshot collection and its storage mirror.
//!
//! [`SnapshotHistory`] owns both the in-memory list and the storage handle.
//! Every mutation writes the whole list under one key and only then swaps
//! the in-memory copy, so the two never diverge.

use sketchbook_core::{CanvasEditor, Notification, Notifier, RenderOptions};
use tracing::{debug, error, info, warn};

use crate::capture::{CaptureError, CaptureSlot, PendingCapture};
use crate::config::SnapshotConfig;
use crate::record::{snapshot_id, CapturedSnapshot, Snapshot};
use crate::storage::{KeyValueStore, StorageError};
use crate::STORAGE_KEY;

/// Ordered snapshot collection (newest first) mirrored to a key-value store.
#[derive(Debug)]
pub struct SnapshotHistory<S> {
    store: S,
    key: String,
    snapshots: Vec<Snapshot>,
    slot: CaptureSlot,
    render: RenderOptions,
}

impl<S: KeyValueStore> SnapshotHistory<S> {
    /// Load the collection stored under the default key.
    pub fn load(store: S) -> Self {
        Self::load_with_key(store, STORAGE_KEY)
    }

    /// Load the collection stored under `key`.
    ///
    /// Never fails: a missing value gives an empty history, and an
    /// unreadable one is erased and replaced by an empty history.
    pub fn load_with_key(mut store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let snapshots = read_persisted(&mut store, &key);
        debug!("Loaded {} snapshots from {}", snapshots.len(), key);

        Self {
            store,
            key,
            snapshots,
            slot: CaptureSlot::new(),
            render: RenderOptions::default(),
        }
    }

    /// Load using the key and render settings from `config`.
    pub fn from_config(store: S, config: &SnapshotConfig) -> Self {
        Self::load_with_key(store, config.storage_key.clone())
            .with_render_options(config.render_options())
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        self.render
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshots, newest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn get(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Persist `snapshots` as the whole collection, then adopt it in memory.
    ///
    /// On a failed write nothing changes, in storage or in memory.
    /// The value is written as compact JSON, so text this component stored
    /// round-trips byte for byte while hand-formatted text is normalised.
    pub fn save(&mut self, snapshots: Vec<Snapshot>) -> Result<(), StorageError> {
        let json = serde_json::to_string(&snapshots).map_err(|e| StorageError::WriteRejected {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&self.key, &json)?;
        self.snapshots = snapshots;
        Ok(())
    }

    /// Remove the snapshot with `id`. Returns whether one was removed.
    ///
    /// Unknown ids leave the collection (and storage) untouched.
    pub fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        if !self.contains(id) {
            debug!("Delete ignored, no snapshot {}", id);
            return Ok(false);
        }

        let remaining: Vec<Snapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        self.save(remaining)?;

        info!("Deleted snapshot {} ({} left)", id, self.snapshots.len());
        Ok(true)
    }

    /// Assign an id to `captured` and prepend it to the current collection.
    pub fn commit(&mut self, captured: CapturedSnapshot) -> Result<String, StorageError> {
        let id = snapshot_id(captured.timestamp, |candidate| self.contains(candidate));
        let snapshot = Snapshot {
            id: id.clone(),
            timestamp: captured.timestamp,
            data: captured.data,
            preview: captured.preview,
        };

        let mut next = Vec::with_capacity(self.snapshots.len() + 1);
        next.push(snapshot);
        next.extend(self.snapshots.iter().cloned());
        self.save(next)?;

        info!("Saved snapshot {} ({} total)", id, self.snapshots.len());
        Ok(id)
    }

    pub fn capture_slot(&self) -> &CaptureSlot {
        &self.slot
    }

    pub fn is_capturing(&self) -> bool {
        self.slot.is_busy()
    }

    /// Start a capture against `editor`. See [`PendingCapture`].
    pub fn start_capture<E>(&self, editor: &E) -> Result<PendingCapture, CaptureError>
    where
        E: CanvasEditor + ?Sized,
    {
        PendingCapture::start(editor, &self.slot, self.render)
    }

    /// Commit a finished capture and tell the user how it went.
    ///
    /// Returns the new snapshot id on success.
    pub fn finish_capture<N>(
        &mut self,
        outcome: Result<CapturedSnapshot, CaptureError>,
        notifier: &N,
    ) -> Option<String>
    where
        N: Notifier + ?Sized,
    {
        let committed = outcome.and_then(|captured| self.commit(captured).map_err(Into::into));

        match committed {
            Ok(id) => {
                notifier.notify(Notification::success("Snapshot saved").with_icon("check"));
                Some(id)
            }
            Err(e) => {
                report_capture_error(&e, notifier);
                None
            }
        }
    }

    /// Full capture: start, await the preview, commit, notify.
    pub async fn capture<E, N>(&mut self, editor: &E, notifier: &N) -> Option<String>
    where
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        let outcome = match self.start_capture(editor) {
            Ok(pending) => pending.await,
            Err(e) => Err(e),
        };
        self.finish_capture(outcome, notifier)
    }
}

/// Map a capture failure onto the user-facing notification.
pub fn report_capture_error<N>(error: &CaptureError, notifier: &N)
where
    N: Notifier + ?Sized,
{
    match error {
        CaptureError::InFlight => {
            debug!("Capture ignored: another capture is in progress");
        }
        CaptureError::EmptyCanvas => {
            notifier.notify(Notification::warning("Canvas is empty").with_icon("warning-triangle"));
        }
        CaptureError::PreviewUnavailable => {
            error!("Snapshot preview could not be generated");
            notifier.notify(
                Notification::error("Failed to generate preview")
                    .with_description("The editor did not return an image for the visible shapes.")
                    .with_icon("cross-2"),
            );
        }
        other => {
            error!("Snapshot capture failed: {}", other);
            notifier.notify(
                Notification::error("Failed to save snapshot")
                    .with_description(other.to_string())
                    .with_icon("cross-2"),
            );
        }
    }
}

fn read_persisted<S: KeyValueStore>(store: &mut S, key: &str) -> Vec<Snapshot> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read snapshot history at {}, starting empty: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Snapshot>>(&raw) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            warn!("Stored snapshot history at {} is corrupted, discarding it: {}", key, e);
            if let Err(e) = store.remove(key) {
                warn!("Could not erase corrupted snapshot history at {}: {}", key, e);
            }
            Vec::new()
        }
    }
}
