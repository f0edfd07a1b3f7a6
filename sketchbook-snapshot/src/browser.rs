//! History browser: the Open/Closed panel model and its load/delete actions.
//!
//! This is the UI-agnostic half. A front end renders [`HistoryBrowser::cards`]
//! while the panel is open and routes button presses to
//! [`HistoryBrowser::load`] and [`HistoryBrowser::delete`].

use chrono::format::{Item, StrftimeItems};
use sketchbook_core::{CanvasEditor, Notification, Notifier};
use tracing::{debug, error, info, warn};

use crate::history::SnapshotHistory;
use crate::storage::KeyValueStore;

/// Default display format for card timestamps (local time).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shown instead of the card grid when there is nothing to list.
pub const EMPTY_HISTORY_MESSAGE: &str = "No snapshots yet. Save one to see it here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

/// What a front end needs to draw one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotCard {
    pub id: String,
    pub timestamp: i64,
    pub formatted_time: String,
    /// Decoded SVG preview; `None` if the stored URI is unreadable.
    pub preview_svg: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct HistoryBrowser {
    state: PanelState,
    timestamp_format: String,
}

impl Default for HistoryBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl HistoryBrowser {
    /// An unusable strftime layout is replaced by [`DEFAULT_TIMESTAMP_FORMAT`].
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        let mut timestamp_format = timestamp_format.into();
        if !is_valid_timestamp_format(&timestamp_format) {
            warn!(
                "Invalid timestamp format {:?}, using {:?}",
                timestamp_format, DEFAULT_TIMESTAMP_FORMAT
            );
            timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }

        Self {
            state: PanelState::Closed,
            timestamp_format,
        }
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn open(&mut self) {
        debug!("History panel opened");
        self.state = PanelState::Open;
    }

    pub fn close(&mut self) {
        debug!("History panel closed");
        self.state = PanelState::Closed;
    }

    pub fn toggle(&mut self) {
        match self.state {
            PanelState::Open => self.close(),
            PanelState::Closed => self.open(),
        }
    }

    /// Cards for every snapshot, in collection order (newest first).
    pub fn cards<S: KeyValueStore>(&self, history: &SnapshotHistory<S>) -> Vec<SnapshotCard> {
        history
            .snapshots()
            .iter()
            .map(|s| SnapshotCard {
                id: s.id.clone(),
                timestamp: s.timestamp,
                formatted_time: format_timestamp(s.timestamp, &self.timestamp_format),
                preview_svg: s.preview_svg(),
            })
            .collect()
    }

    /// Import the snapshot's state into the editor and close the panel.
    ///
    /// Returns whether the import happened. Unknown ids and import failures
    /// are reported through `notifier` and leave the panel as it was.
    pub fn load<S, E, N>(
        &mut self,
        history: &SnapshotHistory<S>,
        editor: &mut E,
        notifier: &N,
        id: &str,
    ) -> bool
    where
        S: KeyValueStore,
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        let Some(snapshot) = history.get(id) else {
            error!("Cannot load unknown snapshot {}", id);
            notifier.notify(
                Notification::error("Failed to load snapshot")
                    .with_description(format!("No snapshot with id {id}"))
                    .with_icon("cross-2"),
            );
            return false;
        };

        if let Err(e) = editor.import_state(&snapshot.data) {
            error!("Importing snapshot {} failed: {}", id, e);
            notifier.notify(
                Notification::error("Failed to load snapshot")
                    .with_description(e.to_string())
                    .with_icon("cross-2"),
            );
            return false;
        }

        info!("Loaded snapshot {} into the editor", id);
        self.close();
        notifier.notify(Notification::success("Snapshot loaded").with_icon("check"));
        true
    }

    /// Delete the snapshot with `id`. No confirmation.
    ///
    /// Returns whether a snapshot was removed. The panel state is untouched.
    pub fn delete<S, N>(&self, history: &mut SnapshotHistory<S>, notifier: &N, id: &str) -> bool
    where
        S: KeyValueStore,
        N: Notifier + ?Sized,
    {
        match history.delete(id) {
            Ok(removed) => removed,
            Err(e) => {
                error!("Deleting snapshot {} failed: {}", id, e);
                notifier.notify(
                    Notification::error("Failed to delete snapshot")
                        .with_description(e.to_string())
                        .with_icon("cross-2"),
                );
                false
            }
        }
    }
}

/// Whether chrono can display `format` without erroring.
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Format epoch milliseconds in local time. Out-of-range values give "unknown".
pub fn format_timestamp(timestamp_ms: i64, format: &str) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format(format)
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
