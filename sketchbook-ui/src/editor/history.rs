// Snapshot history panel: Save / View History buttons and the history window.

use anyhow::Context as _;
use futures::FutureExt;
use sketchbook_core::{CanvasEditor, Notifier};
use sketchbook_snapshot::{
    report_capture_error, FileStore, HistoryBrowser, KeyValueStore, PendingCapture,
    SnapshotCard, SnapshotConfig, SnapshotHistory, EMPTY_HISTORY_MESSAGE,
};
use tracing::{debug, trace};

const THUMBNAIL_WIDTH: f32 = 180.0;
const THUMBNAIL_HEIGHT: f32 = 120.0;

/// A button press on a history card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Load(String),
    Delete(String),
}

/// Owns the snapshot history and drives it from egui.
///
/// A capture started from the Save button is kept here and polled once per
/// frame until its preview render completes. The button stays disabled
/// meanwhile.
#[derive(Debug)]
pub struct SnapshotPanel<S> {
    history: SnapshotHistory<S>,
    browser: HistoryBrowser,
    pending: Option<PendingCapture>,
}

impl SnapshotPanel<FileStore> {
    /// Panel backed by the file store `config` points at.
    pub fn open_with_config(config: &SnapshotConfig) -> anyhow::Result<Self> {
        let store = config
            .open_file_store()
            .context("open snapshot storage")?;
        Ok(Self::from_config(store, config))
    }
}

impl<S: KeyValueStore> SnapshotPanel<S> {
    pub fn new(history: SnapshotHistory<S>, browser: HistoryBrowser) -> Self {
        Self {
            history,
            browser,
            pending: None,
        }
    }

    pub fn from_config(store: S, config: &SnapshotConfig) -> Self {
        Self::new(
            SnapshotHistory::from_config(store, config),
            HistoryBrowser::new(config.timestamp_format.clone()),
        )
    }

    pub fn history(&self) -> &SnapshotHistory<S> {
        &self.history
    }

    pub fn browser(&self) -> &HistoryBrowser {
        &self.browser
    }

    pub fn open_history(&mut self) {
        self.browser.open();
    }

    pub fn close_history(&mut self) {
        self.browser.close();
    }

    pub fn is_capturing(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a capture. Ignored while another one is pending.
    pub fn request_capture<E, N>(&mut self, editor: &E, notifier: &N)
    where
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        match self.history.start_capture(editor) {
            Ok(pending) => {
                debug!("Snapshot capture started");
                self.pending = Some(pending);
            }
            Err(e) => report_capture_error(&e, notifier),
        }
    }

    /// Poll the pending capture once. Returns the new id when it committed.
    pub fn poll_capture<N>(&mut self, notifier: &N) -> Option<String>
    where
        N: Notifier + ?Sized,
    {
        let pending = self.pending.as_mut()?;
        let outcome = pending.now_or_never()?;
        self.pending = None;
        self.history.finish_capture(outcome, notifier)
    }

    /// Apply a card action.
    pub fn apply<E, N>(&mut self, action: PanelAction, editor: &mut E, notifier: &N)
    where
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        trace!("Applying {:?}", action);
        match action {
            PanelAction::Load(id) => {
                self.browser.load(&self.history, editor, notifier, &id);
            }
            PanelAction::Delete(id) => {
                self.browser.delete(&mut self.history, notifier, &id);
            }
        }
    }

    /// The two always-visible icon buttons.
    pub fn toolbar<E, N>(&mut self, ui: &mut egui::Ui, editor: &E, notifier: &N)
    where
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        ui.horizontal(|ui| {
            let save = ui
                .add_enabled(!self.is_capturing(), egui::Button::new("💾"))
                .on_hover_text("Save snapshot");
            if save.clicked() {
                self.request_capture(editor, notifier);
            }

            let view = ui.button("🕘").on_hover_text("View history");
            if view.clicked() {
                self.open_history();
            }
        });
    }

    /// Per-frame work: advance a pending capture and draw the history window.
    pub fn show<E, N>(&mut self, ctx: &egui::Context, editor: &mut E, notifier: &N)
    where
        E: CanvasEditor + ?Sized,
        N: Notifier + ?Sized,
    {
        self.poll_capture(notifier);
        if self.is_capturing() {
            ctx.request_repaint();
        }

        if !self.browser.is_open() {
            return;
        }

        crate::install_image_loaders(ctx);
        let cards = self.browser.cards(&self.history);
        let mut open = true;
        let mut actions = Vec::new();

        egui::Window::new("Snapshot history")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(640.0)
            .show(ctx, |ui| {
                if cards.is_empty() {
                    ui.label(EMPTY_HISTORY_MESSAGE);
                    return;
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for card in &cards {
                            card_ui(ui, card, &mut actions);
                        }
                    });
                });
            });

        if !open {
            self.browser.close();
        }

        for action in actions {
            self.apply(action, editor, notifier);
        }
    }
}

fn card_ui(ui: &mut egui::Ui, card: &SnapshotCard, actions: &mut Vec<PanelAction>) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.set_width(THUMBNAIL_WIDTH);

            match &card.preview_svg {
                Some(svg) => {
                    let image = egui::Image::from_bytes(
                        format!("bytes://snapshot/{}.svg", card.id),
                        svg.clone(),
                    )
                    .max_width(THUMBNAIL_WIDTH)
                    .max_height(THUMBNAIL_HEIGHT);
                    ui.add(image);
                }
                None => {
                    ui.label("(no preview)");
                }
            }

            ui.label(card.formatted_time.as_str());

            ui.horizontal(|ui| {
                if ui.button("Load").clicked() {
                    actions.push(PanelAction::Load(card.id.clone()));
                }
                if ui.button("Delete").clicked() {
                    actions.push(PanelAction::Delete(card.id.clone()));
                }
            });
        });
    });
}
