//! sketchbook-core: contracts between the snapshot layer and its hosts.
//!
//! Design rules:
//! - The canvas editor is consumed through [`CanvasEditor`]; nothing here draws.
//! - Editor state is an opaque token. It is stored and handed back verbatim.
//! - Notifications are fire-and-forget; no return value is consumed.
//! - Everything runs on one thread. Futures are `!Send`.

pub mod editor;
pub mod notify;

pub use editor::{
    CanvasEditor, EditorError, EditorState, ExportScope, RenderFuture, RenderOptions, ShapeId,
    VectorImage,
};
pub use notify::{Notification, NotificationLog, Notifier, Severity, TracingNotifier};
