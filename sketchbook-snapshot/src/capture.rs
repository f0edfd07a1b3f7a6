//! Capture routine: editor state + preview render -> [`CapturedSnapshot`].
//!
//! A capture runs in two halves. [`PendingCapture::start`] does the synchronous
//! work (export, visible-shape check, kick off the render) and hands back a
//! future. Awaiting it yields the captured state with its encoded preview.
//! Committing into the history happens elsewhere, against whatever the
//! collection looks like at that moment.
//!
//! Only one capture may be pending at a time. [`CaptureSlot`] enforces it.

use sketchbook_core::{CanvasEditor, EditorError, ExportScope, RenderFuture, RenderOptions};
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use thiserror::Error;
use tracing::debug;

use crate::record::{now_millis, CapturedSnapshot};
use crate::storage::StorageError;

/// Why a capture did not produce a snapshot.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("a capture is already in progress")]
    InFlight,

    #[error("canvas is empty")]
    EmptyCanvas,

    #[error("editor returned no preview image")]
    PreviewUnavailable,

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("capture already completed")]
    AlreadyCompleted,
}

/// Single-slot in-flight flag shared by everything that can start a capture.
#[derive(Debug, Clone, Default)]
pub struct CaptureSlot {
    busy: Rc<Cell<bool>>,
}

impl CaptureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Claim the slot. `None` while another capture holds it.
    pub fn try_acquire(&self) -> Option<CaptureGuard> {
        if self.busy.replace(true) {
            return None;
        }
        Some(CaptureGuard {
            busy: Rc::clone(&self.busy),
        })
    }
}

/// Holds the slot until dropped.
#[derive(Debug)]
pub struct CaptureGuard {
    busy: Rc<Cell<bool>>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

/// A capture waiting on its preview render.
///
/// Owns everything it needs, so it can be stored by an event loop and polled
/// across frames. Dropping it cancels the capture and frees the slot.
pub struct PendingCapture {
    state: Option<sketchbook_core::EditorState>,
    render: RenderFuture,
    guard: Option<CaptureGuard>,
}

impl std::fmt::Debug for PendingCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCapture")
            .field("finished", &self.state.is_none())
            .field("holds_slot", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

impl PendingCapture {
    /// Export the document, check there is something visible, start the render.
    pub fn start<E>(
        editor: &E,
        slot: &CaptureSlot,
        options: RenderOptions,
    ) -> Result<Self, CaptureError>
    where
        E: CanvasEditor + ?Sized,
    {
        let guard = slot.try_acquire().ok_or(CaptureError::InFlight)?;

        let state = editor.export_state(ExportScope::Document)?;

        let shape_ids = editor.visible_shape_ids();
        if shape_ids.is_empty() {
            debug!("Capture aborted: no visible shapes");
            return Err(CaptureError::EmptyCanvas);
        }

        debug!(
            "Rendering preview of {} shapes at {}x",
            shape_ids.len(),
            options.scale
        );
        let render = editor.render_svg(&shape_ids, options);

        Ok(Self {
            state: Some(state),
            render,
            guard: Some(guard),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_none()
    }
}

impl Future for PendingCapture {
    type Output = Result<CapturedSnapshot, CaptureError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // the render future must not be polled again once it resolved
        if self.state.is_none() {
            return Poll::Ready(Err(CaptureError::AlreadyCompleted));
        }

        let rendered = match self.render.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(rendered) => rendered,
        };

        self.guard.take();
        let Some(state) = self.state.take() else {
            return Poll::Ready(Err(CaptureError::AlreadyCompleted));
        };

        let outcome = match rendered {
            Ok(Some(image)) => Ok(CapturedSnapshot::new(now_millis(), state, &image)),
            Ok(None) => Err(CaptureError::PreviewUnavailable),
            Err(e) => Err(CaptureError::Editor(e)),
        };
        Poll::Ready(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_single_use_until_guard_drops() {
        let slot = CaptureSlot::new();
        let guard = slot.try_acquire().expect("slot should be free");

        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        assert!(slot.clone().try_acquire().is_none());

        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_some());
    }
}
