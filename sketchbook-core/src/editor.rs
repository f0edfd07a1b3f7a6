//! Editor contract consumed by the snapshot layer.
//!
//! The canvas editor owns the scene graph, rendering and undo. The snapshot
//! layer only needs four things from it: export, import, the visible shape
//! set, and a vector render of a shape set.

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque, editor-defined serializable state.
///
/// Never inspected or migrated here. It round-trips through JSON verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorState(serde_json::Value);

impl EditorState {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for EditorState {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Identifier of a shape on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much of the editor state an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// Document content only (shapes, pages, assets). No camera or selection.
    Document,
    /// Document plus per-user session state.
    All,
}

/// Options for a vector render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub scale: f32,
    /// Paint an opaque background behind the shapes.
    pub background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: true,
        }
    }
}

/// A rendered vector image.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorImage {
    pub svg: String,
    pub width: f32,
    pub height: f32,
}

impl VectorImage {
    pub fn new(svg: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            svg: svg.into(),
            width,
            height,
        }
    }

    /// Serialized SVG markup.
    pub fn as_svg(&self) -> &str {
        &self.svg
    }
}

/// Future returned by [`CanvasEditor::render_svg`].
///
/// `None` means the editor could not produce an image (e.g. inconsistent state).
pub type RenderFuture = LocalBoxFuture<'static, Result<Option<VectorImage>, EditorError>>;

/// Errors surfaced by an editor implementation.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor state could not be applied: {reason}")]
    InvalidState { reason: String },

    #[error("render failed: {reason}")]
    Render { reason: String },

    #[error("editor is not available")]
    Unavailable,
}

/// The canvas editor as seen by the snapshot layer.
pub trait CanvasEditor {
    /// Export a serializable copy of the editor state.
    fn export_state(&self, scope: ExportScope) -> Result<EditorState, EditorError>;

    /// Replace the live editor state with `state`.
    fn import_state(&mut self, state: &EditorState) -> Result<(), EditorError>;

    /// Shapes currently inside the viewport, in paint order.
    fn visible_shape_ids(&self) -> Vec<ShapeId>;

    /// Render exactly `shape_ids` to a vector image.
    ///
    /// The returned future must not borrow the editor; it may complete later.
    fn render_svg(&self, shape_ids: &[ShapeId], options: RenderOptions) -> RenderFuture;
}
