// This is a reference vector canvas for sketchbook
// It implements the editor contract so the snapshot panel can run without a browser editor

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use sketchbook_core::{
    CanvasEditor, EditorError, EditorState, ExportScope, RenderFuture, RenderOptions, ShapeId,
    VectorImage,
};
use tracing::{debug, info, trace, warn};

/// Axis-aligned rectangle in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    // Touching edges count as overlap
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    /// Diagonal from the top-left to the bottom-right corner of the bounds.
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub bounds: Bounds,
    /// CSS color, e.g. `#1e1e1e`.
    pub color: String,
}

/// The part of the canvas that gets exported as document state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub next_shape: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionState {
    viewport: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FullState {
    document: Document,
    session: SessionState,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    document: Document,
    viewport: Bounds,
    pub background: String,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        info!("Creating new canvas with a {}x{} viewport", width, height);

        Self {
            document: Document::default(),
            viewport: Bounds::new(0.0, 0.0, width, height),
            background: "#ffffff".to_string(),
        }
    }

    pub fn add_shape(&mut self, kind: ShapeKind, bounds: Bounds, color: impl Into<String>) -> ShapeId {
        self.document.next_shape += 1;
        let id = ShapeId::new(format!("shape:{}", self.document.next_shape));
        trace!("Adding {:?} {} at {:?}", kind, id, bounds);

        self.document.shapes.push(Shape {
            id: id.clone(),
            kind,
            bounds,
            color: color.into(),
        });
        id
    }

    pub fn remove_shape(&mut self, id: &ShapeId) -> bool {
        let before = self.document.shapes.len();
        self.document.shapes.retain(|s| &s.id != id);
        let removed = self.document.shapes.len() != before;
        if !removed {
            warn!("Attempted to remove unknown shape {}", id);
        }
        removed
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.document.shapes
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        debug!("Viewport moved to {:?}", viewport);
        self.viewport = viewport;
    }

    // Clear canvas
    pub fn clear(&mut self) {
        info!("Clearing canvas");
        self.document.shapes.clear();
    }

    fn to_svg(&self, shapes: &[&Shape], options: RenderOptions) -> Option<VectorImage> {
        let area = shapes
            .iter()
            .map(|s| s.bounds)
            .reduce(|acc, b| acc.union(&b))?;

        let width = area.w * options.scale;
        let height = area.h * options.scale;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{} {} {} {}">"#,
            area.x, area.y, area.w, area.h
        );
        if options.background {
            svg.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                area.x,
                area.y,
                area.w,
                area.h,
                escape_attr(&self.background)
            ));
        }

        for shape in shapes {
            let b = shape.bounds;
            let color = escape_attr(&shape.color);
            let element = match shape.kind {
                ShapeKind::Rectangle => format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
                    b.x, b.y, b.w, b.h
                ),
                ShapeKind::Ellipse => format!(
                    r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{color}"/>"#,
                    b.x + b.w / 2.0,
                    b.y + b.h / 2.0,
                    b.w / 2.0,
                    b.h / 2.0
                ),
                ShapeKind::Line => format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}"/>"#,
                    b.x,
                    b.y,
                    b.right(),
                    b.bottom()
                ),
            };
            svg.push_str(&element);
        }
        svg.push_str("</svg>");

        Some(VectorImage::new(svg, width, height))
    }
}

// Create a default canvas
impl Default for Canvas {
    fn default() -> Self {
        Canvas::new(1280.0, 720.0)
    }
}

impl CanvasEditor for Canvas {
    fn export_state(&self, scope: ExportScope) -> Result<EditorState, EditorError> {
        let value = match scope {
            ExportScope::Document => serde_json::to_value(&self.document),
            ExportScope::All => serde_json::to_value(FullState {
                document: self.document.clone(),
                session: SessionState {
                    viewport: self.viewport,
                },
            }),
        }
        .map_err(|e| EditorError::InvalidState {
            reason: e.to_string(),
        })?;

        debug!("Exported {} shapes ({:?})", self.document.shapes.len(), scope);
        Ok(EditorState::new(value))
    }

    fn import_state(&mut self, state: &EditorState) -> Result<(), EditorError> {
        let value = state.as_value();

        // Accept both document-only and document+session exports
        if value.get("document").is_some() {
            let full: FullState = serde_json::from_value(value.clone()).map_err(|e| {
                EditorError::InvalidState {
                    reason: e.to_string(),
                }
            })?;
            self.document = full.document;
            self.viewport = full.session.viewport;
        } else {
            self.document = serde_json::from_value(value.clone()).map_err(|e| {
                EditorError::InvalidState {
                    reason: e.to_string(),
                }
            })?;
        }

        info!("Imported canvas with {} shapes", self.document.shapes.len());
        Ok(())
    }

    fn visible_shape_ids(&self) -> Vec<ShapeId> {
        self.document
            .shapes
            .iter()
            .filter(|s| s.bounds.intersects(&self.viewport))
            .map(|s| s.id.clone())
            .collect()
    }

    fn render_svg(&self, shape_ids: &[ShapeId], options: RenderOptions) -> RenderFuture {
        let shapes: Vec<&Shape> = self
            .document
            .shapes
            .iter()
            .filter(|s| shape_ids.contains(&s.id))
            .collect();

        if shapes.len() != shape_ids.len() {
            warn!(
                "Render requested {} shapes, {} exist",
                shape_ids.len(),
                shapes.len()
            );
        }

        let image = self.to_svg(&shapes, options);
        futures::future::ready(Ok(image)).boxed_local()
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
