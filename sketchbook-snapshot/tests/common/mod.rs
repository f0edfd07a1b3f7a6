#![allow(dead_code)]

use futures::channel::oneshot;
use futures::FutureExt;
use serde_json::json;
use sketchbook_core::{
    CanvasEditor, EditorError, EditorState, ExportScope, RenderFuture, RenderOptions, ShapeId,
    VectorImage,
};
use std::cell::RefCell;

pub enum RenderMode {
    Image,
    Absent,
    Fail,
    Gated(oneshot::Receiver<()>),
}

/// Scriptable editor double.
pub struct FakeEditor {
    pub document: serde_json::Value,
    pub visible: Vec<ShapeId>,
    pub imported: Vec<EditorState>,
    pub fail_export: bool,
    pub fail_import: bool,
    render: RefCell<RenderMode>,
    pub render_calls: RefCell<Vec<(Vec<ShapeId>, RenderOptions)>>,
}

impl FakeEditor {
    pub fn with_shapes(ids: &[&str]) -> Self {
        Self {
            document: json!({ "shapes": ids, "meta": { "zoom": 1 } }),
            visible: ids.iter().map(|id| ShapeId::new(*id)).collect(),
            imported: Vec::new(),
            fail_export: false,
            fail_import: false,
            render: RefCell::new(RenderMode::Image),
            render_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_shapes(&[])
    }

    pub fn set_render(&self, mode: RenderMode) {
        *self.render.borrow_mut() = mode;
    }

    /// Next render waits until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.set_render(RenderMode::Gated(rx));
        tx
    }
}

pub fn svg_for(ids: &[ShapeId]) -> String {
    let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" data-shapes="{}"/>"#,
        names.join(",")
    )
}

impl CanvasEditor for FakeEditor {
    fn export_state(&self, _scope: ExportScope) -> Result<EditorState, EditorError> {
        if self.fail_export {
            return Err(EditorError::Unavailable);
        }
        Ok(EditorState::new(self.document.clone()))
    }

    fn import_state(&mut self, state: &EditorState) -> Result<(), EditorError> {
        if self.fail_import {
            return Err(EditorError::InvalidState {
                reason: "schema mismatch".into(),
            });
        }
        self.document = state.as_value().clone();
        self.imported.push(state.clone());
        Ok(())
    }

    fn visible_shape_ids(&self) -> Vec<ShapeId> {
        self.visible.clone()
    }

    fn render_svg(&self, shape_ids: &[ShapeId], options: RenderOptions) -> RenderFuture {
        self.render_calls
            .borrow_mut()
            .push((shape_ids.to_vec(), options));
        let svg = svg_for(shape_ids);
        let mode = std::mem::replace(&mut *self.render.borrow_mut(), RenderMode::Image);

        match mode {
            RenderMode::Image => {
                async move { Ok::<_, EditorError>(Some(VectorImage::new(svg, 100.0, 50.0))) }
                    .boxed_local()
            }
            RenderMode::Absent => {
                self.set_render(RenderMode::Absent);
                async { Ok::<_, EditorError>(None) }.boxed_local()
            }
            RenderMode::Fail => {
                self.set_render(RenderMode::Fail);
                async {
                    Err::<Option<VectorImage>, _>(EditorError::Render {
                        reason: "scene is mid-transaction".into(),
                    })
                }
                .boxed_local()
            }
            RenderMode::Gated(rx) => async move {
                let _ = rx.await;
                Ok::<_, EditorError>(Some(VectorImage::new(svg, 100.0, 50.0)))
            }
            .boxed_local(),
        }
    }
}
