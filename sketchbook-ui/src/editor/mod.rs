// Editor module for sketchbook UI.

pub mod canvas;
pub mod history;

pub use canvas::{Bounds, Canvas, Document, Shape, ShapeKind};
pub use history::{PanelAction, SnapshotPanel};
