//! Folio Core - Platform-agnostic rich-text editing library
//!
//! This crate provides the document tree, the operations that change it, and
//! an [`Editor`] that applies them while keeping the selection, the undo
//! history and the tree's invariants consistent. Formatting toggles, key
//! chords, caret motion and HTML rendering sit on top, so a front end only
//! has to draw the value and forward keys.

pub mod app;
pub mod command;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod operation;
pub mod render;

pub use app::{App, Mode};
pub use command::{Command, KeyChord, Keymap};
pub use config::EditorConfig;
pub use cursor::{CursorState, Motion};
pub use editor::transforms::Edge;
pub use editor::{Editor, History, Location, NodesOptions};
pub use error::{EditorError, Result};
pub use export::{document_from_json, to_json, ExportDocument};
pub use model::{mark, Affinity, Document, Element, ElementType, Marks, Node, Path, Point, Props, Range, Text};
pub use operation::Operation;
