//! Editing commands built out of [`Operation`](crate::operation::Operation)s.
//!
//! Each public transform runs as a single change, so it is normalized,
//! recorded in history as one batch and rolled back as a whole on error.
//! Transforms that take [`NodesOptions`](super::NodesOptions) default to the
//! current selection and, unless told otherwise, act on the lowest matching
//! blocks.

mod node;
mod selection;
mod text;

pub use selection::Edge;
