pub mod document;
pub mod node;
pub mod path;
pub mod range;

pub use document::Document;
pub use node::{mark, mark_is_set, node_at, Element, ElementType, Marks, Node, Props, Text};
pub use path::Path;
pub use range::{Affinity, Point, Range};
