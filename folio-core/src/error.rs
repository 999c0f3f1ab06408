use thiserror::Error;

use crate::model::Path;

/// Errors produced while applying operations or running transforms.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no node at path {0}")]
    InvalidPath(Path),
    #[error("offset {offset} is out of bounds for text of length {len} at {path}")]
    InvalidOffset { path: Path, offset: usize, len: usize },
    #[error("node at {path} is not {expected}")]
    NodeKind { path: Path, expected: &'static str },
    #[error("cannot merge node at {0} into its previous sibling")]
    CannotMerge(Path),
    #[error("cannot lift node at {0}: it is not inside an element")]
    CannotLift(Path),
    #[error("cannot move node at {from} to {to}")]
    InvalidMove { from: Path, to: Path },
    #[error("document did not settle after {0} normalization passes")]
    NormalizeLimit(usize),
    #[error("property '{0}' cannot be set directly")]
    ReservedProperty(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
