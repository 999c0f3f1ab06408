//! Primitive, invertible document operations.
//!
//! Every change to an editor's value is expressed as a sequence of
//! [`Operation`]s. Each one carries enough information to be undone:
//! [`Operation::inverse`] produces the operation that restores the previous
//! state. Paths, points and ranges are mapped through operations with their
//! `transform` methods.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::model::node::{children_at, children_at_mut, node_at, node_at_mut};
use crate::model::{Node, Path, Props, Range};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    InsertNode {
        path: Path,
        node: Node,
    },
    RemoveNode {
        path: Path,
        node: Node,
    },
    /// Split the node at `path`; `position` is a char offset for text and a
    /// child index for elements. The new right half gets `properties`.
    SplitNode {
        path: Path,
        position: usize,
        properties: Props,
    },
    /// Merge the node at `path` into its previous sibling, which had
    /// `position` chars/children before the merge. `properties` are those of
    /// the merged-away node.
    MergeNode {
        path: Path,
        position: usize,
        properties: Props,
    },
    MoveNode {
        path: Path,
        new_path: Path,
    },
    /// `properties` holds the previous values of changed keys (absent when the
    /// key was unset), `new_properties` the new ones (absent to unset).
    SetNode {
        path: Path,
        properties: Props,
        new_properties: Props,
    },
    SetSelection {
        old: Option<Range>,
        new: Option<Range>,
    },
}

impl Operation {
    pub fn is_selection(&self) -> bool {
        matches!(self, Operation::SetSelection { .. })
    }

    /// Path of the node this operation touches, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SetNode { path, .. } => Some(path),
            Operation::SetSelection { .. } => None,
        }
    }

    pub fn inverse(&self) -> Operation {
        match self {
            Operation::InsertText { path, offset, text } => Operation::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Operation::RemoveText { path, offset, text } => Operation::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Operation::InsertNode { path, node } => Operation::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::RemoveNode { path, node } => Operation::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::SplitNode {
                path,
                position,
                properties,
            } => Operation::MergeNode {
                path: path.next(),
                position: *position,
                properties: properties.clone(),
            },
            Operation::MergeNode {
                path,
                position,
                properties,
            } => Operation::SplitNode {
                path: path.previous().unwrap_or_else(|| path.clone()),
                position: *position,
                properties: properties.clone(),
            },
            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return self.clone();
                }
                if path.is_sibling(new_path) {
                    return Operation::MoveNode {
                        path: new_path.clone(),
                        new_path: path.clone(),
                    };
                }
                // The node now lives at the transformed path; sending it to
                // where its old next sibling went puts it back in place.
                let inverse_path = path.transform(self).unwrap_or_else(|| new_path.clone());
                let inverse_new_path = path.next().transform(self).unwrap_or_else(|| path.clone());
                Operation::MoveNode {
                    path: inverse_path,
                    new_path: inverse_new_path,
                }
            }
            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => Operation::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
            Operation::SetSelection { old, new } => Operation::SetSelection {
                old: new.clone(),
                new: old.clone(),
            },
        }
    }

    /// Apply to a value. On error the value is left untouched.
    pub(crate) fn apply_to(&self, root: &mut Vec<Node>) -> Result<()> {
        match self {
            Operation::InsertText { path, offset, text } => {
                let leaf = text_at_mut(root, path)?;
                let at = leaf.byte_index(*offset).ok_or_else(|| EditorError::InvalidOffset {
                    path: path.clone(),
                    offset: *offset,
                    len: leaf.len(),
                })?;
                leaf.text.insert_str(at, text);
            }
            Operation::RemoveText { path, offset, text } => {
                let leaf = text_at_mut(root, path)?;
                let count = text.chars().count();
                let (Some(start), Some(end)) = (leaf.byte_index(*offset), leaf.byte_index(offset + count))
                else {
                    return Err(EditorError::InvalidOffset {
                        path: path.clone(),
                        offset: offset + count,
                        len: leaf.len(),
                    });
                };
                leaf.text.replace_range(start..end, "");
            }
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_path(path)?;
                let siblings = siblings_mut(root, &parent, path)?;
                if index > siblings.len() {
                    return Err(EditorError::InvalidPath(path.clone()));
                }
                siblings.insert(index, node.clone());
            }
            Operation::RemoveNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                let siblings = siblings_mut(root, &parent, path)?;
                if index >= siblings.len() {
                    return Err(EditorError::InvalidPath(path.clone()));
                }
                siblings.remove(index);
            }
            Operation::MergeNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                if index == 0 {
                    return Err(EditorError::CannotMerge(path.clone()));
                }
                let siblings = siblings_mut(root, &parent, path)?;
                if index >= siblings.len() {
                    return Err(EditorError::InvalidPath(path.clone()));
                }
                match (&siblings[index - 1], &siblings[index]) {
                    (Node::Text(_), Node::Text(_)) | (Node::Element(_), Node::Element(_)) => {}
                    _ => return Err(EditorError::CannotMerge(path.clone())),
                }
                let node = siblings.remove(index);
                match (&mut siblings[index - 1], node) {
                    (Node::Text(prev), Node::Text(text)) => prev.text.push_str(&text.text),
                    (Node::Element(prev), Node::Element(element)) => {
                        prev.children.extend(element.children)
                    }
                    _ => unreachable!("kinds checked above"),
                }
            }
            Operation::SplitNode {
                path,
                position,
                properties,
            } => {
                let (parent, index) = split_path(path)?;
                let node = node_at(root, path).ok_or_else(|| EditorError::InvalidPath(path.clone()))?;
                let mut right = node.empty_like(properties)?;
                let mut left = node.clone();
                match (&mut left, &mut right) {
                    (Node::Text(left), Node::Text(right)) => {
                        let at = left.byte_index(*position).ok_or_else(|| EditorError::InvalidOffset {
                            path: path.clone(),
                            offset: *position,
                            len: left.len(),
                        })?;
                        right.text = left.text.split_off(at);
                    }
                    (Node::Element(left), Node::Element(right)) => {
                        if *position > left.children.len() {
                            return Err(EditorError::InvalidOffset {
                                path: path.clone(),
                                offset: *position,
                                len: left.children.len(),
                            });
                        }
                        right.children = left.children.split_off(*position);
                    }
                    _ => unreachable!("empty_like keeps the node kind"),
                }
                let siblings = siblings_mut(root, &parent, path)?;
                siblings[index] = left;
                siblings.insert(index + 1, right);
            }
            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return Ok(());
                }
                if path.is_ancestor_of(new_path) {
                    return Err(invalid_move(path, new_path));
                }
                let (parent, index) = split_path(path)?;
                let (_, new_index) = split_path(new_path)?;
                let true_path = path
                    .transform(self)
                    .ok_or_else(|| invalid_move(path, new_path))?;
                let true_parent = true_path.parent().ok_or_else(|| invalid_move(path, new_path))?;
                let true_index = true_path.index().unwrap_or(new_index);

                let siblings = siblings_mut(root, &parent, path)?;
                if index >= siblings.len() {
                    return Err(EditorError::InvalidPath(path.clone()));
                }
                let node = siblings.remove(index);

                let fits = children_at(root, &true_parent).is_some_and(|target| true_index <= target.len());
                if !fits {
                    // Put the node back so the value is unchanged.
                    if let Some(siblings) = children_at_mut(root, &parent) {
                        siblings.insert(index, node);
                    }
                    return Err(invalid_move(path, new_path));
                }
                if let Some(target) = children_at_mut(root, &true_parent) {
                    target.insert(true_index, node);
                }
            }
            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => {
                let node = node_at_mut(root, path).ok_or_else(|| EditorError::InvalidPath(path.clone()))?;
                let mut updated = node.clone();
                for (key, value) in new_properties {
                    updated.set_prop(key, Some(value.clone()))?;
                }
                for key in properties.keys() {
                    if !new_properties.contains_key(key) {
                        updated.set_prop(key, None)?;
                    }
                }
                *node = updated;
            }
            Operation::SetSelection { .. } => {}
        }
        Ok(())
    }
}

fn invalid_move(path: &Path, new_path: &Path) -> EditorError {
    EditorError::InvalidMove {
        from: path.clone(),
        to: new_path.clone(),
    }
}

fn split_path(path: &Path) -> Result<(Path, usize)> {
    match (path.parent(), path.index()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(EditorError::InvalidPath(path.clone())),
    }
}

fn siblings_mut<'a>(root: &'a mut Vec<Node>, parent: &Path, path: &Path) -> Result<&'a mut Vec<Node>> {
    children_at_mut(root, parent).ok_or_else(|| EditorError::InvalidPath(path.clone()))
}

fn text_at_mut<'a>(root: &'a mut [Node], path: &Path) -> Result<&'a mut crate::model::Text> {
    match node_at_mut(root, path) {
        Some(Node::Text(text)) => Ok(text),
        Some(Node::Element(_)) => Err(EditorError::NodeKind {
            path: path.clone(),
            expected: "a text node",
        }),
        None => Err(EditorError::InvalidPath(path.clone())),
    }
}
