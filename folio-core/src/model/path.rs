use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// Location of a node as child indices from the document root.
///
/// The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the `index`th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Append a relative path
    pub fn join(&self, rest: &[usize]) -> Self {
        let mut indices = self.0.clone();
        indices.extend_from_slice(rest);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Index of this node within its parent
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the next sibling. The root has no siblings and maps to itself.
    pub fn next(&self) -> Self {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last += 1;
        }
        Self(indices)
    }

    pub fn previous(&self) -> Option<Self> {
        match self.0.last() {
            Some(&last) if last > 0 => {
                let mut indices = self.0.clone();
                indices[self.0.len() - 1] = last - 1;
                Some(Self(indices))
            }
            _ => None,
        }
    }

    /// All proper ancestors, root first
    pub fn ancestors(&self) -> Vec<Self> {
        (0..self.0.len()).map(|n| Self(self.0[..n].to_vec())).collect()
    }

    /// All ancestors followed by the path itself, root first
    pub fn levels(&self) -> Vec<Self> {
        (0..=self.0.len()).map(|n| Self(self.0[..n].to_vec())).collect()
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_descendant_of(&self, other: &Path) -> bool {
        other.is_ancestor_of(self)
    }

    pub fn is_sibling(&self, other: &Path) -> bool {
        if self.0.is_empty() || self.0.len() != other.0.len() {
            return false;
        }
        let n = self.0.len() - 1;
        self.0[..n] == other.0[..n] && self.0[n] != other.0[n]
    }

    /// Whether this path's last index comes before `other`'s index at the
    /// same depth, under the same parent.
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some(i) = self.0.len().checked_sub(1) else {
            return false;
        };
        if other.0.len() <= i {
            return false;
        }
        self.0[..i] == other.0[..i] && self.0[i] < other.0[i]
    }

    pub fn ends_after(&self, other: &Path) -> bool {
        let Some(i) = self.0.len().checked_sub(1) else {
            return false;
        };
        if other.0.len() <= i {
            return false;
        }
        self.0[..i] == other.0[..i] && self.0[i] > other.0[i]
    }

    /// Document-order comparison where ancestors and descendants are equal.
    pub fn compare(&self, other: &Path) -> Ordering {
        let n = self.0.len().min(other.0.len());
        self.0[..n].cmp(&other.0[..n])
    }

    pub fn is_before(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Longest shared prefix
    pub fn common(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Self(self.0[..shared].to_vec())
    }

    /// Map this path through an operation. `None` means the node it pointed
    /// to no longer exists.
    pub fn transform(&self, op: &Operation) -> Option<Path> {
        let mut p = self.0.clone();

        match op {
            Operation::InsertNode { path: op_path, .. } => {
                if op_path == self || op_path.ends_before(self) || op_path.is_ancestor_of(self) {
                    p[op_path.len() - 1] += 1;
                }
            }
            Operation::RemoveNode { path: op_path, .. } => {
                if op_path == self || op_path.is_ancestor_of(self) {
                    return None;
                }
                if op_path.ends_before(self) {
                    p[op_path.len() - 1] -= 1;
                }
            }
            Operation::MergeNode { path: op_path, position, .. } => {
                if op_path == self || op_path.ends_before(self) {
                    p[op_path.len() - 1] -= 1;
                } else if op_path.is_ancestor_of(self) {
                    p[op_path.len() - 1] -= 1;
                    p[op_path.len()] += position;
                }
            }
            Operation::SplitNode { path: op_path, position, .. } => {
                if op_path == self {
                    // Nodes at the split point stay with the original half.
                } else if op_path.ends_before(self) {
                    p[op_path.len() - 1] += 1;
                } else if op_path.is_ancestor_of(self) && self.0[op_path.len()] >= *position {
                    p[op_path.len() - 1] += 1;
                    p[op_path.len()] -= position;
                }
            }
            Operation::MoveNode { path: op_path, new_path } => {
                if op_path == new_path {
                    return Some(self.clone());
                }

                if op_path.is_ancestor_of(self) || op_path == self {
                    let mut moved = new_path.0.clone();
                    if op_path.ends_before(new_path) && op_path.len() < new_path.len() {
                        moved[op_path.len() - 1] -= 1;
                    }
                    moved.extend_from_slice(&self.0[op_path.len()..]);
                    return Some(Self(moved));
                } else if op_path.is_sibling(new_path)
                    && (new_path.is_ancestor_of(self) || new_path == self)
                {
                    if op_path.ends_before(self) {
                        p[op_path.len() - 1] -= 1;
                    } else {
                        p[op_path.len() - 1] += 1;
                    }
                } else if new_path.ends_before(self)
                    || new_path == self
                    || new_path.is_ancestor_of(self)
                {
                    if op_path.ends_before(self) {
                        p[op_path.len() - 1] -= 1;
                    }
                    p[new_path.len() - 1] += 1;
                } else if op_path.ends_before(self) {
                    if new_path == self {
                        p[new_path.len() - 1] += 1;
                    }
                    p[op_path.len() - 1] -= 1;
                }
            }
            Operation::InsertText { .. }
            | Operation::RemoveText { .. }
            | Operation::SetNode { .. }
            | Operation::SetSelection { .. } => {}
        }

        Some(Self(p))
    }

    /// Map this path through a sequence of operations.
    pub fn transform_all<'a>(&self, ops: impl IntoIterator<Item = &'a Operation>) -> Option<Path> {
        let mut path = self.clone();
        for op in ops {
            path = path.transform(op)?;
        }
        Some(path)
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    #[test]
    fn test_relationships() {
        let a = Path::from([0, 1]);
        let b = Path::from([0, 1, 2]);
        let c = Path::from([0, 2]);

        assert!(a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(a.is_sibling(&c));
        assert!(a.ends_before(&c));
        assert!(a.ends_before(&Path::from([0, 2, 5])));
        assert_eq!(a.compare(&b), Ordering::Equal);
        assert_eq!(b.compare(&c), Ordering::Less);
        assert_eq!(b.common(&c), Path::from([0]));
        assert_eq!(c.previous(), Some(a.clone()));
        assert_eq!(Path::from([0, 0]).previous(), None);
        assert_eq!(a.next(), c);
    }

    #[test]
    fn test_transform_insert_and_remove() {
        let insert = Operation::InsertNode {
            path: Path::from([1]),
            node: Node::paragraph(""),
        };
        assert_eq!(Path::from([1, 0]).transform(&insert), Some(Path::from([2, 0])));
        assert_eq!(Path::from([0, 3]).transform(&insert), Some(Path::from([0, 3])));

        let remove = Operation::RemoveNode {
            path: Path::from([1]),
            node: Node::paragraph(""),
        };
        assert_eq!(Path::from([1, 0]).transform(&remove), None);
        assert_eq!(Path::from([2]).transform(&remove), Some(Path::from([1])));
    }

    #[test]
    fn test_transform_split_and_merge() {
        let split = Operation::SplitNode {
            path: Path::from([0]),
            position: 2,
            properties: Default::default(),
        };
        assert_eq!(Path::from([0, 3]).transform(&split), Some(Path::from([1, 1])));
        assert_eq!(Path::from([0, 1]).transform(&split), Some(Path::from([0, 1])));
        assert_eq!(Path::from([1]).transform(&split), Some(Path::from([2])));

        let merge = Operation::MergeNode {
            path: Path::from([1]),
            position: 2,
            properties: Default::default(),
        };
        assert_eq!(Path::from([1, 1]).transform(&merge), Some(Path::from([0, 3])));
        assert_eq!(Path::from([2]).transform(&merge), Some(Path::from([1])));
    }

    #[test]
    fn test_transform_move() {
        let op = Operation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([2]),
        };
        assert_eq!(Path::from([0, 1]).transform(&op), Some(Path::from([2, 1])));
        assert_eq!(Path::from([1]).transform(&op), Some(Path::from([0])));
        assert_eq!(Path::from([2]).transform(&op), Some(Path::from([1])));
        assert_eq!(Path::from([3]).transform(&op), Some(Path::from([3])));

        let into_sibling = Operation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([1, 0]),
        };
        assert_eq!(Path::from([0]).transform(&into_sibling), Some(Path::from([0, 0])));
        assert_eq!(Path::from([1, 0]).transform(&into_sibling), Some(Path::from([0, 1])));
    }
}
