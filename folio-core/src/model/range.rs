use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Path;
use crate::operation::Operation;

/// Which side a point sticks to when content is inserted or split exactly
/// at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

/// A position inside a text leaf. `offset` counts chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match self.path.compare(&other.path) {
            Ordering::Equal => self.offset.cmp(&other.offset),
            ord => ord,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Map this point through an operation. `None` means the leaf it was in
    /// has gone away (or the point sat exactly on a split without affinity).
    pub fn transform(&self, op: &Operation, affinity: Option<Affinity>) -> Option<Point> {
        let mut point = self.clone();

        match op {
            Operation::InsertText { path, offset, text } => {
                if *path == point.path
                    && (*offset < point.offset
                        || (*offset == point.offset && affinity == Some(Affinity::Forward)))
                {
                    point.offset += text.chars().count();
                }
            }
            Operation::RemoveText { path, offset, text } => {
                if *path == point.path && *offset <= point.offset {
                    point.offset -= (point.offset - offset).min(text.chars().count());
                }
            }
            Operation::MergeNode { path, position, .. } => {
                if *path == point.path {
                    point.offset += position;
                }
                point.path = point.path.transform(op)?;
            }
            Operation::RemoveNode { path, .. } => {
                if *path == point.path || path.is_ancestor_of(&point.path) {
                    return None;
                }
                point.path = point.path.transform(op)?;
            }
            Operation::SplitNode { path, position, .. } => {
                if *path == point.path {
                    if *position == point.offset && affinity.is_none() {
                        return None;
                    }
                    if *position < point.offset
                        || (*position == point.offset && affinity == Some(Affinity::Forward))
                    {
                        point.offset -= position;
                        point.path = point.path.next();
                    }
                } else {
                    point.path = point.path.transform(op)?;
                }
            }
            _ => {
                point.path = point.path.transform(op)?;
            }
        }

        Some(point)
    }
}

/// An anchor/focus pair. The anchor is where the selection started, the
/// focus where it ends; the focus may come first in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    /// Start and end in document order
    pub fn edges(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.edges().0
    }

    pub fn end(&self) -> Point {
        self.edges().1
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        let (start, end) = self.edges();
        !point.is_before(&start) && !point.is_after(&end)
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        let (s1, e1) = self.edges();
        let (s2, e2) = other.edges();
        let start = if s1.is_before(&s2) { s2 } else { s1 };
        let end = if e1.is_before(&e2) { e1 } else { e2 };
        if end.is_before(&start) {
            None
        } else {
            Some(Range::new(start, end))
        }
    }

    /// Affinities for the anchor and focus that keep content inserted at
    /// the edges outside of an expanded range.
    pub fn inward_affinities(&self) -> (Affinity, Affinity) {
        if self.is_collapsed() {
            (Affinity::Forward, Affinity::Forward)
        } else if self.is_backward() {
            (Affinity::Backward, Affinity::Forward)
        } else {
            (Affinity::Forward, Affinity::Backward)
        }
    }

    /// Map both points through an operation. A collapsed range moves with
    /// inserted content; an expanded one keeps inserted content at its edges
    /// outside.
    pub fn transform(&self, op: &Operation) -> Option<Range> {
        let (anchor_affinity, focus_affinity) = self.inward_affinities();
        let anchor = self.anchor.transform(op, Some(anchor_affinity))?;
        let focus = self.focus.transform(op, Some(focus_affinity))?;
        Some(Range { anchor, focus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_and_direction() {
        let range = Range::new(Point::new([0, 0], 5), Point::new([0, 0], 2));
        assert!(range.is_backward());
        assert_eq!(range.start(), Point::new([0, 0], 2));
        assert_eq!(range.end(), Point::new([0, 0], 5));
        assert!(range.contains_point(&Point::new([0, 0], 3)));
        assert!(!range.contains_point(&Point::new([1, 0], 0)));
    }

    #[test]
    fn test_point_follows_inserted_text() {
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "ab".to_string(),
        };
        let point = Point::new([0, 0], 2);
        assert_eq!(point.transform(&op, Some(Affinity::Forward)), Some(Point::new([0, 0], 4)));
        assert_eq!(point.transform(&op, Some(Affinity::Backward)), Some(Point::new([0, 0], 2)));
    }

    #[test]
    fn test_point_moves_into_split_half() {
        let op = Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 3,
            properties: Default::default(),
        };
        assert_eq!(
            Point::new([0, 0], 5).transform(&op, Some(Affinity::Forward)),
            Some(Point::new([0, 1], 2))
        );
        assert_eq!(
            Point::new([0, 0], 3).transform(&op, Some(Affinity::Backward)),
            Some(Point::new([0, 0], 3))
        );
        assert_eq!(Point::new([0, 0], 3).transform(&op, None), None);
    }

    #[test]
    fn test_point_through_merge_and_remove_text() {
        let merge = Operation::MergeNode {
            path: Path::from([0, 1]),
            position: 4,
            properties: Default::default(),
        };
        assert_eq!(
            Point::new([0, 1], 1).transform(&merge, Some(Affinity::Forward)),
            Some(Point::new([0, 0], 5))
        );

        let remove = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "bcd".to_string(),
        };
        assert_eq!(
            Point::new([0, 0], 3).transform(&remove, None),
            Some(Point::new([0, 0], 1))
        );
        assert_eq!(
            Point::new([0, 0], 6).transform(&remove, None),
            Some(Point::new([0, 0], 3))
        );
    }

    #[test]
    fn test_expanded_range_excludes_edge_inserts() {
        let range = Range::new(Point::new([0, 0], 1), Point::new([0, 0], 3));
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 3,
            text: "xy".to_string(),
        };
        let moved = range.transform(&op).unwrap();
        assert_eq!(moved.focus.offset, 3);
        assert_eq!(moved.anchor.offset, 1);
    }
}
