use crate::editor::{Editor, Location};
use crate::error::{EditorError, Result};
use crate::model::{Path, Point, Range};
use crate::operation::Operation;

/// Which end of the selection to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Anchor,
    Focus,
    Start,
    End,
}

impl Editor {
    /// Select a node (its whole range), a caret position or a range.
    pub fn select(&mut self, target: impl Into<Location>) -> Result<()> {
        let range = match target.into() {
            Location::Path(path) => self.range_of(&path)?,
            Location::Point(point) => Range::collapsed(point),
            Location::Range(range) => range,
        };
        self.check_point(&range.anchor)?;
        self.check_point(&range.focus)?;
        self.change(|ed| ed.set_selection(Some(range)))
    }

    pub fn deselect(&mut self) -> Result<()> {
        self.change(|ed| ed.set_selection(None))
    }

    /// Collapse the selection onto one of its edges
    pub fn collapse(&mut self, edge: Edge) -> Result<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        let point = match edge {
            Edge::Anchor => selection.anchor,
            Edge::Focus => selection.focus,
            Edge::Start => selection.start(),
            Edge::End => selection.end(),
        };
        self.select(point)
    }

    /// Move one edge of the selection, keeping the other where it is
    pub fn set_selection_point(&mut self, point: Point, edge: Edge) -> Result<()> {
        self.check_point(&point)?;
        let Some(mut selection) = self.selection.clone() else {
            return self.select(point);
        };
        let backward = selection.is_backward();
        let moves_anchor = match edge {
            Edge::Anchor => true,
            Edge::Focus => false,
            Edge::Start => !backward,
            Edge::End => backward,
        };
        if moves_anchor {
            selection.anchor = point;
        } else {
            selection.focus = point;
        }
        self.change(|ed| ed.set_selection(Some(selection)))
    }

    pub fn select_all(&mut self) -> Result<()> {
        let range = self.range_of(&Path::root())?;
        self.select(range)
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Range>) -> Result<()> {
        if self.selection == selection {
            return Ok(());
        }
        self.apply(Operation::SetSelection {
            old: self.selection.clone(),
            new: selection,
        })
    }

    fn check_point(&self, point: &Point) -> Result<()> {
        let leaf = self.leaf(&point.path)?;
        if point.offset > leaf.len() {
            return Err(EditorError::InvalidOffset {
                path: point.path.clone(),
                offset: point.offset,
                len: leaf.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::{caret, editor, range};
    use crate::model::Node;

    fn doc() -> Vec<Node> {
        vec![Node::paragraph("first"), Node::paragraph("second")]
    }

    #[test]
    fn test_select_targets() {
        let mut ed = editor(doc(), caret(&[0, 0], 0));
        ed.select(Path::from([1])).unwrap();
        assert_eq!(ed.selection(), Some(&range((&[1, 0], 0), (&[1, 0], 6))));

        ed.select(Point::new([0, 0], 2)).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 2)));

        assert!(ed.select(Point::new([0, 0], 9)).is_err());
        assert!(ed.select(Point::new([0], 0)).is_err());
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 2)));
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn test_collapse_and_deselect() {
        let backward = range((&[1, 0], 3), (&[0, 0], 1));
        let mut ed = editor(doc(), backward.clone());
        ed.collapse(Edge::Start).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 1)));

        let mut ed = editor(doc(), backward);
        ed.collapse(Edge::Anchor).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[1, 0], 3)));

        ed.deselect().unwrap();
        assert!(ed.selection().is_none());
    }

    #[test]
    fn test_set_selection_point() {
        let mut ed = editor(doc(), range((&[0, 0], 1), (&[0, 0], 3)));
        ed.set_selection_point(Point::new([1, 0], 2), Edge::End).unwrap();
        assert_eq!(ed.selection(), Some(&range((&[0, 0], 1), (&[1, 0], 2))));

        ed.set_selection_point(Point::new([0, 0], 0), Edge::Anchor).unwrap();
        assert_eq!(ed.selection(), Some(&range((&[0, 0], 0), (&[1, 0], 2))));
    }

    #[test]
    fn test_select_all_and_pending_marks_reset() {
        let mut ed = editor(doc(), caret(&[0, 0], 0));
        ed.add_mark("bold", true).unwrap();
        assert!(ed.pending_marks().is_some());
        ed.select_all().unwrap();
        assert_eq!(ed.selection(), Some(&range((&[0, 0], 0), (&[1, 0], 6))));
        assert!(ed.pending_marks().is_none());
    }
}
