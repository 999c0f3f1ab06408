use std::cmp::Ordering;

use serde_json::Value;

use crate::editor::{matches, Editor, Location, Mode, NodesOptions};
use crate::error::{EditorError, Result};
use crate::model::{Affinity, Node, Path, Point, Props, Range, Text};
use crate::operation::Operation;

impl Editor {
    /// Type `text` at the selection, replacing an expanded selection. Pending
    /// marks are applied to the new text and then cleared.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.change(|ed| {
            let marks = ed.marks.take();
            if ed.selection.as_ref().is_some_and(Range::is_expanded) {
                ed.delete_selection()?;
            }
            let Some(point) = ed.selection.as_ref().map(|selection| selection.anchor.clone()) else {
                return Ok(());
            };
            match marks {
                Some(marks) => {
                    let leaf = Node::Text(Text {
                        text: text.to_string(),
                        marks,
                    });
                    ed.insert_nodes_at(vec![leaf], Location::Point(point), true)
                }
                None => ed.apply(Operation::InsertText {
                    path: point.path,
                    offset: point.offset,
                    text: text.to_string(),
                }),
            }
        })
    }

    /// Backspace: delete the char before the caret, joining blocks at a block
    /// start, or delete an expanded selection.
    pub fn delete_backward(&mut self) -> Result<()> {
        self.change(|ed| {
            let Some(selection) = ed.selection.clone() else {
                return Ok(());
            };
            if selection.is_expanded() {
                return ed.delete_selection();
            }
            let Some(before) = ed.point_before(&selection.anchor) else {
                return Ok(());
            };
            let point = ed.delete_range(&Range::new(before, selection.anchor), true)?;
            ed.set_selection(Some(Range::collapsed(point)))
        })
    }

    /// Delete the char after the caret, pulling the next block up at a block end.
    pub fn delete_forward(&mut self) -> Result<()> {
        self.change(|ed| {
            let Some(selection) = ed.selection.clone() else {
                return Ok(());
            };
            if selection.is_expanded() {
                return ed.delete_selection();
            }
            let Some(after) = ed.point_after(&selection.anchor) else {
                return Ok(());
            };
            let point = ed.delete_range(&Range::new(selection.anchor, after), false)?;
            ed.set_selection(Some(Range::collapsed(point)))
        })
    }

    /// Delete the content of an expanded selection
    pub fn delete_fragment(&mut self) -> Result<()> {
        self.change(|ed| ed.delete_selection())
    }

    fn delete_selection(&mut self) -> Result<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_collapsed() {
            return Ok(());
        }
        let point = self.delete_range(&selection, false)?;
        self.set_selection(Some(Range::collapsed(point)))
    }

    /// Remove everything inside `range`. When it spans blocks, the block
    /// holding the end is merged into the block holding the start. Returns
    /// where the range collapsed to.
    pub(crate) fn delete_range(&mut self, range: &Range, reverse: bool) -> Result<Point> {
        let (start, end) = range.edges();
        if start == end {
            return Ok(start);
        }
        let single_leaf = start.path == end.path;
        let across_blocks = start.path.parent() != end.path.parent();

        // Highest nodes lying completely inside the range
        let mut inside: Vec<Path> = Vec::new();
        let any = |_: &Node, _: &Path| true;
        for (_, path) in self.nodes_at(&Location::Range(range.clone()), &any, Mode::All, false, false) {
            if inside.last().is_some_and(|last| path.compare(last) == Ordering::Equal) {
                continue;
            }
            let holds = |point: &Point| path == point.path || path.is_ancestor_of(&point.path);
            if !holds(&start) && !holds(&end) {
                inside.push(path);
            }
        }

        let mark = self.op_mark();
        if !single_leaf {
            let leaf = self.leaf(&start.path)?;
            let text = leaf.slice(start.offset, leaf.len());
            if !text.is_empty() {
                self.apply(Operation::RemoveText {
                    path: start.path.clone(),
                    offset: start.offset,
                    text,
                })?;
            }
        }

        for path in inside.into_iter().rev() {
            if let Some(path) = path.transform_all(self.ops_since(mark)) {
                self.remove_node(&path)?;
            }
        }

        if let Some(end_now) = track(&end, self.ops_since(mark)) {
            let offset = if single_leaf { start.offset } else { 0 };
            let text = self.leaf(&end_now.path)?.slice(offset, end_now.offset);
            if !text.is_empty() {
                self.apply(Operation::RemoveText {
                    path: end_now.path,
                    offset,
                    text,
                })?;
            }
        }

        if !single_leaf && across_blocks {
            let start_now = track(&start, self.ops_since(mark));
            let end_block = track(&end, self.ops_since(mark)).and_then(|point| point.path.parent());
            if let (Some(_), Some(block)) = (start_now, end_block) {
                self.merge_with_previous_block(&block)?;
            }
        }

        let ops = self.ops_since(mark);
        let collapsed = if reverse {
            track(&start, ops).or_else(|| track(&end, ops))
        } else {
            track(&end, ops).or_else(|| track(&start, ops))
        };
        collapsed.ok_or_else(|| EditorError::InvalidPath(start.path.clone()))
    }

    /// One char before `point`. Leaf boundaries inside a block are not
    /// positions of their own; a block boundary is.
    pub fn point_before(&self, point: &Point) -> Option<Point> {
        if point.offset > 0 {
            return Some(Point::new(point.path.clone(), point.offset - 1));
        }
        let block = point.path.parent();
        let mut path = point.path.clone();
        while let Some((text, prev)) = self.previous_text(&path) {
            if prev.parent() != block {
                return Some(Point::new(prev, text.len()));
            }
            if !text.is_empty() {
                return Some(Point::new(prev, text.len() - 1));
            }
            path = prev;
        }
        None
    }

    /// One char after `point`, the mirror of [`Editor::point_before`]
    pub fn point_after(&self, point: &Point) -> Option<Point> {
        let leaf = self.leaf(&point.path).ok()?;
        if point.offset < leaf.len() {
            return Some(Point::new(point.path.clone(), point.offset + 1));
        }
        let block = point.path.parent();
        let mut path = point.path.clone();
        while let Some((text, next)) = self.next_text(&path) {
            if next.parent() != block {
                return Some(Point::new(next, 0));
            }
            if !text.is_empty() {
                return Some(Point::new(next, 1));
            }
            path = next;
        }
        None
    }

    /// Enter: split the block at the caret. The new block copies the
    /// properties of the one it was split from.
    pub fn insert_break(&mut self) -> Result<()> {
        self.change(|ed| {
            ed.delete_selection()?;
            let Some(point) = ed.selection.as_ref().map(|selection| selection.anchor.clone()) else {
                return Ok(());
            };
            ed.split_nodes_at(point, &matches::block, Mode::Lowest, true)
        })
    }

    /// Set a mark on the selected text, or on the next typed text when the
    /// selection is collapsed.
    pub fn add_mark(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            let props = Props::from([(key.to_string(), value)]);
            return self.set_nodes(props, NodesOptions::new().matching(matches::text).split());
        }
        let mut marks = self.marks().unwrap_or_default();
        marks.insert(key.to_string(), value);
        self.marks = Some(marks);
        Ok(())
    }

    pub fn remove_mark(&mut self, key: &str) -> Result<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            return self.unset_nodes(&[key], NodesOptions::new().matching(matches::text).split());
        }
        let mut marks = self.marks().unwrap_or_default();
        marks.remove(key);
        self.marks = Some(marks);
        Ok(())
    }
}

fn track(point: &Point, ops: &[Operation]) -> Option<Point> {
    ops.iter()
        .try_fold(point.clone(), |point, op| point.transform(op, Some(Affinity::Forward)))
}
