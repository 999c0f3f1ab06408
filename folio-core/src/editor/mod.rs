//! The editor: a value, a selection, and the machinery that keeps both
//! consistent while operations are applied.
//!
//! All mutation funnels through [`Editor::apply`]. Higher-level transforms
//! (see [`transforms`]) group operations into a *change*: when the outermost
//! change finishes the value is normalized and the change is recorded as one
//! undo batch. A change that fails is rolled back, so callers never observe
//! a half-applied transform.

mod history;
mod normalize;
mod query;
pub mod transforms;

use std::cmp::Ordering;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::model::{Marks, Node, Path, Point, Range};
use crate::operation::Operation;

pub use history::{Batch, History};
pub use query::{matches, Location, Matcher, Mode, NodeEntry, NodesOptions};

pub struct Editor {
    children: Vec<Node>,
    selection: Option<Range>,
    /// Marks applied to the next inserted text
    marks: Option<Marks>,
    /// Operations applied since the host last took them
    operations: Vec<Operation>,
    history: History,
    config: EditorConfig,

    depth: usize,
    change_start: usize,
    selection_before: Option<Range>,
    saving: bool,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            children: Vec::new(),
            selection: None,
            marks: None,
            operations: Vec::new(),
            history: History::new(config.history_limit),
            config,
            depth: 0,
            change_start: 0,
            selection_before: None,
            saving: true,
        }
    }

    /// An editor over `children`, normalized, with the caret at the start.
    pub fn with_value(children: Vec<Node>, config: EditorConfig) -> Result<Self> {
        let mut editor = Self::new(config);
        editor.children = children;
        editor.without_saving(|ed| ed.change(|_| Ok(())))?;
        let first = editor.texts().into_iter().next().map(|(_, path)| path);
        editor.selection = first.map(|path| Range::collapsed(Point::new(path, 0)));
        editor.operations.clear();
        Ok(editor)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.marks.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Operations applied since the last call, oldest first
    pub fn take_operations(&mut self) -> Vec<Operation> {
        if self.depth > 0 {
            return Vec::new();
        }
        std::mem::take(&mut self.operations)
    }

    /// Apply a single operation and map the selection through it.
    pub fn apply(&mut self, op: Operation) -> Result<()> {
        op.apply_to(&mut self.children)?;
        self.transform_selection(&op);
        tracing::trace!(?op, "applied operation");
        self.operations.push(op);
        Ok(())
    }

    /// Run `f` as one change: normalize afterwards, record it in history, and
    /// undo everything it applied if it fails.
    pub(crate) fn change<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let outermost = self.depth == 0;
        if outermost {
            self.change_start = self.operations.len();
            self.selection_before = self.selection.clone();
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if !outermost {
            return result;
        }

        let result = result.and_then(|value| {
            self.normalize()?;
            Ok(value)
        });
        match result {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }

    /// Run `f` without recording history
    pub(crate) fn without_saving<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saving = std::mem::replace(&mut self.saving, false);
        let result = f(self);
        self.saving = saving;
        result
    }

    /// Index into the operation log, for mapping paths across later edits
    pub(crate) fn op_mark(&self) -> usize {
        self.operations.len()
    }

    pub(crate) fn ops_since(&self, mark: usize) -> &[Operation] {
        &self.operations[mark.min(self.operations.len())..]
    }

    fn commit(&mut self) {
        let batch: Vec<Operation> = self.operations[self.change_start..]
            .iter()
            .filter(|op| !op.is_selection())
            .cloned()
            .collect();
        if batch.is_empty() {
            return;
        }
        tracing::debug!(operations = batch.len(), "committed change");
        if self.saving {
            self.history.record(batch, self.selection_before.clone());
        }
    }

    fn rollback(&mut self) {
        let applied = self.operations.split_off(self.change_start);
        tracing::warn!(operations = applied.len(), "rolling back failed change");
        for op in applied.iter().rev() {
            if let Err(err) = op.inverse().apply_to(&mut self.children) {
                tracing::warn!(%err, "could not invert operation during rollback");
            }
        }
        self.selection = self.selection_before.take();
    }

    fn transform_selection(&mut self, op: &Operation) {
        if let Operation::SetSelection { new, .. } = op {
            self.selection = new.clone();
            self.marks = None;
            return;
        }

        let Some(selection) = self.selection.take() else {
            return;
        };
        let (anchor_affinity, focus_affinity) = selection.inward_affinities();
        let anchor = selection
            .anchor
            .transform(op, Some(anchor_affinity))
            .or_else(|| self.relocate_point(op));
        let focus = selection
            .focus
            .transform(op, Some(focus_affinity))
            .or_else(|| self.relocate_point(op));

        self.selection = match (anchor, focus) {
            (Some(anchor), Some(focus)) => Some(Range::new(anchor, focus)),
            _ => None,
        };
    }

    /// New home for a point whose leaf was removed: the end of the previous
    /// leaf or the start of the next one, whichever is closer in the tree.
    fn relocate_point(&self, op: &Operation) -> Option<Point> {
        let Operation::RemoveNode { path, .. } = op else {
            return None;
        };

        let mut prev: Option<(usize, Path)> = None;
        let mut next: Option<Path> = None;
        for (text, text_path) in self.texts() {
            if text_path.compare(path) == Ordering::Less {
                prev = Some((text.len(), text_path));
            } else {
                next = Some(text_path);
                break;
            }
        }

        let prefer_next = match (&prev, &next) {
            (Some((_, prev_path)), Some(next_path)) => {
                if next_path == path {
                    next_path.previous().is_none()
                } else {
                    prev_path.common(path).len() < next_path.common(path).len()
                }
            }
            _ => false,
        };

        match (prev, next) {
            (Some((len, prev_path)), _) if !prefer_next => Some(Point::new(prev_path, len)),
            (_, Some(next_path)) => Some(Point::new(next_path, 0)),
            _ => None,
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{mark, ElementType, Text};

    /// Editor over `children` with the given selection
    pub(crate) fn editor(children: Vec<Node>, selection: Range) -> Editor {
        let mut editor = Editor::with_value(children, EditorConfig::default()).unwrap();
        editor.selection = Some(selection);
        editor
    }

    pub(crate) fn range(anchor: (&[usize], usize), focus: (&[usize], usize)) -> Range {
        Range::new(
            Point::new(anchor.0.to_vec(), anchor.1),
            Point::new(focus.0.to_vec(), focus.1),
        )
    }

    pub(crate) fn caret(path: &[usize], offset: usize) -> Range {
        Range::collapsed(Point::new(path.to_vec(), offset))
    }

    #[test]
    fn test_with_value_normalizes_and_selects_start() {
        let editor = Editor::with_value(Vec::new(), EditorConfig::default()).unwrap();
        assert_eq!(editor.children(), &[Node::paragraph("")]);
        assert_eq!(editor.selection(), Some(&caret(&[0, 0], 0)));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_selection_follows_text_edits() {
        let mut ed = editor(vec![Node::paragraph("hello")], caret(&[0, 0], 5));
        ed.apply(Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 0,
            text: ">> ".to_string(),
        })
        .unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 8)));
    }

    #[test]
    fn test_removed_leaf_relocates_selection() {
        let children = vec![Node::element(
            ElementType::Paragraph,
            vec![
                Node::text("one"),
                Node::Text(Text::new("two").with_mark(mark::BOLD, true)),
            ],
        )];
        let mut ed = editor(children, caret(&[0, 1], 2));
        let node = ed.children()[0].children()[1].clone();
        ed.apply(Operation::RemoveNode {
            path: Path::from([0, 1]),
            node,
        })
        .unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 3)));
    }

    #[test]
    fn test_removing_first_block_moves_selection_forward() {
        let mut ed = editor(
            vec![Node::paragraph("first"), Node::paragraph("second")],
            caret(&[0, 0], 1),
        );
        ed.apply(Operation::RemoveNode {
            path: Path::from([0]),
            node: Node::paragraph("first"),
        })
        .unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 0)));
    }

    #[test]
    fn test_failed_change_rolls_back() {
        let mut ed = editor(vec![Node::paragraph("keep")], caret(&[0, 0], 0));
        let result = ed.change(|ed| {
            ed.apply(Operation::InsertText {
                path: Path::from([0, 0]),
                offset: 4,
                text: "!".to_string(),
            })?;
            ed.apply(Operation::InsertText {
                path: Path::from([7, 0]),
                offset: 0,
                text: "?".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(ed.children(), &[Node::paragraph("keep")]);
        assert!(ed.take_operations().is_empty());
        assert!(!ed.history().can_undo());
    }
}
