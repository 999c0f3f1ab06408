use super::Editor;
use crate::error::Result;
use crate::model::Range;
use crate::operation::Operation;

/// One undoable step: the operations of a change and where the selection was
/// before it ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub operations: Vec<Operation>,
    pub selection_before: Option<Range>,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    undos: Vec<Batch>,
    redos: Vec<Batch>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            limit,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undos(&self) -> &[Batch] {
        &self.undos
    }

    pub fn redos(&self) -> &[Batch] {
        &self.redos
    }

    /// Record a finished change. Runs of typing or deleting single
    /// characters fold into the previous batch.
    pub(crate) fn record(&mut self, operations: Vec<Operation>, selection_before: Option<Range>) {
        self.redos.clear();

        if let Some(last) = self.undos.last_mut() {
            if continues_typing(last, &operations) {
                last.operations.extend(operations);
                return;
            }
        }

        self.undos.push(Batch {
            operations,
            selection_before,
        });
        if self.undos.len() > self.limit {
            let excess = self.undos.len() - self.limit;
            self.undos.drain(..excess);
        }
    }
}

fn continues_typing(last: &Batch, operations: &[Operation]) -> bool {
    let ([op], Some(prev)) = (operations, last.operations.last()) else {
        return false;
    };
    match (prev, op) {
        (
            Operation::InsertText {
                path: prev_path,
                offset: prev_offset,
                text: prev_text,
            },
            Operation::InsertText { path, offset, .. },
        ) => path == prev_path && *offset == prev_offset + prev_text.chars().count(),
        (
            Operation::RemoveText {
                path: prev_path,
                offset: prev_offset,
                ..
            },
            Operation::RemoveText { path, offset, text },
        ) => {
            // Backspace lands just before the previous removal, delete at the same spot.
            path == prev_path
                && (offset + text.chars().count() == *prev_offset || offset == prev_offset)
        }
        _ => false,
    }
}

impl Editor {
    /// Revert the most recent batch. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(batch) = self.history.undos.pop() else {
            return Ok(false);
        };

        let result = self.without_saving(|ed| {
            ed.change(|ed| {
                for op in batch.operations.iter().rev() {
                    ed.apply(op.inverse())?;
                }
                ed.apply(Operation::SetSelection {
                    old: ed.selection.clone(),
                    new: batch.selection_before.clone(),
                })
            })
        });

        match result {
            Ok(()) => {
                tracing::debug!(operations = batch.operations.len(), "undo");
                self.history.redos.push(batch);
                Ok(true)
            }
            Err(err) => {
                self.history.undos.push(batch);
                Err(err)
            }
        }
    }

    /// Re-apply the most recently undone batch.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(batch) = self.history.redos.pop() else {
            return Ok(false);
        };

        let result = self.without_saving(|ed| {
            ed.change(|ed| {
                ed.apply(Operation::SetSelection {
                    old: ed.selection.clone(),
                    new: batch.selection_before.clone(),
                })?;
                for op in &batch.operations {
                    ed.apply(op.clone())?;
                }
                Ok(())
            })
        });

        match result {
            Ok(()) => {
                tracing::debug!(operations = batch.operations.len(), "redo");
                self.history.undos.push(batch);
                Ok(true)
            }
            Err(err) => {
                self.history.redos.push(batch);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::{caret, editor};
    use crate::model::{Node, Path};

    fn type_char(ed: &mut Editor, offset: usize, ch: &str) {
        ed.change(|ed| {
            ed.apply(Operation::InsertText {
                path: Path::from([0, 0]),
                offset,
                text: ch.to_string(),
            })
        })
        .unwrap();
    }

    #[test]
    fn test_typing_merges_into_one_batch() {
        let mut ed = editor(vec![Node::paragraph("hello")], caret(&[0, 0], 5));
        type_char(&mut ed, 5, "!");
        type_char(&mut ed, 6, "?");
        assert_eq!(ed.history().undos().len(), 1);

        // Not contiguous with the last insert
        type_char(&mut ed, 0, ">");
        assert_eq!(ed.history().undos().len(), 2);
    }

    #[test]
    fn test_undo_and_redo() {
        let mut ed = editor(vec![Node::paragraph("hello")], caret(&[0, 0], 5));
        type_char(&mut ed, 5, "!");
        type_char(&mut ed, 6, "!");
        assert_eq!(ed.children(), &[Node::paragraph("hello!!")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 7)));

        assert!(ed.undo().unwrap());
        assert_eq!(ed.children(), &[Node::paragraph("hello")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 5)));
        assert!(ed.history().can_redo());
        assert!(!ed.undo().unwrap());

        assert!(ed.redo().unwrap());
        assert_eq!(ed.children(), &[Node::paragraph("hello!!")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 7)));
        assert!(!ed.redo().unwrap());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut ed = editor(vec![Node::paragraph("ab")], caret(&[0, 0], 2));
        type_char(&mut ed, 2, "c");
        ed.undo().unwrap();
        assert!(ed.history().can_redo());
        type_char(&mut ed, 0, "z");
        assert!(!ed.history().can_redo());
    }

    #[test]
    fn test_selection_changes_are_not_recorded() {
        let mut ed = editor(vec![Node::paragraph("ab")], caret(&[0, 0], 0));
        ed.change(|ed| {
            ed.apply(Operation::SetSelection {
                old: ed.selection.clone(),
                new: Some(caret(&[0, 0], 2)),
            })
        })
        .unwrap();
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let mut history = History::new(2);
        for offset in [0, 10, 20] {
            history.record(
                vec![Operation::InsertText {
                    path: Path::from([0, 0]),
                    offset,
                    text: "x".to_string(),
                }],
                None,
            );
        }
        assert_eq!(history.undos().len(), 2);
        assert!(matches!(
            history.undos()[0].operations[0],
            Operation::InsertText { offset: 10, .. }
        ));
    }

    #[test]
    fn test_backspaces_merge() {
        let remove = |offset: usize, text: &str| {
            vec![Operation::RemoveText {
                path: Path::from([0, 0]),
                offset,
                text: text.to_string(),
            }]
        };
        let mut history = History::new(10);
        history.record(remove(4, "o"), None);
        history.record(remove(3, "l"), None);
        history.record(remove(3, "x"), None);
        assert_eq!(history.undos().len(), 1);
        assert_eq!(history.undos()[0].operations.len(), 3);
    }
}
