//! Formatting toggles: marks on text and block types, including wrapping
//! blocks into lists and back out of them.

use serde_json::Value;

use crate::editor::{matches, Editor, NodesOptions};
use crate::error::Result;
use crate::model::{mark_is_set, ElementType, Node, Path, Props};

/// Whether text typed or selected now carries `mark`. An expanded selection
/// counts only if every selected leaf has it.
pub fn is_mark_active(editor: &Editor, mark: &str) -> bool {
    let Some(selection) = editor.selection() else {
        return false;
    };
    if selection.is_collapsed() {
        return editor.marks().is_some_and(|marks| mark_is_set(marks.get(mark)));
    }

    let (start, end) = selection.edges();
    // Leaves the range only touches at their boundary don't count.
    let marked = |node: &Node, path: &Path| {
        let Some(text) = node.as_text() else {
            return false;
        };
        text.has_mark(mark)
            || (*path == start.path && start.offset == text.len())
            || (*path == end.path && end.offset == 0)
    };
    let options = NodesOptions::new().matching(marked).universal();
    !editor.nodes(&options).is_empty()
}

pub fn toggle_mark(editor: &mut Editor, mark: &str) -> Result<()> {
    if is_mark_active(editor, mark) {
        editor.remove_mark(mark)
    } else {
        editor.add_mark(mark, true)
    }
}

/// Whether any node in the selection has type `kind`
pub fn is_block_active(editor: &Editor, kind: &ElementType) -> bool {
    if editor.selection().is_none() {
        return false;
    }
    let options = NodesOptions::new().matching(matches::kind(kind));
    !editor.nodes(&options).is_empty()
}

/// Switch the selected blocks to `kind`, or back to paragraphs if `kind` is
/// already active. List types wrap the blocks as items of a new list; any
/// list around the selection is unwrapped first.
pub fn toggle_block(editor: &mut Editor, kind: &ElementType) -> Result<()> {
    if *kind == ElementType::Code {
        return toggle_code_block(editor);
    }

    let active = is_block_active(editor, kind);
    let is_list = kind.is_list();
    editor.change(|ed| {
        ed.unwrap_nodes(NodesOptions::new().matching(matches::list).split())?;

        let new_kind = if active {
            ElementType::Paragraph
        } else if is_list {
            ElementType::ListItem
        } else {
            kind.clone()
        };
        ed.set_nodes(type_props(&new_kind), NodesOptions::new())?;

        if !active && is_list {
            ed.wrap_nodes(Node::element(kind.clone(), Vec::new()), NodesOptions::new())?;
        }
        Ok(())
    })
}

/// Turn the selected blocks into code, or all of them back into paragraphs
/// when any is already code.
pub fn toggle_code_block(editor: &mut Editor) -> Result<()> {
    let kind = if is_block_active(editor, &ElementType::Code) {
        ElementType::Paragraph
    } else {
        ElementType::Code
    };
    editor.set_nodes(type_props(&kind), NodesOptions::new().matching(matches::block))
}

fn type_props(kind: &ElementType) -> Props {
    Props::from([("type".to_string(), Value::String(kind.as_str().to_string()))])
}
