//! Structural invariants restored after every change:
//!
//! - the root always has at least one block, and only blocks
//! - an element never has zero children
//! - an element's children are either all elements or all text, decided by
//!   its first child
//! - adjacent text leaves with the same marks are merged, and empty leaves
//!   next to leaves they cannot merge with are dropped
//!
//! Each fix is expressed as operations so the selection and history see it.

use super::Editor;
use crate::error::{EditorError, Result};
use crate::model::{ElementType, Node, Path};
use crate::operation::Operation;

impl Editor {
    pub fn normalize(&mut self) -> Result<()> {
        let limit = (count_nodes(&self.children) + 1) * self.config.normalize_iterations_per_node;
        let mut fixes = 0;

        while let Some(ops) = self.next_fix() {
            if fixes >= limit {
                return Err(EditorError::NormalizeLimit(limit));
            }
            for op in ops {
                self.apply(op)?;
            }
            fixes += 1;
        }

        if fixes > 0 {
            tracing::debug!(fixes, "normalized document");
        }
        Ok(())
    }

    fn next_fix(&self) -> Option<Vec<Operation>> {
        let default_block = &self.config.default_block;
        if self.children.is_empty() {
            return Some(vec![Operation::InsertNode {
                path: Path::from([0]),
                node: Node::element(default_block.clone(), vec![Node::text("")]),
            }]);
        }
        find_fix(&self.children, &Path::root(), true, default_block)
    }
}

fn count_nodes(nodes: &[Node]) -> usize {
    nodes.iter().map(|node| 1 + count_nodes(node.children())).sum()
}

fn find_fix(
    children: &[Node],
    parent: &Path,
    wants_elements: bool,
    default_block: &ElementType,
) -> Option<Vec<Operation>> {
    for (index, child) in children.iter().enumerate() {
        let path = parent.child(index);
        match child {
            Node::Text(_) if wants_elements => {
                return Some(vec![
                    Operation::RemoveNode {
                        path: path.clone(),
                        node: child.clone(),
                    },
                    Operation::InsertNode {
                        path,
                        node: Node::element(default_block.clone(), vec![child.clone()]),
                    },
                ]);
            }
            Node::Element(_) if !wants_elements => {
                return Some(vec![Operation::RemoveNode {
                    path,
                    node: child.clone(),
                }]);
            }
            Node::Text(text) => {
                let Some(Node::Text(prev)) = index.checked_sub(1).map(|i| &children[i]) else {
                    continue;
                };
                if prev.marks_equal(text) {
                    return Some(vec![Operation::MergeNode {
                        path,
                        position: prev.len(),
                        properties: text.marks.clone(),
                    }]);
                }
                if prev.is_empty() {
                    return Some(vec![Operation::RemoveNode {
                        path: parent.child(index - 1),
                        node: Node::Text(prev.clone()),
                    }]);
                }
                if text.is_empty() {
                    return Some(vec![Operation::RemoveNode {
                        path,
                        node: child.clone(),
                    }]);
                }
            }
            Node::Element(element) => {
                if element.children.is_empty() {
                    return Some(vec![Operation::InsertNode {
                        path: path.child(0),
                        node: Node::text(""),
                    }]);
                }
                let wants_elements = matches!(element.children.first(), Some(Node::Element(_)));
                if let Some(fix) = find_fix(&element.children, &path, wants_elements, default_block) {
                    return Some(fix);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::editor::tests::{caret, editor};
    use crate::model::{mark, Text};

    fn bold(text: &str) -> Node {
        Node::Text(Text::new(text).with_mark(mark::BOLD, true))
    }

    fn normalized(children: Vec<Node>) -> Vec<Node> {
        Editor::with_value(children, EditorConfig::default())
            .unwrap()
            .children()
            .to_vec()
    }

    #[test]
    fn test_empty_element_gets_text() {
        let value = normalized(vec![Node::element(ElementType::Code, Vec::new())]);
        assert_eq!(value, vec![Node::element(ElementType::Code, vec![Node::text("")])]);
    }

    #[test]
    fn test_text_at_root_is_wrapped() {
        let value = normalized(vec![Node::text("loose"), Node::paragraph("kept")]);
        assert_eq!(value, vec![Node::paragraph("loose"), Node::paragraph("kept")]);
    }

    #[test]
    fn test_mixed_children_follow_first_child() {
        let value = normalized(vec![Node::element(
            ElementType::Paragraph,
            vec![Node::text("a"), Node::paragraph("nested"), Node::text("b")],
        )]);
        assert_eq!(value, vec![Node::paragraph("ab")]);

        let value = normalized(vec![Node::element(
            ElementType::BulletedList,
            vec![Node::element(ElementType::ListItem, vec![Node::text("one")]), Node::text("two")],
        )]);
        assert_eq!(
            value[0].children()[1],
            Node::element(ElementType::Paragraph, vec![Node::text("two")])
        );
    }

    #[test]
    fn test_adjacent_texts_merge_and_empties_drop() {
        let value = normalized(vec![Node::element(
            ElementType::Paragraph,
            vec![Node::text("a"), Node::text("b"), bold(""), bold("c"), Node::text("")],
        )]);
        assert_eq!(value[0].children(), &[Node::text("ab"), bold("c")]);
    }

    #[test]
    fn test_selection_survives_merge() {
        let mut ed = editor(
            vec![Node::element(ElementType::Paragraph, vec![Node::text("ab"), bold("cd")])],
            caret(&[0, 1], 1),
        );
        ed.change(|ed| {
            ed.apply(Operation::SetNode {
                path: Path::from([0, 1]),
                properties: crate::model::Props::from([(mark::BOLD.to_string(), serde_json::json!(true))]),
                new_properties: crate::model::Props::new(),
            })
        })
        .unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("abcd")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 3)));
    }

    #[test]
    fn test_iteration_limit() {
        let config = EditorConfig {
            normalize_iterations_per_node: 0,
            ..EditorConfig::default()
        };
        let result = Editor::with_value(Vec::new(), config);
        assert!(matches!(result, Err(EditorError::NormalizeLimit(0))));
    }
}
