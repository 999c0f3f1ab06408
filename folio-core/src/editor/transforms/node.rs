use std::cmp::Ordering;

use serde_json::Value;

use crate::editor::{matches, Editor, Location, Mode, NodesOptions};
use crate::error::{EditorError, Result};
use crate::model::{Affinity, Node, Path, Point, Props, Range};
use crate::operation::Operation;

impl Editor {
    /// Insert `nodes` at `at`. Without a location they go in at the
    /// selection, which then moves to the end of the inserted content.
    /// Blocks inserted inside a block split it; text inserted inside a leaf
    /// splits the leaf.
    pub fn insert_nodes(&mut self, nodes: Vec<Node>, at: Option<Location>) -> Result<()> {
        self.change(|ed| {
            let select = at.is_none();
            let Some(at) = at.or_else(|| ed.selection.clone().map(Location::Range)) else {
                return Ok(());
            };
            ed.insert_nodes_at(nodes, at, select)
        })
    }

    pub(crate) fn insert_nodes_at(&mut self, nodes: Vec<Node>, at: Location, select: bool) -> Result<()> {
        let Some(first) = nodes.first() else {
            return Ok(());
        };
        let inline = first.is_text();

        let path = match at {
            Location::Path(path) => path,
            Location::Point(point) => self.insertion_path(point, inline)?,
            Location::Range(range) => {
                let point = if range.is_expanded() {
                    self.delete_range(&range, false)?
                } else {
                    range.anchor
                };
                self.insertion_path(point, inline)?
            }
        };

        let (Some(parent), Some(index)) = (path.parent(), path.index()) else {
            return Err(EditorError::InvalidPath(path));
        };
        let mut last = path.clone();
        for (offset, node) in nodes.into_iter().enumerate() {
            last = parent.child(index + offset);
            self.apply(Operation::InsertNode {
                path: last.clone(),
                node,
            })?;
        }

        if select {
            if let Ok(end) = self.end(&Location::Path(last)) {
                self.set_selection(Some(Range::collapsed(end)))?;
            }
        }
        Ok(())
    }

    /// Where content inserted at `point` should go, splitting the enclosing
    /// leaf or block when the point is in its middle.
    fn insertion_path(&mut self, point: Point, inline: bool) -> Result<Path> {
        let matcher: fn(&Node, &Path) -> bool = if inline { matches::text } else { matches::block };
        let target = self
            .nodes_at(&Location::Point(point.clone()), &matcher, Mode::Lowest, false, false)
            .into_iter()
            .next()
            .map(|(_, path)| path)
            .ok_or_else(|| EditorError::InvalidPath(point.path.clone()))?;

        if self.is_start(&point, &target) && !self.is_end(&point, &target) {
            return Ok(target);
        }
        self.split_nodes_at(point, &matcher, Mode::Lowest, false)?;
        Ok(target.next())
    }

    pub fn remove_nodes(&mut self, options: NodesOptions<'_>) -> Result<()> {
        self.change(|ed| {
            let Some(at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            let paths = ed.target_paths(&at, &options);
            let mark = ed.op_mark();
            for path in paths.into_iter().rev() {
                if let Some(path) = path.transform_all(ed.ops_since(mark)) {
                    ed.remove_node(&path)?;
                }
            }
            Ok(())
        })
    }

    /// Set properties on the matching nodes. A `null` value unsets the key.
    /// With `split`, nodes are first split at the edges of the range so only
    /// the covered part changes.
    pub fn set_nodes(&mut self, props: Props, options: NodesOptions<'_>) -> Result<()> {
        self.change(|ed| {
            let Some(mut at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            if options.split {
                if let Location::Range(range) = &at {
                    match ed.split_range_edges(range, &options)? {
                        Some(range) => at = Location::Range(range),
                        None => return Ok(()),
                    }
                }
            }

            let mut updates = Vec::new();
            for path in ed.target_paths(&at, &options) {
                let node = ed.node(&path)?;
                let mut properties = Props::new();
                let mut new_properties = Props::new();
                for (key, value) in &props {
                    if key == "children" || key == "text" {
                        continue;
                    }
                    let old = node.prop(key);
                    if value.is_null() {
                        if let Some(old) = old {
                            properties.insert(key.clone(), old);
                        }
                    } else if old.as_ref() != Some(value) {
                        if let Some(old) = old {
                            properties.insert(key.clone(), old);
                        }
                        new_properties.insert(key.clone(), value.clone());
                    }
                }
                if !properties.is_empty() || !new_properties.is_empty() {
                    updates.push(Operation::SetNode {
                        path,
                        properties,
                        new_properties,
                    });
                }
            }

            for op in updates {
                ed.apply(op)?;
            }
            Ok(())
        })
    }

    pub fn unset_nodes(&mut self, keys: &[&str], options: NodesOptions<'_>) -> Result<()> {
        let props = keys.iter().map(|key| (key.to_string(), Value::Null)).collect();
        self.set_nodes(props, options)
    }

    /// Split nodes at a point, from the leaf up to the highest matching
    /// ancestor. Splits at the very start or end of a node are skipped
    /// unless `always` is set. A path location splits its parent so the node
    /// at that path starts a new sibling.
    pub fn split_nodes(&mut self, options: NodesOptions<'_>, always: bool) -> Result<()> {
        self.change(|ed| {
            let Some(at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            let point = match at {
                Location::Path(path) => return ed.split_parent_before(&path),
                Location::Point(point) => point,
                Location::Range(range) if range.is_expanded() => ed.delete_range(&range, false)?,
                Location::Range(range) => range.anchor,
            };
            let matcher: &dyn Fn(&Node, &Path) -> bool = match options.matcher.as_deref() {
                Some(matcher) => matcher,
                None => &matches::block,
            };
            ed.split_nodes_at(point, matcher, options.mode.unwrap_or(Mode::Lowest), always)
        })
    }

    pub(crate) fn split_nodes_at(
        &mut self,
        at: Point,
        matcher: &dyn Fn(&Node, &Path) -> bool,
        mode: Mode,
        always: bool,
    ) -> Result<()> {
        let highest = self
            .nodes_at(&Location::Point(at.clone()), matcher, mode, false, false)
            .into_iter()
            .next()
            .map(|(_, path)| path);
        let Some(highest) = highest else {
            return Ok(());
        };

        // Follows the split point, staying in the left half of each split.
        let mut point = at.clone();
        let mut position = at.offset;

        for path in at.path.levels().into_iter().rev() {
            if path.len() < highest.len() || path.is_root() {
                break;
            }
            let is_end = self.is_end(&point, &path);
            let mut split = false;
            if always || !self.is_edge(&point, &path) {
                split = true;
                let op = Operation::SplitNode {
                    path: path.clone(),
                    position,
                    properties: self.node(&path)?.props(),
                };
                self.apply(op.clone())?;
                if let Some(moved) = point.transform(&op, Some(Affinity::Backward)) {
                    point = moved;
                }
            }
            position = path.index().unwrap_or(0) + usize::from(split || is_end);
        }
        Ok(())
    }

    fn split_parent_before(&mut self, path: &Path) -> Result<()> {
        let (Some(parent), Some(index)) = (path.parent(), path.index()) else {
            return Err(EditorError::InvalidPath(path.clone()));
        };
        if parent.is_root() {
            return Err(EditorError::InvalidPath(path.clone()));
        }
        let properties = self.node(&parent)?.props();
        self.apply(Operation::SplitNode {
            path: parent,
            position: index,
            properties,
        })
    }

    /// Merge the node at `at` into its previous sibling
    pub fn merge_nodes(&mut self, at: &Path) -> Result<()> {
        self.change(|ed| ed.merge_into_previous(at))
    }

    fn merge_into_previous(&mut self, path: &Path) -> Result<()> {
        let prev_path = path.previous().ok_or_else(|| EditorError::CannotMerge(path.clone()))?;
        let node = self.node(path)?;
        let position = match (self.node(&prev_path)?, node) {
            (Node::Text(prev), Node::Text(_)) => prev.len(),
            (Node::Element(prev), Node::Element(_)) => prev.children.len(),
            _ => return Err(EditorError::CannotMerge(path.clone())),
        };
        let properties = node.props();
        self.apply(Operation::MergeNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    /// Join the text block at `path` onto the end of the text block before
    /// it, wherever that is in the tree. Ancestors left empty by the move are
    /// removed, and an empty previous block is dropped instead of merged into.
    pub(crate) fn merge_with_previous_block(&mut self, path: &Path) -> Result<()> {
        let prev_path = self
            .text_blocks()
            .into_iter()
            .take_while(|block| block.compare(path) == Ordering::Less)
            .last();
        let Some(prev_path) = prev_path else {
            return Ok(());
        };

        let common = path.common(&prev_path);
        let empty_ancestor = path
            .ancestors()
            .into_iter()
            .filter(|ancestor| !ancestor.is_root() && ancestor.len() >= common.len())
            .find(|ancestor| self.node(ancestor).is_ok_and(single_child_nest));

        let node = self.node(path)?;
        let prev = self.node(&prev_path)?;
        let position = prev.children().len();
        let properties = node.props();
        let prev_is_empty = matches!(prev.children(), [Node::Text(text)] if text.is_empty());

        let mark = self.op_mark();
        let new_path = prev_path.next();
        if !path.is_sibling(&prev_path) {
            self.apply(Operation::MoveNode {
                path: path.clone(),
                new_path: new_path.clone(),
            })?;
        }
        if let Some(empty) = empty_ancestor.and_then(|empty| empty.transform_all(self.ops_since(mark))) {
            self.remove_node(&empty)?;
        }

        if prev_is_empty {
            self.remove_node(&prev_path)
        } else {
            self.apply(Operation::MergeNode {
                path: new_path,
                position,
                properties,
            })
        }
    }

    /// Move the matching nodes so the first lands at `to`, the rest after it.
    pub fn move_nodes(&mut self, options: NodesOptions<'_>, to: Path) -> Result<()> {
        self.change(|ed| {
            let Some(at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            let paths = ed.target_paths(&at, &options);
            ed.move_paths(paths, to)
        })
    }

    fn move_paths(&mut self, paths: Vec<Path>, mut to: Path) -> Result<()> {
        let mark = self.op_mark();
        for path in paths {
            let Some(path) = path.transform_all(self.ops_since(mark)) else {
                continue;
            };
            if path.is_root() {
                continue;
            }
            let new_path = to.clone();
            let op = Operation::MoveNode {
                path: path.clone(),
                new_path: new_path.clone(),
            };
            self.apply(op.clone())?;
            to = to.transform(&op).ok_or_else(|| EditorError::InvalidPath(new_path.clone()))?;
            if new_path.is_sibling(&path) && new_path.is_after(&path) {
                to = to.next();
            }
        }
        Ok(())
    }

    /// Wrap the matching nodes in `element` (its children are ignored). The
    /// wrapper goes where the matches' common parent held them.
    pub fn wrap_nodes(&mut self, element: Node, options: NodesOptions<'_>) -> Result<()> {
        let Node::Element(mut wrapper) = element else {
            return Err(EditorError::NodeKind {
                path: Path::root(),
                expected: "an element",
            });
        };
        wrapper.children.clear();

        self.change(|ed| {
            let Some(mut at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            if options.split {
                if let Location::Range(range) = &at {
                    if let Some(range) = ed.split_range_edges(range, &options)? {
                        at = Location::Range(range);
                    }
                }
            }

            let paths = ed.target_paths(&at, &options);
            let (Some(first), Some(last)) = (paths.first(), paths.last()) else {
                return Ok(());
            };
            let common = if first == last {
                first.parent().unwrap_or_else(Path::root)
            } else {
                first.common(last)
            };
            let range = Range::new(
                ed.start(&Location::Path(first.clone()))?,
                ed.end(&Location::Path(last.clone()))?,
            );
            let depth = common.len() + 1;
            let wrapper_path = last
                .get(..depth)
                .map(|indices| Path::new(indices.to_vec()).next())
                .ok_or_else(|| EditorError::InvalidPath(last.clone()))?;

            ed.apply(Operation::InsertNode {
                path: wrapper_path.clone(),
                node: Node::Element(wrapper),
            })?;

            let in_common = |_: &Node, path: &Path| path.parent().as_ref() == Some(&common);
            let children: Vec<Path> = ed
                .nodes_at(&Location::Range(range), &in_common, Mode::All, false, false)
                .into_iter()
                .map(|(_, path)| path)
                .collect();
            ed.move_paths(children, wrapper_path.child(0))
        })
    }

    /// Replace each matching node by its children. With `split`, only the
    /// children inside the range are lifted out.
    pub fn unwrap_nodes(&mut self, options: NodesOptions<'_>) -> Result<()> {
        self.change(|ed| {
            let Some(at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            let paths = ed.target_paths(&at, &options);
            let span = match &at {
                Location::Path(path) => Some(ed.range_of(path)?),
                Location::Range(range) => Some(range.clone()),
                Location::Point(_) => None,
            };

            let mark = ed.op_mark();
            for path in paths.into_iter().rev() {
                let Some(path) = path.transform_all(ed.ops_since(mark)) else {
                    continue;
                };
                let mut range = ed.range_of(&path)?;
                if options.split {
                    let current = span.as_ref().and_then(|span| transform_range(span, ed.ops_since(mark)));
                    if let Some(inside) = current.and_then(|current| current.intersection(&range)) {
                        range = inside;
                    }
                }
                let child_of_path = |_: &Node, candidate: &Path| candidate.parent().as_ref() == Some(&path);
                let children: Vec<Path> = ed
                    .nodes_at(&Location::Range(range), &child_of_path, Mode::Lowest, false, false)
                    .into_iter()
                    .map(|(_, path)| path)
                    .collect();
                ed.lift_paths(children)?;
            }
            Ok(())
        })
    }

    /// Move each matching node up one level, splitting its parent when the
    /// node sits in the middle. A parent left empty is removed.
    pub fn lift_nodes(&mut self, options: NodesOptions<'_>) -> Result<()> {
        self.change(|ed| {
            let Some(at) = ed.resolve_at(&options) else {
                return Ok(());
            };
            let paths = ed.target_paths(&at, &options);
            ed.lift_paths(paths)
        })
    }

    fn lift_paths(&mut self, paths: Vec<Path>) -> Result<()> {
        let mark = self.op_mark();
        for path in paths {
            let Some(path) = path.transform_all(self.ops_since(mark)) else {
                continue;
            };
            let parent_path = match path.parent() {
                Some(parent) if !parent.is_root() => parent,
                _ => return Err(EditorError::CannotLift(path)),
            };
            let index = path.index().unwrap_or(0);
            let parent = self.node(&parent_path)?;
            let length = parent.children().len();
            let after_parent = parent_path.next();

            if length == 1 {
                self.move_node(&path, after_parent)?;
                self.remove_node(&parent_path)?;
            } else if index == 0 {
                self.move_node(&path, parent_path)?;
            } else if index == length - 1 {
                self.move_node(&path, after_parent)?;
            } else {
                let properties = parent.props();
                self.apply(Operation::SplitNode {
                    path: parent_path,
                    position: index + 1,
                    properties,
                })?;
                self.move_node(&path, after_parent)?;
            }
        }
        Ok(())
    }

    fn move_node(&mut self, path: &Path, new_path: Path) -> Result<()> {
        self.apply(Operation::MoveNode {
            path: path.clone(),
            new_path,
        })
    }

    pub(crate) fn remove_node(&mut self, path: &Path) -> Result<()> {
        let node = self.node(path)?.clone();
        self.apply(Operation::RemoveNode {
            path: path.clone(),
            node,
        })
    }

    pub(crate) fn resolve_at(&self, options: &NodesOptions<'_>) -> Option<Location> {
        options
            .at
            .clone()
            .or_else(|| self.selection.clone().map(Location::Range))
    }

    /// Paths a node transform acts on. Without a matcher a path location
    /// targets exactly that node and anything else targets blocks.
    fn target_paths(&self, at: &Location, options: &NodesOptions<'_>) -> Vec<Path> {
        let at_path = |_: &Node, path: &Path| matches!(at, Location::Path(target) if target == path);
        let matcher: &dyn Fn(&Node, &Path) -> bool = match (options.matcher.as_deref(), at) {
            (Some(matcher), _) => matcher,
            (None, Location::Path(_)) => &at_path,
            (None, _) => &matches::block,
        };
        let mode = options.mode.unwrap_or(Mode::Lowest);
        self.nodes_at(at, matcher, mode, options.universal, options.reverse)
            .into_iter()
            .map(|(_, path)| path)
            .collect()
    }

    /// Split the matching nodes at both edges of `range` and return the range
    /// mapped onto the split tree. `None` means there is nothing to act on: a
    /// caret inside a non-empty leaf.
    fn split_range_edges(&mut self, range: &Range, options: &NodesOptions<'_>) -> Result<Option<Range>> {
        if range.is_collapsed() && !self.leaf(&range.anchor.path)?.is_empty() {
            return Ok(None);
        }
        let matcher: &dyn Fn(&Node, &Path) -> bool = match options.matcher.as_deref() {
            Some(matcher) => matcher,
            None => &matches::block,
        };
        let mode = match options.mode.unwrap_or(Mode::Lowest) {
            Mode::Lowest => Mode::Lowest,
            _ => Mode::Highest,
        };

        let mark = self.op_mark();
        let (start, end) = range.edges();
        let end_at_end = self.is_end(&end, &end.path);
        self.split_nodes_at(end, matcher, mode, !end_at_end)?;
        let start_at_start = self.is_start(&start, &start.path);
        self.split_nodes_at(start, matcher, mode, !start_at_start)?;

        transform_range(range, self.ops_since(mark))
            .map(Some)
            .ok_or_else(|| EditorError::InvalidPath(range.anchor.path.clone()))
    }
}

fn transform_range(range: &Range, ops: &[Operation]) -> Option<Range> {
    ops.iter().try_fold(range.clone(), |range, op| range.transform(op))
}

/// Whether removing the innermost node below `node` would leave it empty
fn single_child_nest(node: &Node) -> bool {
    match node {
        Node::Element(element) => match element.children.as_slice() {
            [only] => single_child_nest(only),
            _ => false,
        },
        Node::Text(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::{caret, editor, range};
    use crate::model::{mark, ElementType, Text};
    use serde_json::json;

    fn item(text: &str) -> Node {
        Node::element(ElementType::ListItem, vec![Node::text(text)])
    }

    fn list(kind: ElementType, items: &[&str]) -> Node {
        Node::element(kind, items.iter().map(|text| item(text)).collect())
    }

    fn kinds(ed: &Editor) -> Vec<ElementType> {
        ed.children().iter().filter_map(|node| node.kind().cloned()).collect()
    }

    #[test]
    fn test_set_nodes_on_lowest_blocks() {
        let mut ed = editor(
            vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("c")],
            range((&[0, 0], 0), (&[1, 0], 1)),
        );
        let props = Props::from([("type".to_string(), json!("code"))]);
        ed.set_nodes(props, NodesOptions::new()).unwrap();
        assert_eq!(kinds(&ed), vec![ElementType::Code, ElementType::Code, ElementType::Paragraph]);

        assert!(ed.undo().unwrap());
        assert_eq!(kinds(&ed), vec![ElementType::Paragraph; 3]);
    }

    #[test]
    fn test_set_nodes_with_split_marks_only_the_range() {
        let mut ed = editor(vec![Node::paragraph("hello world")], range((&[0, 0], 6), (&[0, 0], 11)));
        let props = Props::from([(mark::BOLD.to_string(), json!(true))]);
        ed.set_nodes(props, NodesOptions::new().matching(matches::text).split())
            .unwrap();

        let leaves = ed.children()[0].children();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0], Node::text("hello "));
        assert_eq!(leaves[1], Node::Text(Text::new("world").with_mark(mark::BOLD, true)));
        assert_eq!(ed.selection(), Some(&range((&[0, 1], 0), (&[0, 1], 5))));
    }

    #[test]
    fn test_unset_nodes_merges_leaves_back() {
        let mut ed = editor(
            vec![Node::element(
                ElementType::Paragraph,
                vec![Node::text("ab"), Node::Text(Text::new("cd").with_mark(mark::BOLD, true))],
            )],
            range((&[0, 1], 0), (&[0, 1], 2)),
        );
        ed.unset_nodes(&[mark::BOLD], NodesOptions::new().matching(matches::text).split())
            .unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("abcd")]);
    }

    #[test]
    fn test_insert_nodes_splits_block() {
        let mut ed = editor(vec![Node::paragraph("onetwo")], caret(&[0, 0], 3));
        ed.insert_nodes(vec![Node::element(ElementType::Code, vec![Node::text("x")])], None)
            .unwrap();
        assert_eq!(kinds(&ed), vec![ElementType::Paragraph, ElementType::Code, ElementType::Paragraph]);
        assert_eq!(ed.children()[0].string(), "one");
        assert_eq!(ed.children()[2].string(), "two");
        assert_eq!(ed.selection(), Some(&caret(&[1, 0], 1)));
    }

    #[test]
    fn test_insert_nodes_at_path() {
        let mut ed = editor(vec![Node::paragraph("a")], caret(&[0, 0], 0));
        ed.insert_nodes(vec![Node::paragraph("b")], Some(Location::Path(Path::from([1]))))
            .unwrap();
        assert_eq!(ed.children().len(), 2);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 0)));
    }

    #[test]
    fn test_remove_nodes() {
        let mut ed = editor(
            vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("c")],
            range((&[0, 0], 0), (&[1, 0], 1)),
        );
        ed.remove_nodes(NodesOptions::new()).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("c")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 0)));
    }

    #[test]
    fn test_split_nodes_at_caret() {
        let mut ed = editor(vec![Node::paragraph("abcd")], caret(&[0, 0], 2));
        ed.split_nodes(NodesOptions::new(), false).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("ab"), Node::paragraph("cd")]);
        assert_eq!(ed.selection(), Some(&caret(&[1, 0], 0)));

        // At the end of a block nothing is split unless forced
        let mut ed = editor(vec![Node::paragraph("ab")], caret(&[0, 0], 2));
        ed.split_nodes(NodesOptions::new(), false).unwrap();
        assert_eq!(ed.children().len(), 1);
        ed.split_nodes(NodesOptions::new(), true).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("ab"), Node::paragraph("")]);
    }

    #[test]
    fn test_merge_nodes() {
        let mut ed = editor(vec![Node::paragraph("ab"), Node::paragraph("cd")], caret(&[1, 0], 1));
        ed.merge_nodes(&Path::from([1])).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("abcd")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 3)));
        assert!(ed.merge_nodes(&Path::from([0])).is_err());
    }

    #[test]
    fn test_merge_with_previous_block_across_levels() {
        let mut ed = editor(
            vec![Node::paragraph("intro"), list(ElementType::BulletedList, &["only"])],
            caret(&[1, 0, 0], 0),
        );
        ed.change(|ed| ed.merge_with_previous_block(&Path::from([1, 0]))).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("introonly")]);
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 5)));
    }

    #[test]
    fn test_merge_into_empty_block_keeps_current_type() {
        let mut ed = editor(
            vec![Node::element(ElementType::Code, vec![Node::text("")]), Node::paragraph("text")],
            caret(&[1, 0], 0),
        );
        ed.change(|ed| ed.merge_with_previous_block(&Path::from([1]))).unwrap();
        assert_eq!(ed.children(), &[Node::paragraph("text")]);
    }

    #[test]
    fn test_move_nodes() {
        let mut ed = editor(
            vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("c")],
            caret(&[0, 0], 0),
        );
        ed.move_nodes(NodesOptions::new().at(Path::from([0])), Path::from([2]))
            .unwrap();
        let strings: Vec<String> = ed.children().iter().map(Node::string).collect();
        assert_eq!(strings, ["b", "c", "a"]);
        assert_eq!(ed.selection(), Some(&caret(&[2, 0], 0)));
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let mut ed = editor(
            vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("c")],
            range((&[0, 0], 0), (&[1, 0], 1)),
        );
        ed.wrap_nodes(Node::element(ElementType::BulletedList, Vec::new()), NodesOptions::new())
            .unwrap();
        assert_eq!(kinds(&ed), vec![ElementType::BulletedList, ElementType::Paragraph]);
        assert_eq!(ed.children()[0].children().len(), 2);
        assert_eq!(ed.selection(), Some(&range((&[0, 0, 0], 0), (&[0, 1, 0], 1))));

        // Wrapping kept the paragraphs as they were, so unwrapping gives them back
        ed.unwrap_nodes(NodesOptions::new().matching(matches::list)).unwrap();
        assert_eq!(kinds(&ed), vec![ElementType::Paragraph; 3]);
        assert_eq!(ed.selection(), Some(&range((&[0, 0], 0), (&[1, 0], 1))));
    }

    #[test]
    fn test_unwrap_with_split_lifts_only_selected_items() {
        let mut ed = editor(
            vec![list(ElementType::BulletedList, &["a", "b", "c"])],
            caret(&[0, 1, 0], 0),
        );
        ed.unwrap_nodes(NodesOptions::new().matching(matches::list).split())
            .unwrap();
        assert_eq!(
            kinds(&ed),
            vec![ElementType::BulletedList, ElementType::ListItem, ElementType::BulletedList]
        );
        assert_eq!(ed.children()[1].string(), "b");
        assert_eq!(ed.selection(), Some(&caret(&[1, 0], 0)));
    }

    #[test]
    fn test_lift_nodes() {
        let mut ed = editor(
            vec![list(ElementType::NumberedList, &["a", "b"])],
            caret(&[0, 0, 0], 0),
        );
        ed.lift_nodes(NodesOptions::new().at(Path::from([0, 1]))).unwrap();
        assert_eq!(kinds(&ed), vec![ElementType::NumberedList, ElementType::ListItem]);

        let mut ed = editor(vec![Node::paragraph("top")], caret(&[0, 0], 0));
        assert!(matches!(
            ed.lift_nodes(NodesOptions::new().at(Path::from([0]))),
            Err(EditorError::CannotLift(_))
        ));
    }
}
