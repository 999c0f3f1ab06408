use std::cmp::Ordering;

use super::Editor;
use crate::error::{EditorError, Result};
use crate::model::node::children_at;
use crate::model::{node_at, Marks, Node, Path, Point, Range, Text};

/// A node together with where it lives
pub type NodeEntry<'a> = (&'a Node, Path);

/// Node predicate used by queries and transforms
pub type Matcher<'a> = Box<dyn Fn(&Node, &Path) -> bool + 'a>;

/// Which matches a query reports along a single branch of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every matching node
    #[default]
    All,
    /// Only the outermost match; its descendants are skipped
    Highest,
    /// Only the innermost match
    Lowest,
}

/// Somewhere in the document: a whole node, a caret position, or a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(Path),
    Point(Point),
    Range(Range),
}

impl From<Path> for Location {
    fn from(path: Path) -> Self {
        Location::Path(path)
    }
}

impl From<Point> for Location {
    fn from(point: Point) -> Self {
        Location::Point(point)
    }
}

impl From<Range> for Location {
    fn from(range: Range) -> Self {
        Location::Range(range)
    }
}

/// Options shared by [`Editor::nodes`] and the node transforms.
#[derive(Default)]
pub struct NodesOptions<'a> {
    /// Where to look; defaults to the selection
    pub at: Option<Location>,
    pub matcher: Option<Matcher<'a>>,
    /// Unset means `All` for queries and `Lowest` for transforms
    pub mode: Option<Mode>,
    /// Only report matches if every text leaf in `at` is inside one
    pub universal: bool,
    pub reverse: bool,
    /// For transforms: split nodes at the edges of a range first
    pub split: bool,
}

impl<'a> NodesOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, at: impl Into<Location>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn matching(mut self, matcher: impl Fn(&Node, &Path) -> bool + 'a) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn universal(mut self) -> Self {
        self.universal = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn split(mut self) -> Self {
        self.split = true;
        self
    }
}

/// Common predicates
pub mod matches {
    use crate::model::{ElementType, Node, Path};

    pub fn text(node: &Node, _: &Path) -> bool {
        node.is_text()
    }

    pub fn block(node: &Node, _: &Path) -> bool {
        node.is_element()
    }

    /// An element holding text leaves (paragraph, code, list item)
    pub fn text_block(node: &Node, _: &Path) -> bool {
        match node {
            Node::Element(element) => !matches!(element.children.first(), Some(Node::Element(_))),
            Node::Text(_) => false,
        }
    }

    pub fn list(node: &Node, _: &Path) -> bool {
        node.kind().is_some_and(ElementType::is_list)
    }

    pub fn kind(kind: &ElementType) -> impl Fn(&Node, &Path) -> bool + '_ {
        move |node: &Node, _: &Path| node.kind() == Some(kind)
    }
}

impl Editor {
    pub fn node(&self, path: &Path) -> Result<&Node> {
        node_at(&self.children, path).ok_or_else(|| EditorError::InvalidPath(path.clone()))
    }

    pub fn has_node(&self, path: &Path) -> bool {
        node_at(&self.children, path).is_some()
    }

    pub fn leaf(&self, path: &Path) -> Result<&Text> {
        match self.node(path)? {
            Node::Text(text) => Ok(text),
            Node::Element(_) => Err(EditorError::NodeKind {
                path: path.clone(),
                expected: "a text node",
            }),
        }
    }

    /// Children of the node at `path`; the root path gives the top-level blocks
    pub fn children_of(&self, path: &Path) -> Result<&[Node]> {
        children_at(&self.children, path).ok_or_else(|| EditorError::InvalidPath(path.clone()))
    }

    /// Every text leaf in document order
    pub fn texts(&self) -> Vec<(&Text, Path)> {
        let mut out = Vec::new();
        collect_all(&self.children, &Path::root(), &mut out);
        out.into_iter()
            .filter_map(|(node, path)| node.as_text().map(|text| (text, path)))
            .collect()
    }

    /// Paths of the blocks that directly hold text, in document order
    pub fn text_blocks(&self) -> Vec<Path> {
        let mut out = Vec::new();
        collect_all(&self.children, &Path::root(), &mut out);
        out.into_iter()
            .filter(|(node, path)| matches::text_block(node, path))
            .map(|(_, path)| path)
            .collect()
    }

    /// First text leaf at or below `path`
    pub fn first(&self, path: &Path) -> Result<(&Text, Path)> {
        self.edge_leaf(path, false)
    }

    /// Last text leaf at or below `path`
    pub fn last(&self, path: &Path) -> Result<(&Text, Path)> {
        self.edge_leaf(path, true)
    }

    fn edge_leaf(&self, path: &Path, last: bool) -> Result<(&Text, Path)> {
        let mut current = path.clone();
        let mut node = if path.is_root() {
            let first = if last { self.children.len().checked_sub(1) } else { Some(0) };
            let index = first.filter(|&i| i < self.children.len());
            let index = index.ok_or_else(|| EditorError::InvalidPath(path.clone()))?;
            current = current.child(index);
            &self.children[index]
        } else {
            self.node(path)?
        };
        loop {
            match node {
                Node::Text(text) => return Ok((text, current)),
                Node::Element(element) => {
                    let index = if last { element.children.len().checked_sub(1) } else { Some(0) };
                    let Some(index) = index.filter(|&i| i < element.children.len()) else {
                        return Err(EditorError::NodeKind {
                            path: current,
                            expected: "an element with children",
                        });
                    };
                    current = current.child(index);
                    node = &element.children[index];
                }
            }
        }
    }

    /// Start point of a location
    pub fn start(&self, at: &Location) -> Result<Point> {
        match at {
            Location::Path(path) => {
                let (_, leaf) = self.first(path)?;
                Ok(Point::new(leaf, 0))
            }
            Location::Point(point) => Ok(point.clone()),
            Location::Range(range) => Ok(range.start()),
        }
    }

    /// End point of a location
    pub fn end(&self, at: &Location) -> Result<Point> {
        match at {
            Location::Path(path) => {
                let (text, leaf) = self.last(path)?;
                Ok(Point::new(leaf, text.len()))
            }
            Location::Point(point) => Ok(point.clone()),
            Location::Range(range) => Ok(range.end()),
        }
    }

    /// The range spanning a whole node
    pub fn range_of(&self, path: &Path) -> Result<Range> {
        let at = Location::Path(path.clone());
        Ok(Range::new(self.start(&at)?, self.end(&at)?))
    }

    pub fn edges(&self, at: &Location) -> Result<(Point, Point)> {
        Ok((self.start(at)?, self.end(at)?))
    }

    /// The node containing `path`
    pub fn parent(&self, path: &Path) -> Result<NodeEntry<'_>> {
        let parent = path
            .parent()
            .filter(|parent| !parent.is_root())
            .ok_or_else(|| EditorError::InvalidPath(path.clone()))?;
        Ok((self.node(&parent)?, parent))
    }

    pub fn is_block(&self, node: &Node) -> bool {
        node.is_element()
    }

    pub fn is_text_block(&self, node: &Node) -> bool {
        matches::text_block(node, &Path::root())
    }

    pub fn is_start(&self, point: &Point, path: &Path) -> bool {
        self.start(&Location::Path(path.clone()))
            .is_ok_and(|start| start == *point)
    }

    pub fn is_end(&self, point: &Point, path: &Path) -> bool {
        self.end(&Location::Path(path.clone()))
            .is_ok_and(|end| end == *point)
    }

    pub fn is_edge(&self, point: &Point, path: &Path) -> bool {
        self.is_start(point, path) || self.is_end(point, path)
    }

    /// Nearest proper ancestor of `path` that matches
    pub fn above(&self, path: &Path, matcher: impl Fn(&Node, &Path) -> bool) -> Option<NodeEntry<'_>> {
        path.ancestors()
            .into_iter()
            .rev()
            .filter(|ancestor| !ancestor.is_root())
            .find_map(|ancestor| {
                let node = node_at(&self.children, &ancestor)?;
                matcher(node, &ancestor).then_some((node, ancestor))
            })
    }

    /// The text leaf before the one at `path`, anywhere in the document
    pub fn previous_text(&self, path: &Path) -> Option<(&Text, Path)> {
        self.texts()
            .into_iter()
            .take_while(|(_, p)| p.compare(path) == Ordering::Less)
            .last()
    }

    /// The text leaf after the one at `path`, anywhere in the document
    pub fn next_text(&self, path: &Path) -> Option<(&Text, Path)> {
        self.texts()
            .into_iter()
            .find(|(_, p)| p.compare(path) == Ordering::Greater)
    }

    /// Plain text covered by a location
    pub fn string(&self, at: &Location) -> Result<String> {
        let (start, end) = (self.start(at)?, self.end(at)?);
        let mut out = String::new();
        for (text, path) in self.texts() {
            if path.compare(&start.path) == Ordering::Less {
                continue;
            }
            if path.compare(&end.path) == Ordering::Greater {
                break;
            }
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path { end.offset } else { text.len() };
            out.push_str(&text.slice(from, to));
        }
        Ok(out)
    }

    /// Marks that typing at the selection would produce
    pub fn marks(&self) -> Option<Marks> {
        if let Some(marks) = &self.marks {
            return Some(marks.clone());
        }
        let selection = self.selection.as_ref()?;
        if selection.is_collapsed() {
            return self.leaf(&selection.anchor.path).ok().map(|text| text.marks.clone());
        }
        let options = NodesOptions::new().matching(|node, _| node.is_text());
        self.nodes(&options)
            .into_iter()
            .find_map(|(node, _)| node.as_text().map(|text| text.marks.clone()))
    }

    /// Nodes intersecting a location, in document order, filtered by the
    /// options' matcher, mode and universal flag.
    pub fn nodes(&self, options: &NodesOptions<'_>) -> Vec<NodeEntry<'_>> {
        let at = match &options.at {
            Some(at) => at.clone(),
            None => match &self.selection {
                Some(selection) => Location::Range(selection.clone()),
                None => return Vec::new(),
            },
        };
        let any = |_: &Node, _: &Path| true;
        let matcher: &dyn Fn(&Node, &Path) -> bool = match options.matcher.as_deref() {
            Some(matcher) => matcher,
            None => &any,
        };
        self.nodes_at(&at, matcher, options.mode.unwrap_or_default(), options.universal, options.reverse)
    }

    pub(crate) fn nodes_at(
        &self,
        at: &Location,
        matcher: &dyn Fn(&Node, &Path) -> bool,
        mode: Mode,
        universal: bool,
        reverse: bool,
    ) -> Vec<NodeEntry<'_>> {
        let (from, to) = match at {
            Location::Path(path) => (path.clone(), path.clone()),
            Location::Point(point) => (point.path.clone(), point.path.clone()),
            Location::Range(range) => {
                let (start, end) = range.edges();
                (start.path, end.path)
            }
        };

        let mut candidates = Vec::new();
        collect_between(&self.children, &Path::root(), &from, &to, reverse, &mut candidates);

        let mut matched = Vec::new();
        let mut hit: Option<NodeEntry<'_>> = None;

        for (node, path) in candidates {
            let is_lower = hit
                .as_ref()
                .is_some_and(|(_, hit_path)| path.compare(hit_path) == Ordering::Equal);

            if mode == Mode::Highest && is_lower {
                continue;
            }

            if !matcher(node, &path) {
                // A text leaf outside every match breaks a universal query.
                if universal && !is_lower && node.is_text() {
                    return Vec::new();
                }
                continue;
            }

            if mode == Mode::Lowest && is_lower {
                hit = Some((node, path));
                continue;
            }

            let emit = if mode == Mode::Lowest {
                hit.take()
            } else {
                Some((node, path.clone()))
            };
            if let Some(entry) = emit {
                matched.push(entry);
            }
            hit = Some((node, path));
        }

        if mode == Mode::Lowest {
            if let Some(entry) = hit {
                matched.push(entry);
            }
        }

        matched
    }
}

fn collect_all<'a>(nodes: &'a [Node], parent: &Path, out: &mut Vec<NodeEntry<'a>>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        out.push((node, path.clone()));
        collect_all(node.children(), &path, out);
    }
}

/// Pre-order walk of every node whose subtree overlaps `[from, to]`.
fn collect_between<'a>(
    nodes: &'a [Node],
    parent: &Path,
    from: &Path,
    to: &Path,
    reverse: bool,
    out: &mut Vec<NodeEntry<'a>>,
) {
    let visit = |index: usize, out: &mut Vec<NodeEntry<'a>>| -> bool {
        let path = parent.child(index);
        if path.compare(from) == Ordering::Less {
            return !reverse;
        }
        if path.compare(to) == Ordering::Greater {
            return reverse;
        }
        let node = &nodes[index];
        out.push((node, path.clone()));
        collect_between(node.children(), &path, from, to, reverse, out);
        true
    };

    if reverse {
        for index in (0..nodes.len()).rev() {
            if !visit(index, out) {
                break;
            }
        }
    } else {
        for index in 0..nodes.len() {
            if !visit(index, out) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::{caret, editor, range};
    use crate::model::{mark, ElementType};

    fn bold(text: &str) -> Node {
        Node::Text(Text::new(text).with_mark(mark::BOLD, true))
    }

    fn sample() -> Vec<Node> {
        vec![
            Node::element(ElementType::Paragraph, vec![Node::text("plain "), bold("strong")]),
            Node::element(
                ElementType::BulletedList,
                vec![
                    Node::element(ElementType::ListItem, vec![bold("one")]),
                    Node::element(ElementType::ListItem, vec![Node::text("two")]),
                ],
            ),
        ]
    }

    #[test]
    fn test_nodes_in_selection_modes() {
        let ed = editor(sample(), range((&[0, 1], 2), (&[1, 0, 0], 1)));

        let all = NodesOptions::new().matching(matches::block);
        let paths: Vec<Path> = ed.nodes(&all).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, vec![Path::from([0]), Path::from([1]), Path::from([1, 0])]);

        let lowest = NodesOptions::new().matching(matches::block).mode(Mode::Lowest);
        let paths: Vec<Path> = ed.nodes(&lowest).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, vec![Path::from([0]), Path::from([1, 0])]);

        let highest = NodesOptions::new().matching(matches::block).mode(Mode::Highest);
        let paths: Vec<Path> = ed.nodes(&highest).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, vec![Path::from([0]), Path::from([1])]);
    }

    #[test]
    fn test_universal_requires_every_leaf() {
        let is_bold = |node: &Node, _: &Path| node.as_text().is_some_and(|t| t.has_mark(mark::BOLD));

        let ed = editor(sample(), range((&[0, 1], 0), (&[1, 0, 0], 3)));
        let options = NodesOptions::new().matching(is_bold).universal();
        assert_eq!(ed.nodes(&options).len(), 2);

        let ed = editor(sample(), range((&[0, 0], 1), (&[0, 1], 3)));
        let options = NodesOptions::new().matching(is_bold).universal();
        assert!(ed.nodes(&options).is_empty());

        let options = NodesOptions::new().matching(is_bold);
        assert_eq!(ed.nodes(&options).len(), 1);
    }

    #[test]
    fn test_no_selection_means_no_matches() {
        let mut ed = editor(sample(), caret(&[0, 0], 0));
        ed.selection = None;
        assert!(ed.nodes(&NodesOptions::new()).is_empty());
        assert!(ed.marks().is_none());
    }

    #[test]
    fn test_points_and_strings() {
        let ed = editor(sample(), caret(&[0, 0], 0));
        let list = Location::Path(Path::from([1]));
        assert_eq!(ed.start(&list).unwrap(), Point::new([1, 0, 0], 0));
        assert_eq!(ed.end(&list).unwrap(), Point::new([1, 1, 0], 3));
        assert_eq!(ed.string(&list).unwrap(), "onetwo");

        let span = Location::Range(range((&[0, 0], 2), (&[0, 1], 3)));
        assert_eq!(ed.string(&span).unwrap(), "ain str");

        assert!(ed.is_start(&Point::new([1, 0, 0], 0), &Path::from([1])));
        assert!(ed.is_end(&Point::new([0, 1], 6), &Path::from([0])));
        assert!(!ed.is_edge(&Point::new([0, 1], 2), &Path::from([0])));
    }

    #[test]
    fn test_neighbours_and_ancestors() {
        let ed = editor(sample(), caret(&[0, 0], 0));
        let item = Path::from([1, 1, 0]);
        assert_eq!(ed.previous_text(&item).map(|(_, p)| p), Some(Path::from([1, 0, 0])));
        assert_eq!(ed.next_text(&Path::from([0, 1])).map(|(_, p)| p), Some(Path::from([1, 0, 0])));
        assert!(ed.next_text(&item).is_none());

        let (list, path) = ed.above(&item, matches::list).unwrap();
        assert_eq!(list.kind(), Some(&ElementType::BulletedList));
        assert_eq!(path, Path::from([1]));

        assert_eq!(
            ed.text_blocks(),
            vec![Path::from([0]), Path::from([1, 0]), Path::from([1, 1])]
        );
    }

    #[test]
    fn test_marks_at_selection() {
        let ed = editor(sample(), caret(&[0, 1], 2));
        assert!(crate::model::mark_is_set(ed.marks().unwrap().get(mark::BOLD)));

        let ed = editor(sample(), range((&[0, 0], 0), (&[0, 1], 2)));
        assert!(ed.marks().unwrap().is_empty());
    }
}
