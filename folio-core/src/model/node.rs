use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Path;
use crate::error::{EditorError, Result};

/// Node properties: element attributes (including `type`) or text marks.
pub type Props = BTreeMap<String, Value>;

/// Text marks, e.g. `bold: true`
pub type Marks = BTreeMap<String, Value>;

/// Well-known mark names
pub mod mark {
    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const UNDERLINE: &str = "underline";
    pub const CODE: &str = "code";
}

/// Whether a mark value counts as "on"
pub fn mark_is_set(value: Option<&serde_json::Value>) -> bool {
    !matches!(value, None | Some(Value::Null) | Some(Value::Bool(false)))
}

/// Element type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Paragraph,
    Code,
    BulletedList,
    NumberedList,
    ListItem,
    Other(String),
}

impl ElementType {
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::Code => "code",
            ElementType::BulletedList => "bulleted-list",
            ElementType::NumberedList => "numbered-list",
            ElementType::ListItem => "list-item",
            ElementType::Other(name) => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementType::BulletedList | ElementType::NumberedList)
    }
}

impl From<String> for ElementType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "paragraph" => ElementType::Paragraph,
            "code" => ElementType::Code,
            "bulleted-list" => ElementType::BulletedList,
            "numbered-list" => ElementType::NumberedList,
            "list-item" => ElementType::ListItem,
            _ => ElementType::Other(name),
        }
    }
}

impl From<&str> for ElementType {
    fn from(name: &str) -> Self {
        ElementType::from(name.to_string())
    }
}

impl From<ElementType> for String {
    fn from(ty: ElementType) -> Self {
        match ty {
            ElementType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural node with a type tag and children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub props: Props,
}

impl Element {
    pub fn new(kind: ElementType, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            props: Props::new(),
        }
    }
}

/// A leaf carrying a string and its marks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
        }
    }

    pub fn with_mark(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.marks.insert(name.to_string(), value.into());
        self
    }

    pub fn has_mark(&self, name: &str) -> bool {
        mark_is_set(self.marks.get(name))
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte index of a char offset, `None` past the end
    pub(crate) fn byte_index(&self, offset: usize) -> Option<usize> {
        if offset == 0 {
            return Some(0);
        }
        match self.text.char_indices().nth(offset) {
            Some((idx, _)) => Some(idx),
            None if offset == self.len() => Some(self.text.len()),
            None => None,
        }
    }

    /// Chars in `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.text.chars().skip(start).take(end.saturating_sub(start)).collect()
    }

    /// Same marks, text ignored
    pub fn marks_equal(&self, other: &Text) -> bool {
        self.marks == other.marks
    }
}

/// A document tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn element(kind: ElementType, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    /// A paragraph holding a single unmarked text leaf
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(ElementType::Paragraph, vec![Node::text(text)])
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn kind(&self) -> Option<&ElementType> {
        self.as_element().map(|e| &e.kind)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(element) => Some(&mut element.children),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of every leaf below this node
    pub fn string(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Element(element) => element.children.iter().map(Node::string).collect(),
        }
    }

    /// Properties other than text/children. Elements report their `type`.
    pub fn props(&self) -> Props {
        match self {
            Node::Text(text) => text.marks.clone(),
            Node::Element(element) => {
                let mut props = element.props.clone();
                props.insert("type".to_string(), Value::String(element.kind.as_str().to_string()));
                props
            }
        }
    }

    pub fn prop(&self, key: &str) -> Option<Value> {
        match self {
            Node::Text(text) => text.marks.get(key).cloned(),
            Node::Element(element) if key == "type" => {
                Some(Value::String(element.kind.as_str().to_string()))
            }
            Node::Element(element) => element.props.get(key).cloned(),
        }
    }

    /// Set (or with `None`, remove) a single property
    pub(crate) fn set_prop(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match self {
            Node::Text(text) => {
                if key == "text" {
                    return Err(EditorError::ReservedProperty(key.to_string()));
                }
                match value {
                    Some(value) => text.marks.insert(key.to_string(), value),
                    None => text.marks.remove(key),
                };
            }
            Node::Element(element) => match key {
                "children" => return Err(EditorError::ReservedProperty(key.to_string())),
                "type" => match value {
                    Some(Value::String(name)) => element.kind = ElementType::from(name),
                    _ => return Err(EditorError::ReservedProperty(key.to_string())),
                },
                _ => {
                    match value {
                        Some(value) => element.props.insert(key.to_string(), value),
                        None => element.props.remove(key),
                    };
                }
            },
        }
        Ok(())
    }

    /// An empty node of the same kind carrying `props`
    pub(crate) fn empty_like(&self, props: &Props) -> Result<Node> {
        let mut node = match self {
            Node::Text(_) => Node::Text(Text::default()),
            Node::Element(element) => Node::element(element.kind.clone(), Vec::new()),
        };
        for (key, value) in props {
            node.set_prop(key, Some(value.clone()))?;
        }
        Ok(node)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Resolve a non-root path below the root's children.
pub fn node_at<'a>(root: &'a [Node], path: &Path) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = root.get(*first)?;
    for &index in rest {
        node = node.children().get(index)?;
    }
    Some(node)
}

pub(crate) fn node_at_mut<'a>(root: &'a mut [Node], path: &Path) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = root.get_mut(*first)?;
    for &index in rest {
        node = node.children_mut()?.get_mut(index)?;
    }
    Some(node)
}

/// Children list of the node at `parent` (the root's children for the root path)
pub(crate) fn children_at_mut<'a>(root: &'a mut Vec<Node>, parent: &Path) -> Option<&'a mut Vec<Node>> {
    if parent.is_root() {
        return Some(root);
    }
    node_at_mut(root, parent)?.children_mut()
}

pub(crate) fn children_at<'a>(root: &'a [Node], parent: &Path) -> Option<&'a [Node]> {
    if parent.is_root() {
        return Some(root);
    }
    match node_at(root, parent)? {
        Node::Element(element) => Some(&element.children),
        Node::Text(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_json_shape() {
        let value = json!([
            {
                "type": "paragraph",
                "children": [{ "text": "A line of text in a paragraph." }]
            },
            {
                "type": "code",
                "children": [{ "text": "let x = 1;", "bold": true }]
            }
        ]);

        let nodes: Vec<Node> = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(nodes[0].kind(), Some(&ElementType::Paragraph));
        assert_eq!(nodes[1].kind(), Some(&ElementType::Code));
        let leaf = nodes[1].children()[0].as_text().unwrap();
        assert!(leaf.has_mark(mark::BOLD));

        assert_eq!(serde_json::to_value(&nodes).unwrap(), value);
    }

    #[test]
    fn test_unknown_types_and_props_survive() {
        let value = json!({ "type": "callout", "tone": "warn", "children": [{ "text": "" }] });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(node.kind(), Some(&ElementType::Other("callout".to_string())));
        assert_eq!(node.prop("tone"), Some(json!("warn")));
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn test_set_prop_rules() {
        let mut node = Node::paragraph("hi");
        node.set_prop("type", Some(json!("code"))).unwrap();
        assert_eq!(node.kind(), Some(&ElementType::Code));
        assert!(node.set_prop("children", Some(json!([]))).is_err());
        assert!(node.set_prop("type", None).is_err());

        let mut leaf = Node::text("x");
        leaf.set_prop(mark::BOLD, Some(json!(true))).unwrap();
        assert!(leaf.as_text().unwrap().has_mark(mark::BOLD));
        leaf.set_prop(mark::BOLD, None).unwrap();
        assert!(!leaf.as_text().unwrap().has_mark(mark::BOLD));
        assert!(leaf.set_prop("text", Some(json!("y"))).is_err());
    }

    #[test]
    fn test_char_offsets() {
        let text = Text::new("héllo");
        assert_eq!(text.len(), 5);
        assert_eq!(text.byte_index(2), Some(3));
        assert_eq!(text.byte_index(5), Some(6));
        assert_eq!(text.byte_index(6), None);
        assert_eq!(text.slice(1, 3), "él");
    }
}
