use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Node;
use crate::render;

/// A rich-text document: the editor value plus file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: String, children: Vec<Node>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            children,
            filename: None,
            filepath: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// One paragraph per line of `content`
    pub fn from_plain_text(title: String, content: &str) -> Self {
        let children = content.lines().map(Node::paragraph).collect();
        Self::new(title, children)
    }

    /// Create a document with filename metadata (used by CLI when loading from file)
    pub fn with_file_info(mut self, filepath: String, filename: String) -> Self {
        self.filepath = Some(filepath);
        self.filename = Some(filename);
        self
    }

    /// Starter document for a session opened without a file
    pub fn sample() -> Self {
        Self::new(
            "Untitled".to_string(),
            vec![Node::paragraph("A line of text in a paragraph.")],
        )
    }

    pub fn word_count(&self) -> usize {
        self.children
            .iter()
            .map(|block| block.string().split_whitespace().count())
            .sum()
    }

    pub fn block_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .filter_map(Node::as_element)
                .map(|element| match element.children.first() {
                    Some(Node::Element(_)) => count(&element.children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.children)
    }

    /// Replace the value after an edit
    pub fn set_children(&mut self, children: Vec<Node>) {
        self.children = children;
        self.updated_at = Utc::now();
    }

    /// Blocks joined by newlines, marks dropped
    pub fn plain_text(&self) -> String {
        render::to_plain_text(&self.children)
    }
}
