use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Document, Node};
use crate::render;

/// Export format: the editor value plus rendered HTML and metadata
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub id: String,
    pub filepath: Option<String>,
    pub filename: Option<String>,
    pub title: String,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub block_count: usize,
    pub value: Vec<Node>,
    #[serde(default)]
    pub html: String,
    pub updated_at: String,
}

impl From<&Document> for ExportDocument {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.to_string(),
            filepath: doc.filepath.clone(),
            filename: doc.filename.clone(),
            title: doc.title.clone(),
            word_count: doc.word_count(),
            block_count: doc.block_count(),
            value: doc.children.clone(),
            html: render::to_html(&doc.children),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

impl From<ExportDocument> for Document {
    /// Counts and HTML are derived from the value, so they are not read back
    fn from(export: ExportDocument) -> Self {
        let mut doc = Document::new(export.title, export.value);
        if let Ok(id) = Uuid::parse_str(&export.id) {
            doc.id = id;
        }
        if let Ok(updated_at) = DateTime::parse_from_rfc3339(&export.updated_at) {
            doc.updated_at = updated_at.with_timezone(&Utc);
        }
        doc.filepath = export.filepath;
        doc.filename = export.filename;
        doc
    }
}

/// Serialize the export format to JSON
pub fn to_json(doc: &Document) -> Result<String> {
    let export = ExportDocument::from(doc);
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Read a saved document, an export written by [`to_json`], or a bare value
/// (an array of nodes). A bare value takes `title`.
pub fn document_from_json(json: &str, title: String) -> Result<Document> {
    let parsed: Value = serde_json::from_str(json)?;
    match parsed {
        Value::Object(ref object) if object.contains_key("value") => {
            let export: ExportDocument = serde_json::from_value(parsed)?;
            Ok(export.into())
        }
        Value::Object(_) => Ok(serde_json::from_value(parsed)?),
        _ => {
            let children: Vec<Node> = serde_json::from_value(parsed)?;
            Ok(Document::new(title, children))
        }
    }
}
