//! File I/O for the terminal editor

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use folio_core::{document_from_json, render, Document, EditorConfig};

/// Load a file as a Document: `.json` files hold a saved document or a bare
/// value, anything else is plain text with one paragraph per line.
pub fn load_file(path: &str) -> Result<Document> {
    let path = Path::new(path);
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;

    let content = fs::read_to_string(&canonical)
        .with_context(|| format!("Failed to read file: {}", canonical.display()))?;

    let filepath = canonical.to_string_lossy().to_string();
    let filename = canonical
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = canonical
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    let is_json = canonical.extension().is_some_and(|ext| ext == "json");
    let doc = if is_json {
        document_from_json(&content, title)
            .with_context(|| format!("Failed to parse {}", canonical.display()))?
    } else {
        Document::from_plain_text(title, &content)
    };
    tracing::debug!(path = %filepath, json = is_json, "loaded file");

    Ok(doc.with_file_info(filepath, filename))
}

/// Get the ~/.folio directory path, creating it if needed
pub fn folio_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let folio_dir = home.join(".folio");

    if !folio_dir.exists() {
        fs::create_dir_all(&folio_dir)
            .with_context(|| format!("Failed to create {}", folio_dir.display()))?;
    }

    Ok(folio_dir)
}

/// Editor settings from ~/.folio/config.json, defaults when the file is absent
pub fn load_config() -> Result<EditorConfig> {
    let path = folio_dir()?.join("config.json");
    if !path.exists() {
        return Ok(EditorConfig::default());
    }
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    EditorConfig::from_json(&json).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Export document to `to`, or ~/.folio/document.json by default
pub fn export_document(doc: &Document, to: Option<&Path>) -> Result<PathBuf> {
    let export_path = match to {
        Some(path) => path.to_path_buf(),
        None => folio_dir()?.join("document.json"),
    };

    let json = folio_core::to_json(doc).context("Failed to serialize document")?;

    fs::write(&export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    tracing::info!(path = %export_path.display(), "exported document");
    Ok(export_path)
}

/// Write the rendered HTML of a document
pub fn export_html(doc: &Document, to: &Path) -> Result<PathBuf> {
    let html = render::to_html(&doc.children);
    fs::write(to, html).with_context(|| format!("Failed to write {}", to.display()))?;

    tracing::info!(path = %to.display(), "exported html");
    Ok(to.to_path_buf())
}
