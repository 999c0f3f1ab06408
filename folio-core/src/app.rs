use crate::command::{KeyChord, Keymap};
use crate::config::EditorConfig;
use crate::cursor::{CursorState, Motion};
use crate::editor::Editor;
use crate::error::Result;
use crate::format;
use crate::model::{Document, ElementType};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
}

/// Platform-agnostic application state
pub struct App {
    pub document: Option<Document>,
    pub editor: Editor,
    pub keymap: Keymap,
    pub mode: Mode,
    pub running: bool,

    // Status message
    pub status_message: Option<String>,

    config: EditorConfig,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            document: None,
            editor: Editor::new(config.clone()),
            keymap: Keymap::default(),
            mode: Mode::Normal,
            running: true,
            status_message: None,
            config,
        }
    }

    /// Start editing `doc`. Its value is replaced by the normalized one.
    pub fn load_document(&mut self, mut doc: Document) -> Result<()> {
        self.editor = Editor::with_value(doc.children.clone(), self.config.clone())?;
        if doc.children != self.editor.children() {
            doc.set_children(self.editor.children().to_vec());
        }
        tracing::info!(title = %doc.title, blocks = doc.block_count(), "document loaded");
        self.document = Some(doc);
        Ok(())
    }

    /// Run the command bound to `chord`, if any
    pub fn handle_chord(&mut self, chord: KeyChord) -> bool {
        let result = self.keymap.handle(&mut self.editor, chord);
        match result {
            Ok(handled) => {
                self.sync_document();
                handled
            }
            Err(e) => {
                self.report(e);
                true
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0; 4];
        let text: &str = c.encode_utf8(&mut buf);
        self.edit(|ed| ed.insert_text(text));
    }

    pub fn insert_break(&mut self) {
        self.edit(Editor::insert_break);
    }

    pub fn backspace(&mut self) {
        self.edit(Editor::delete_backward);
    }

    pub fn delete(&mut self) {
        self.edit(Editor::delete_forward);
    }

    pub fn undo(&mut self) {
        self.edit(|ed| ed.undo().map(|_| ()));
    }

    pub fn redo(&mut self) {
        self.edit(|ed| ed.redo().map(|_| ()));
    }

    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        self.edit(|ed| ed.move_cursor(motion, extend));
    }

    pub fn select_all(&mut self) {
        self.edit(Editor::select_all);
    }

    pub fn toggle_block(&mut self, kind: ElementType) {
        self.edit(|ed| format::toggle_block(ed, &kind));
    }

    pub fn toggle_mark(&mut self, mark: &str) {
        self.edit(|ed| format::toggle_mark(ed, mark));
    }

    /// Copy the editor value into the document if any operation touched it
    pub fn sync_document(&mut self) {
        let operations = self.editor.take_operations();
        if operations.iter().all(|op| op.is_selection()) {
            return;
        }
        if let Some(doc) = self.document.as_mut() {
            doc.set_children(self.editor.children().to_vec());
        }
    }

    /// Get cursor position as (row, col)
    pub fn cursor_pos(&self) -> (usize, usize) {
        CursorState::from_editor(&self.editor).cursor()
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Normal => Mode::Help,
            Mode::Help => Mode::Normal,
        };
    }

    /// Set status message
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Get title for display
    pub fn title(&self) -> String {
        self.document
            .as_ref()
            .map(|d| d.filename.clone().unwrap_or_else(|| d.title.clone()))
            .unwrap_or_else(|| "Untitled".to_string())
    }

    fn edit(&mut self, f: impl FnOnce(&mut Editor) -> Result<()>) {
        if let Err(e) = f(&mut self.editor) {
            self.report(e);
        }
        self.sync_document();
    }

    fn report(&mut self, e: crate::error::EditorError) {
        tracing::warn!(error = %e, "edit failed");
        self.set_status(&format!("Error: {}", e));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn app() -> App {
        let mut app = App::new();
        app.load_document(Document::sample()).unwrap();
        app
    }

    #[test]
    fn test_typing_updates_document() {
        let mut app = app();
        app.move_cursor(Motion::LineEnd, false);
        app.insert_char('!');
        app.insert_break();
        app.insert_char('é');

        let doc = app.document.as_ref().unwrap();
        assert_eq!(doc.plain_text(), "A line of text in a paragraph.!\né");
        assert_eq!(app.cursor_pos(), (1, 1));
    }

    #[test]
    fn test_chords_toggle_formatting() {
        let mut app = app();
        assert!(app.handle_chord(KeyChord::ctrl('`')));
        assert_eq!(
            app.document.as_ref().unwrap().children[0].kind(),
            Some(&ElementType::Code)
        );
        assert!(!app.handle_chord(KeyChord::new('x')));

        app.undo();
        assert_eq!(
            app.document.as_ref().unwrap().children[0].kind(),
            Some(&ElementType::Paragraph)
        );
    }

    #[test]
    fn test_load_document_normalizes_value() {
        let mut app = App::new();
        let doc = Document::new("empty".to_string(), Vec::new());
        app.load_document(doc).unwrap();
        assert_eq!(app.document.as_ref().unwrap().children, vec![Node::paragraph("")]);
        assert_eq!(app.title(), "empty");
    }

    #[test]
    fn test_backspace_at_start_reports_nothing() {
        let mut app = app();
        app.backspace();
        assert!(app.status_message.is_none());
        assert_eq!(app.document.as_ref().unwrap().block_count(), 1);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = App::new();
        app.toggle_help();
        assert_eq!(app.mode, Mode::Help);
        app.toggle_help();
        assert_eq!(app.mode, Mode::Normal);
    }
}
