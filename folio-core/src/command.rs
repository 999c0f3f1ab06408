//! Key chords and the editing commands they trigger

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::editor::Editor;
use crate::error::Result;
use crate::format;
use crate::model::{mark, ElementType};

/// A key press with its modifiers. Letter keys are stored lowercase; shift
/// is carried by the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: char,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: char) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleBlock(ElementType),
    ToggleMark(String),
    Undo,
    Redo,
}

impl Command {
    pub fn execute(&self, editor: &mut Editor) -> Result<()> {
        tracing::debug!(command = ?self, "executing command");
        match self {
            Command::ToggleBlock(kind) => format::toggle_block(editor, kind),
            Command::ToggleMark(name) => format::toggle_mark(editor, name),
            Command::Undo => editor.undo().map(|_| ()),
            Command::Redo => editor.redo().map(|_| ()),
        }
    }
}

/// Chord bindings. Only chords holding ctrl are ever looked up.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyChord, Command>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = HashMap::from([
            (KeyChord::ctrl('`'), Command::ToggleBlock(ElementType::Code)),
            (KeyChord::ctrl('b'), Command::ToggleMark(mark::BOLD.to_string())),
            (KeyChord::ctrl('i'), Command::ToggleMark(mark::ITALIC.to_string())),
            (KeyChord::ctrl('u'), Command::ToggleMark(mark::UNDERLINE.to_string())),
            (KeyChord::ctrl('z'), Command::Undo),
            (KeyChord::ctrl('y'), Command::Redo),
            (KeyChord::ctrl('z').with_shift(), Command::Redo),
        ]);
        Self { bindings }
    }
}

impl Keymap {
    pub fn lookup(&self, chord: &KeyChord) -> Option<&Command> {
        self.bindings.get(chord)
    }

    /// Run the command bound to `chord`. Returns whether the chord was
    /// handled; chords without ctrl never are.
    pub fn handle(&self, editor: &mut Editor, chord: KeyChord) -> Result<bool> {
        if !chord.ctrl {
            return Ok(false);
        }
        let Some(command) = self.lookup(&chord) else {
            return Ok(false);
        };
        command.execute(editor)?;
        Ok(true)
    }
}

impl Editor {
    /// Handle `chord` with the default bindings
    pub fn handle_key(&mut self, chord: KeyChord) -> Result<bool> {
        static DEFAULT: OnceLock<Keymap> = OnceLock::new();
        DEFAULT.get_or_init(Keymap::default).handle(self, chord)
    }
}
