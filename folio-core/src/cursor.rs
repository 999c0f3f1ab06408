//! Caret motion over the document laid out as lines, one line per text
//! block. Columns count chars across the block's leaves, so a column maps
//! back to a point in whichever leaf holds it.

use crate::editor::transforms::Edge;
use crate::editor::Editor;
use crate::error::Result;
use crate::model::{Path, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    Top,
    Bottom,
    WordForward,
    WordBack,
}

#[derive(Debug, Clone)]
struct Line {
    block: Path,
    text: String,
    width: usize,
    /// Leaf paths with their char lengths
    leaves: Vec<(Path, usize)>,
}

/// Caret position as (row, col) over the editor's text blocks
#[derive(Debug, Clone, Default)]
pub struct CursorState {
    pub row: usize,
    pub col: usize,
    lines: Vec<Line>,
}

impl CursorState {
    /// Lay out the editor's blocks and place the cursor at the selection focus
    pub fn from_editor(editor: &Editor) -> Self {
        let lines = editor
            .text_blocks()
            .into_iter()
            .filter_map(|block| {
                let node = editor.node(&block).ok()?;
                let leaves = node
                    .children()
                    .iter()
                    .enumerate()
                    .filter_map(|(index, child)| child.as_text().map(|text| (block.child(index), text.len())))
                    .collect::<Vec<_>>();
                let text = node.string();
                Some(Line {
                    width: text.chars().count(),
                    text,
                    leaves,
                    block,
                })
            })
            .collect();

        let mut cursor = Self { row: 0, col: 0, lines };
        if let Some((row, col)) = editor.selection().and_then(|s| cursor.locate(&s.focus)) {
            cursor.row = row;
            cursor.col = col;
        }
        cursor
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|line| line.text.as_str())
    }

    /// Path of the block shown on line `index`
    pub fn block(&self, index: usize) -> Option<&Path> {
        self.lines.get(index).map(|line| &line.block)
    }

    /// Row and column of a point, if its leaf is laid out
    pub fn locate(&self, point: &Point) -> Option<(usize, usize)> {
        self.lines.iter().enumerate().find_map(|(row, line)| {
            let mut col = 0;
            for (path, len) in &line.leaves {
                if *path == point.path {
                    return Some((row, col + point.offset.min(*len)));
                }
                col += len;
            }
            None
        })
    }

    /// The point at (row, col), clamping the column to the line. At a leaf
    /// boundary the earlier leaf wins.
    pub fn point_at(&self, row: usize, col: usize) -> Option<Point> {
        let line = self.lines.get(row)?;
        let col = col.min(line.width);
        let mut start = 0;
        for (path, len) in &line.leaves {
            if col <= start + len {
                return Some(Point::new(path.clone(), col - start));
            }
            start += len;
        }
        let (path, len) = line.leaves.last()?;
        Some(Point::new(path.clone(), *len))
    }

    /// Point under the cursor
    pub fn point(&self) -> Option<Point> {
        self.point_at(self.row, self.col)
    }

    pub fn apply(&mut self, motion: Motion) {
        match motion {
            Motion::Left => self.move_left(),
            Motion::Right => self.move_right(),
            Motion::Up => self.move_up(),
            Motion::Down => self.move_down(),
            Motion::LineStart => self.move_to_start(),
            Motion::LineEnd => self.move_to_end(),
            Motion::Top => self.move_to_top(),
            Motion::Bottom => self.move_to_bottom(),
            Motion::WordForward => self.move_word_forward(),
            Motion::WordBack => self.move_word_back(),
        }
    }

    fn width(&self, row: usize) -> usize {
        self.lines.get(row).map(|line| line.width).unwrap_or(0)
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.width(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.width(self.row));
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.width(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.width(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_to_start(&mut self) {
        self.col = 0;
    }

    pub fn move_to_end(&mut self) {
        self.col = self.width(self.row);
    }

    pub fn move_to_top(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    pub fn move_to_bottom(&mut self) {
        if !self.lines.is_empty() {
            self.row = self.lines.len() - 1;
            self.col = self.width(self.row);
        }
    }

    pub fn move_word_forward(&mut self) {
        let Some(line) = self.lines.get(self.row) else {
            return;
        };
        let chars: Vec<char> = line.text.chars().collect();
        let mut col = self.col;
        while col < chars.len() && !chars[col].is_whitespace() {
            col += 1;
        }
        while col < chars.len() && chars[col].is_whitespace() {
            col += 1;
        }

        if col >= chars.len() && self.col == chars.len() && self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        } else {
            self.col = col;
        }
    }

    pub fn move_word_back(&mut self) {
        if self.col == 0 {
            if self.row > 0 {
                self.row -= 1;
                self.col = self.width(self.row);
            }
            return;
        }

        let Some(line) = self.lines.get(self.row) else {
            return;
        };
        let chars: Vec<char> = line.text.chars().collect();
        let mut col = self.col.min(chars.len());
        while col > 0 && chars[col - 1].is_whitespace() {
            col -= 1;
        }
        while col > 0 && !chars[col - 1].is_whitespace() {
            col -= 1;
        }
        self.col = col;
    }
}

impl Editor {
    /// Move the selection focus by `motion`. With `extend` the anchor stays
    /// put; otherwise the selection collapses onto the new position.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> Result<()> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(());
        };
        if !extend && selection.is_expanded() {
            match motion {
                Motion::Left => return self.collapse(Edge::Start),
                Motion::Right => return self.collapse(Edge::End),
                _ => {}
            }
        }

        let mut cursor = CursorState::from_editor(self);
        cursor.apply(motion);
        let Some(point) = cursor.point() else {
            return Ok(());
        };
        if extend {
            self.set_selection_point(point, Edge::Focus)
        } else {
            self.select(point)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::{caret, editor, range};
    use crate::model::{mark, ElementType, Node, Text};

    fn doc() -> Vec<Node> {
        vec![
            Node::paragraph("Hello"),
            Node::element(
                ElementType::BulletedList,
                vec![Node::element(ElementType::ListItem, vec![Node::text("World")])],
            ),
            Node::paragraph("Test"),
        ]
    }

    #[test]
    fn test_cursor_movement() {
        let ed = editor(doc(), caret(&[0, 0], 0));
        let mut cursor = CursorState::from_editor(&ed);
        assert_eq!(cursor.line_count(), 3);
        assert_eq!(cursor.line(1), Some("World"));
        assert_eq!(cursor.block(1), Some(&Path::from([1, 0])));
        assert_eq!(cursor.cursor(), (0, 0));

        cursor.move_down();
        assert_eq!(cursor.cursor(), (1, 0));

        cursor.move_right();
        cursor.move_right();
        assert_eq!(cursor.cursor(), (1, 2));
        assert_eq!(cursor.point(), Some(Point::new([1, 0, 0], 2)));

        cursor.move_up();
        assert_eq!(cursor.cursor(), (0, 2));

        cursor.move_to_bottom();
        assert_eq!(cursor.cursor(), (2, 4));
        cursor.move_right();
        assert_eq!(cursor.cursor(), (2, 4));
    }

    #[test]
    fn test_columns_span_leaves() {
        let ed = editor(
            vec![Node::element(
                ElementType::Paragraph,
                vec![
                    Node::text("ab"),
                    Node::Text(Text::new("cd").with_mark(mark::BOLD, true)),
                    Node::text("ef"),
                ],
            )],
            caret(&[0, 1], 1),
        );
        let cursor = CursorState::from_editor(&ed);
        assert_eq!(cursor.cursor(), (0, 3));
        assert_eq!(cursor.line(0), Some("abcdef"));

        assert_eq!(cursor.point_at(0, 2), Some(Point::new([0, 0], 2)));
        assert_eq!(cursor.point_at(0, 5), Some(Point::new([0, 2], 1)));
        assert_eq!(cursor.point_at(0, 99), Some(Point::new([0, 2], 2)));
        assert_eq!(cursor.point_at(1, 0), None);
    }

    #[test]
    fn test_word_motion() {
        let ed = editor(vec![Node::paragraph("one two  three"), Node::paragraph("x")], caret(&[0, 0], 0));
        let mut cursor = CursorState::from_editor(&ed);
        cursor.move_word_forward();
        assert_eq!(cursor.cursor(), (0, 4));
        cursor.move_word_forward();
        assert_eq!(cursor.cursor(), (0, 9));
        cursor.move_word_forward();
        assert_eq!(cursor.cursor(), (0, 14));
        cursor.move_word_forward();
        assert_eq!(cursor.cursor(), (1, 0));

        cursor.move_word_back();
        assert_eq!(cursor.cursor(), (0, 14));
        cursor.move_word_back();
        assert_eq!(cursor.cursor(), (0, 9));
    }

    #[test]
    fn test_move_cursor_selects() {
        let mut ed = editor(doc(), caret(&[0, 0], 4));
        ed.move_cursor(Motion::Right, false).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[0, 0], 5)));
        ed.move_cursor(Motion::Right, false).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[1, 0, 0], 0)));

        ed.move_cursor(Motion::LineEnd, true).unwrap();
        assert_eq!(ed.selection(), Some(&range((&[1, 0, 0], 0), (&[1, 0, 0], 5))));
        ed.move_cursor(Motion::Down, true).unwrap();
        assert_eq!(ed.selection(), Some(&range((&[1, 0, 0], 0), (&[2, 0], 4))));

        // Left on an expanded selection collapses to its start
        ed.move_cursor(Motion::Left, false).unwrap();
        assert_eq!(ed.selection(), Some(&caret(&[1, 0, 0], 0)));
        assert!(!ed.history().can_undo());
    }
}
