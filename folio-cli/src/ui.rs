//! Terminal UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use folio_core::{
    format, mark, App, CursorState, ElementType, Mode, Node, Path, Point, Range, Text,
};

// Catppuccin Mocha colors
const SURFACE0: Color = Color::Rgb(49, 50, 68);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const TEXT: Color = Color::Rgb(205, 214, 244);
const SUBTEXT0: Color = Color::Rgb(166, 173, 200);
const GREEN: Color = Color::Rgb(166, 227, 161);
const BLUE: Color = Color::Rgb(137, 180, 250);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const PEACH: Color = Color::Rgb(250, 179, 135);

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Editor
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_editor(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.mode == Mode::Help {
        draw_help(frame);
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (words, blocks) = app
        .document
        .as_ref()
        .map(|d| (d.word_count(), d.block_count()))
        .unwrap_or((0, 0));

    let title_text = format!(" Folio - {} [{} words, {} blocks]", app.title(), words, blocks);

    let title_bar = Paragraph::new(title_text).style(Style::default().fg(TEXT).bg(SURFACE0));

    frame.render_widget(title_bar, area);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Editor");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = CursorState::from_editor(&app.editor);
    let selection = app.editor.selection().filter(|s| s.is_expanded());

    let mut lines: Vec<Line> = Vec::new();
    for row in 0..cursor.line_count() {
        let Some(path) = cursor.block(row) else {
            continue;
        };
        let Ok(node) = app.editor.node(path) else {
            continue;
        };
        let (gutter, gutter_style) = gutter(app, path, node);
        let mut spans = vec![Span::styled(gutter, gutter_style)];
        spans.extend(block_spans(path, node, selection));
        lines.push(Line::from(spans));
    }

    // Scroll to keep the cursor cell visible
    let (row, col) = cursor.cursor();
    let column = cursor
        .block(row)
        .and_then(|path| app.editor.node(path).ok().map(|node| (path, node)))
        .map(|(path, node)| caret_column(&gutter(app, path, node).0, cursor.line(row).unwrap_or(""), col))
        .unwrap_or(0);
    let scroll_offset = scroll_to(row, inner.height);
    let scroll_x = scroll_to(column, inner.width);

    let paragraph = Paragraph::new(lines).scroll((to_cells(scroll_offset), to_cells(scroll_x)));
    frame.render_widget(paragraph, inner);

    if app.mode == Mode::Normal {
        if let Some(position) = caret_position(inner, column.saturating_sub(scroll_x), row.saturating_sub(scroll_offset)) {
            frame.set_cursor_position(position);
        }
    }
}

/// First visible index so that `index` fits in a view `size` cells long
fn scroll_to(index: usize, size: u16) -> usize {
    let size = usize::from(size);
    if index >= size {
        index - size + 1
    } else {
        0
    }
}

fn to_cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Display column of the caret: the gutter plus the first `col` chars of
/// the line, counted in terminal cells
fn caret_column(gutter: &str, line: &str, col: usize) -> usize {
    let prefix: String = line.chars().take(col).collect();
    gutter.width() + prefix.width()
}

/// Terminal cell for a caret at (`column`, `row`) inside `area`, clamped to
/// its last column and row
fn caret_position(area: Rect, column: usize, row: usize) -> Option<Position> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    let x = area.x.saturating_add(to_cells(column)).min(area.right().saturating_sub(1));
    let y = area.y.saturating_add(to_cells(row)).min(area.bottom().saturating_sub(1));
    Some(Position::new(x, y))
}

/// Prefix shown before a block: code bar, bullet or item number
fn gutter(app: &App, path: &Path, node: &Node) -> (String, Style) {
    match node.kind() {
        Some(ElementType::Code) => ("│ ".to_string(), Style::default().fg(SURFACE1)),
        Some(ElementType::ListItem) => {
            let parent = app.editor.parent(path).ok();
            let depth = path.len().saturating_sub(2);
            let indent = "  ".repeat(depth);
            match parent.as_ref().and_then(|(parent, _)| parent.kind()) {
                Some(ElementType::NumberedList) => {
                    let number = path.index().unwrap_or(0) + 1;
                    (format!("{indent}{number}. "), Style::default().fg(PEACH))
                }
                _ => (format!("{indent}• "), Style::default().fg(PEACH)),
            }
        }
        _ => (String::new(), Style::default()),
    }
}

fn block_spans<'a>(path: &Path, node: &'a Node, selection: Option<&Range>) -> Vec<Span<'a>> {
    let code_block = node.kind() == Some(&ElementType::Code);
    let mut spans = Vec::new();
    for (index, child) in node.children().iter().enumerate() {
        let Some(text) = child.as_text() else {
            continue;
        };
        let style = leaf_style(text, code_block);
        let leaf = path.child(index);

        // Split the leaf where the selection starts and ends
        let (from, to) = selected_span(&leaf, text, selection);
        let chars: Vec<char> = text.text.chars().collect();
        let pieces = [(0, from, false), (from, to, true), (to, chars.len(), false)];
        for (start, end, selected) in pieces {
            if start >= end {
                continue;
            }
            let piece: String = chars[start..end].iter().collect();
            let style = if selected { style.bg(SURFACE1) } else { style };
            spans.push(Span::styled(piece, style));
        }
    }
    spans
}

/// Char range of `text` covered by the selection, empty if none
fn selected_span(leaf: &Path, text: &Text, selection: Option<&Range>) -> (usize, usize) {
    let Some(selection) = selection else {
        return (0, 0);
    };
    let (start, end) = selection.edges();
    let leaf_start = Point::new(leaf.clone(), 0);
    let leaf_end = Point::new(leaf.clone(), text.len());
    if end.is_before(&leaf_start) || start.is_after(&leaf_end) {
        return (0, 0);
    }
    let from = if start.path == *leaf { start.offset } else { 0 };
    let to = if end.path == *leaf { end.offset } else { text.len() };
    (from, to.max(from))
}

fn leaf_style(text: &Text, code_block: bool) -> Style {
    let mut style = Style::default().fg(if code_block { GREEN } else { TEXT });
    if text.has_mark(mark::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if text.has_mark(mark::ITALIC) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if text.has_mark(mark::UNDERLINE) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if text.has_mark(mark::CODE) {
        style = style.fg(GREEN);
    }
    style
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "EDIT",
        Mode::Help => "HELP",
    };

    let active: Vec<&str> = [mark::BOLD, mark::ITALIC, mark::UNDERLINE]
        .into_iter()
        .filter(|m| format::is_mark_active(&app.editor, m))
        .collect();
    let block_kind = if format::is_block_active(&app.editor, &ElementType::Code) {
        "code"
    } else if format::is_block_active(&app.editor, &ElementType::BulletedList) {
        "bulleted-list"
    } else if format::is_block_active(&app.editor, &ElementType::NumberedList) {
        "numbered-list"
    } else {
        "paragraph"
    };

    let status = app.status_message.as_deref().unwrap_or("");
    let help_hint = "Ctrl+` code | Ctrl+B bold | Ctrl+S export | Ctrl+Q quit | F1 help";

    let (row, col) = app.cursor_pos();
    let status_text = format!(
        " {} | {} {} | {}:{} | {}",
        mode_str,
        block_kind,
        active.join("+"),
        row + 1,
        col + 1,
        if status.is_empty() { help_hint } else { status },
    );

    let status_bar = Paragraph::new(status_text).style(Style::default().fg(SUBTEXT0).bg(SURFACE0));

    frame.render_widget(status_bar, area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 22, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BLUE))
        .title("Help (press any key to close)");

    let heading = Style::default().fg(MAUVE).add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Formatting", heading)),
        Line::from("  Ctrl+`     Toggle code block (also Ctrl+Space)"),
        Line::from("  Ctrl+B     Toggle bold"),
        Line::from("  Ctrl+I     Toggle italic"),
        Line::from("  Ctrl+U     Toggle underline"),
        Line::from("  Ctrl+L     Toggle bulleted list"),
        Line::from("  Ctrl+O     Toggle numbered list"),
        Line::from(""),
        Line::from(Span::styled("Editing", heading)),
        Line::from("  Ctrl+Z     Undo"),
        Line::from("  Ctrl+Y     Redo"),
        Line::from("  Ctrl+A     Select all"),
        Line::from("  Shift+Arrows  Extend selection"),
        Line::from("  Ctrl+Left/Right  Move by word"),
        Line::from(""),
        Line::from(Span::styled("File", heading)),
        Line::from("  Ctrl+S     Export document as JSON"),
        Line::from("  Ctrl+Q     Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(SUBTEXT0))),
    ];

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_column_counts_cells() {
        assert_eq!(caret_column("", "abc", 2), 2);
        // Wide chars take two cells, the offset still counts chars
        assert_eq!(caret_column("", "🙂a", 1), 2);
        assert_eq!(caret_column("", "日本語", 3), 6);
        assert_eq!(caret_column("• ", "x", 1), 3);
        assert_eq!(caret_column("  12. ", "é", 1), 7);
        // Past the end of the line stops at the line's width
        assert_eq!(caret_column("│ ", "ab", 10), 4);
    }

    #[test]
    fn test_caret_position_stays_inside_area() {
        let area = Rect::new(1, 1, 10, 5);
        assert_eq!(caret_position(area, 3, 2), Some(Position::new(4, 3)));
        assert_eq!(caret_position(area, 50, 2), Some(Position::new(10, 3)));
        assert_eq!(caret_position(area, 3, 99), Some(Position::new(4, 5)));
        assert_eq!(caret_position(area, 100_000, 100_000), Some(Position::new(10, 5)));
        assert_eq!(caret_position(Rect::new(0, 0, 0, 3), 0, 0), None);

        let edge = Rect::new(u16::MAX - 2, 0, 2, 1);
        assert_eq!(caret_position(edge, 70_000, 0), Some(Position::new(u16::MAX - 1, 0)));
    }

    #[test]
    fn test_scroll_keeps_index_in_view() {
        assert_eq!(scroll_to(3, 10), 0);
        assert_eq!(scroll_to(10, 10), 1);
        assert_eq!(scroll_to(25, 10), 16);
        assert_eq!(scroll_to(4, 0), 5);
        assert_eq!(to_cells(70_000), u16::MAX);
    }
}
