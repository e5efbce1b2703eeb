//! Document session: one open buffer plus its save path, dirty flag, cursor and selection.
//!
//! Cursor and anchor are byte offsets into the buffer and are kept on char
//! boundaries by every method that moves them.

use std::path::{Path, PathBuf};

use crate::core::buffer::Buffer;
use crate::core::id::SessionId;

/// Placeholder title for sessions that were never saved
pub const UNTITLED: &str = "Untitled";

/// Marker prefixed to the title while a session has unsaved changes
pub const DIRTY_MARKER: char = '*';

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub buffer: Buffer,
    /// Backing file, absent until the first save or when never opened from disk
    pub file_path: Option<PathBuf>,
    /// Unsaved changes since creation, open, or the last successful save
    pub dirty: bool,
    /// Cursor byte offset
    pub cursor: usize,
    /// Selection anchor; the selection spans anchor..cursor (either order)
    pub anchor: Option<usize>,
    /// Preferred grapheme column for vertical movement
    pub goal_column: Option<usize>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self::with_text(id, "", None)
    }

    /// A clean session bound to `path` holding `text`
    pub fn opened(id: SessionId, path: impl AsRef<Path>, text: &str) -> Self {
        Self::with_text(id, text, Some(path.as_ref().to_path_buf()))
    }

    fn with_text(id: SessionId, text: &str, file_path: Option<PathBuf>) -> Self {
        Self {
            id,
            buffer: Buffer::from_string(text),
            file_path,
            dirty: false,
            cursor: 0,
            anchor: None,
            goal_column: None,
        }
    }

    /// File name shown in the tab, without the dirty marker
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Tab title: the display name, prefixed with `*` while dirty
    pub fn title(&self) -> String {
        if self.dirty {
            format!("{}{}", DIRTY_MARKER, self.display_name())
        } else {
            self.display_name()
        }
    }

    /// Record a successful save to `path`
    pub fn mark_saved(&mut self, path: impl AsRef<Path>) {
        self.file_path = Some(path.as_ref().to_path_buf());
        self.dirty = false;
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    // ==================== Selection ====================

    /// Ordered byte range of the selection, if any
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection()
            .map(|(start, end)| self.buffer.slice_to_string(start, end))
    }

    pub fn set_mark(&mut self) {
        self.anchor = Some(self.cursor);
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.buffer.len();
    }

    /// Delete the selected text. Returns false when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        self.buffer.group(|buf| buf.delete(start, end - start));
        self.cursor = start;
        self.anchor = None;
        true
    }

    // ==================== Editing ====================

    /// Insert text at the cursor, replacing the selection
    pub fn insert_str(&mut self, text: &str) {
        self.delete_selection();
        self.buffer.insert(self.cursor, text);
        self.cursor += text.len();
        self.goal_column = None;
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut tmp));
    }

    /// Default backspace: drop the selection, or the grapheme before the cursor
    pub fn delete_backward(&mut self) {
        self.goal_column = None;
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        let start = self.buffer.prev_grapheme_boundary(self.cursor);
        self.buffer.delete(start, self.cursor - start);
        self.cursor = start;
    }

    /// Default delete: drop the selection, or the grapheme after the cursor
    pub fn delete_forward(&mut self) {
        self.goal_column = None;
        if self.delete_selection() {
            return;
        }
        let end = self.buffer.next_grapheme_boundary(self.cursor);
        self.buffer.delete(self.cursor, end - self.cursor);
    }

    /// Empty the buffer as one undoable edit
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.anchor = None;
        self.goal_column = None;
    }

    pub fn undo(&mut self) -> bool {
        let pos = self.buffer.undo();
        self.restore_cursor(pos)
    }

    pub fn redo(&mut self) -> bool {
        let pos = self.buffer.redo();
        self.restore_cursor(pos)
    }

    fn restore_cursor(&mut self, pos: Option<usize>) -> bool {
        match pos {
            Some(pos) => {
                self.cursor = pos.min(self.buffer.len());
                self.anchor = None;
                self.goal_column = None;
                true
            }
            None => false,
        }
    }

    // ==================== Movement ====================

    fn moved(&mut self) {
        self.buffer.break_undo_group();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.buffer.prev_grapheme_boundary(self.cursor);
        self.goal_column = None;
        self.moved();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.buffer.next_grapheme_boundary(self.cursor);
        self.goal_column = None;
        self.moved();
    }

    pub fn move_line_start(&mut self) {
        let line = self.buffer.byte_to_line(self.cursor);
        self.cursor = self.buffer.line_to_byte(line).unwrap_or(0);
        self.goal_column = None;
        self.moved();
    }

    pub fn move_line_end(&mut self) {
        let line = self.buffer.byte_to_line(self.cursor);
        self.cursor = self.buffer.line_end(line).unwrap_or(self.cursor);
        self.goal_column = None;
        self.moved();
    }

    pub fn move_up(&mut self) {
        let line = self.cursor_line();
        if line > 0 {
            self.move_to_line(line - 1);
        }
    }

    pub fn move_down(&mut self) {
        let line = self.cursor_line();
        if line + 1 < self.buffer.line_count() {
            self.move_to_line(line + 1);
        }
    }

    fn move_to_line(&mut self, target: usize) {
        let goal = match self.goal_column {
            Some(col) => col,
            None => self.cursor_column(),
        };
        let start = self.buffer.line_to_byte(target).unwrap_or(0);
        let text = self.buffer.line(target).unwrap_or_default();
        let offset = crate::core::utf8::grapheme_byte_index(&text, goal).unwrap_or(text.len());
        self.cursor = start + offset;
        self.goal_column = Some(goal);
        self.moved();
    }

    /// Zero-based line of the cursor
    pub fn cursor_line(&self) -> usize {
        self.buffer.byte_to_line(self.cursor)
    }

    /// Zero-based grapheme column of the cursor
    pub fn cursor_column(&self) -> usize {
        let line = self.cursor_line();
        let start = self.buffer.line_to_byte(line).unwrap_or(0);
        let before = self.buffer.slice_to_string(start, self.cursor);
        crate::core::utf8::grapheme_count(&before)
    }
}
