//! Buffer: Pure data structure holding text content and its edit history
//! No cursor, path, or dirty state (those belong to Session)
//!
//! Uses ropey Rope for all text.
//! - Rope provides O(log n) line operations natively

use ropey::Rope;
use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::undo_group::{UndoGroup, UndoGrouper};

/// Maximum undo stack depth to prevent OOM from unbounded undo history
const MAX_UNDO_DEPTH: usize = 10_000;

/// Represents an edit operation for undo/redo
#[derive(Debug, Clone)]
pub enum Edit {
    /// Insert: (position, text inserted)
    Insert { pos: usize, text: Rope },
    /// Delete: (position, text deleted)
    Delete { pos: usize, text: Rope },
}

/// Buffer: text plus grouped undo/redo history
#[derive(Debug)]
pub struct Buffer {
    /// Text content stored in a Rope (O(log n) operations)
    rope: Rope,
    /// Version counter, bumped on every content change (edits, undo, redo)
    pub version: u64,
    /// Undo stack (VecDeque for O(1) pop_front when capping depth)
    pub undo_stack: VecDeque<UndoGroup>,
    /// Redo stack
    pub redo_stack: VecDeque<UndoGroup>,
    /// Undo grouper for smart grouping
    pub undo_grouper: UndoGrouper,
    /// Open explicit group; edits land here until `group` returns
    pending_group: Option<UndoGroup>,
}

impl Buffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_string("")
    }

    /// Create a buffer from a string
    pub fn from_string(content: impl AsRef<str>) -> Self {
        Self {
            rope: Rope::from_str(content.as_ref()),
            version: 0,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            undo_grouper: UndoGrouper::new(),
            pending_group: None,
        }
    }

    // ==================== Content Access ====================

    /// Get total length in bytes
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Get entire content as string
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Get a byte range of text as string
    pub fn slice_to_string(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_bytes();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return String::new();
        }
        self.rope.byte_slice(start..end).to_string()
    }

    /// Get character starting at byte position
    pub fn char_at(&self, byte_pos: usize) -> Option<char> {
        if byte_pos >= self.rope.len_bytes() || !self.is_char_boundary(byte_pos) {
            return None;
        }
        self.rope.get_char(self.rope.byte_to_char(byte_pos))
    }

    /// Get character ending at byte position
    pub fn char_before(&self, byte_pos: usize) -> Option<char> {
        if byte_pos == 0 || byte_pos > self.rope.len_bytes() || !self.is_char_boundary(byte_pos) {
            return None;
        }
        let char_idx = self.rope.byte_to_char(byte_pos);
        self.rope.get_char(char_idx - 1)
    }

    /// True when `byte_pos` sits between two chars (or at either end)
    pub fn is_char_boundary(&self, byte_pos: usize) -> bool {
        if byte_pos > self.rope.len_bytes() {
            return false;
        }
        self.rope.char_to_byte(self.rope.byte_to_char(byte_pos)) == byte_pos
    }

    /// Byte offset of the grapheme boundary before `pos`
    pub fn prev_grapheme_boundary(&self, pos: usize) -> usize {
        let pos = pos.min(self.len());
        if pos == 0 {
            return 0;
        }
        let line_idx = self.rope.byte_to_line(pos - 1);
        let line_start = self.rope.line_to_byte(line_idx);
        let line = self.rope.line(line_idx).to_string();
        let rel = pos - line_start;
        line.grapheme_indices(true)
            .map(|(i, _)| i)
            .take_while(|&i| i < rel)
            .last()
            .map_or(line_start, |i| line_start + i)
    }

    /// Byte offset of the grapheme boundary after `pos`
    pub fn next_grapheme_boundary(&self, pos: usize) -> usize {
        let len = self.len();
        if pos >= len {
            return len;
        }
        let line_idx = self.rope.byte_to_line(pos);
        let line_start = self.rope.line_to_byte(line_idx);
        let line = self.rope.line(line_idx).to_string();
        let rel = pos - line_start;
        line.grapheme_indices(true)
            .map(|(i, g)| i + g.len())
            .find(|&end| end > rel)
            .map_or(len, |end| line_start + end)
    }

    // ==================== Line Operations (O(log n) via Rope) ====================

    /// Get number of lines in buffer
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get byte offset for start of a line
    pub fn line_to_byte(&self, line_idx: usize) -> Option<usize> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line_to_byte(line_idx))
    }

    /// Get which line a byte offset is on
    pub fn byte_to_line(&self, byte_offset: usize) -> usize {
        if byte_offset >= self.rope.len_bytes() {
            return self.rope.len_lines().saturating_sub(1);
        }
        self.rope.byte_to_line(byte_offset)
    }

    /// Get content of a specific line (without newline)
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Byte offset of the end of a line's content (before its newline)
    pub fn line_end(&self, line_idx: usize) -> Option<usize> {
        let start = self.line_to_byte(line_idx)?;
        Some(start + self.line(line_idx)?.len())
    }

    // ==================== Editing Operations ====================

    /// Insert text at byte position
    pub fn insert(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = pos.min(self.rope.len_bytes());
        let char_idx = self.rope.byte_to_char(pos);
        self.rope.insert(char_idx, text);
        self.mark_changed();

        self.push_edit(Edit::Insert {
            pos,
            text: Rope::from_str(text),
        });
        self.redo_stack.clear();
    }

    /// Insert a single character
    pub fn insert_char(&mut self, pos: usize, ch: char) {
        let mut tmp = [0u8; 4];
        self.insert(pos, ch.encode_utf8(&mut tmp));
    }

    /// Delete `len` bytes at byte position
    pub fn delete(&mut self, pos: usize, len: usize) {
        if len == 0 || pos >= self.rope.len_bytes() {
            return;
        }
        let actual_len = len.min(self.rope.len_bytes() - pos);
        let start_char = self.rope.byte_to_char(pos);
        let end_char = self.rope.byte_to_char(pos + actual_len);

        let deleted_text = Rope::from(self.rope.slice(start_char..end_char));

        self.rope.remove(start_char..end_char);
        self.mark_changed();

        self.push_edit(Edit::Delete {
            pos,
            text: deleted_text,
        });
        self.redo_stack.clear();
    }

    /// Remove everything
    pub fn clear(&mut self) {
        let len = self.len();
        self.group(|buf| buf.delete(0, len));
    }

    // ==================== Undo/Redo ====================

    /// Run `f` with all of its edits recorded as one undo group
    pub fn group<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.undo_grouper.break_group();
        self.pending_group = Some(UndoGroup::new());
        let result = f(self);
        if let Some(group) = self.pending_group.take() {
            if !group.is_empty() {
                self.push_group(group);
            }
        }
        self.undo_grouper.break_group();
        result
    }

    /// Start a fresh undo group with the next edit
    pub fn break_undo_group(&mut self) {
        self.undo_grouper.break_group();
    }

    /// Undo the last edit group. Returns the byte position the cursor should take.
    pub fn undo(&mut self) -> Option<usize> {
        let group = self.undo_stack.pop_back()?;
        let mut cursor = 0;
        // Apply edits in reverse order for undo
        for edit in group.edits.iter().rev() {
            match edit {
                Edit::Insert { pos, text } => {
                    let start_char = self.rope.byte_to_char(*pos);
                    let end_char = self.rope.byte_to_char(*pos + text.len_bytes());
                    self.rope.remove(start_char..end_char);
                    cursor = *pos;
                }
                Edit::Delete { pos, text } => {
                    self.insert_rope(*pos, text);
                    cursor = *pos + text.len_bytes();
                }
            }
        }
        self.redo_stack.push_back(group);
        self.undo_grouper.break_group();
        self.mark_changed();
        Some(cursor)
    }

    /// Redo the last undone edit group. Returns the byte position the cursor should take.
    pub fn redo(&mut self) -> Option<usize> {
        let group = self.redo_stack.pop_back()?;
        let mut cursor = 0;
        for edit in &group.edits {
            match edit {
                Edit::Insert { pos, text } => {
                    self.insert_rope(*pos, text);
                    cursor = *pos + text.len_bytes();
                }
                Edit::Delete { pos, text } => {
                    let start_char = self.rope.byte_to_char(*pos);
                    let end_char = self.rope.byte_to_char(*pos + text.len_bytes());
                    self.rope.remove(start_char..end_char);
                    cursor = *pos;
                }
            }
        }
        self.undo_stack.push_back(group);
        self.undo_grouper.break_group();
        self.mark_changed();
        Some(cursor)
    }

    /// Insert a rope chunk by chunk to avoid a full intermediate String
    fn insert_rope(&mut self, pos: usize, text: &Rope) {
        let mut current_idx = self.rope.byte_to_char(pos);
        for chunk in text.chunks() {
            self.rope.insert(current_idx, chunk);
            current_idx += chunk.chars().count();
        }
    }

    // ==================== State Management ====================

    /// Push an edit to the undo stack, with smart grouping
    fn push_edit(&mut self, edit: Edit) {
        if let Some(group) = self.pending_group.as_mut() {
            group.add_edit(edit);
            return;
        }

        let should_group = match self.undo_stack.back().and_then(|g| g.edits.last()) {
            Some(prev_edit) => self.undo_grouper.should_group(prev_edit, &edit),
            None => false,
        };

        if should_group {
            if let Some(group) = self.undo_stack.back_mut() {
                group.add_edit(edit);
            }
        } else {
            let mut group = UndoGroup::new();
            group.add_edit(edit);
            self.push_group(group);
        }
    }

    fn push_group(&mut self, group: UndoGroup) {
        if self.undo_stack.len() >= MAX_UNDO_DEPTH {
            self.undo_stack.pop_front(); // O(1) discard oldest
        }
        self.undo_stack.push_back(group);
    }

    fn mark_changed(&mut self) {
        self.version += 1;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1); // Empty buffer has 1 line
        assert_eq!(buf.version, 0);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buf = Buffer::new();
        buf.insert(0, "Hello, World!");
        assert_eq!(buf.to_string(), "Hello, World!");
        assert_eq!(buf.version, 1);

        buf.delete(0, 7);
        assert_eq!(buf.to_string(), "World!");
        assert_eq!(buf.version, 2);
    }

    #[test]
    fn test_line_operations() {
        let buf = Buffer::from_string("Line 1\nLine 2\nLine 3");

        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(0), Some("Line 1".to_string()));
        assert_eq!(buf.line(2), Some("Line 3".to_string()));
        assert_eq!(buf.line_to_byte(1), Some(7));
        assert_eq!(buf.line_end(1), Some(13));
        assert_eq!(buf.byte_to_line(8), 1);
    }

    #[test]
    fn test_undo_redo() {
        let mut buf = Buffer::new();
        buf.insert(0, "Hello");

        assert_eq!(buf.undo(), Some(0));
        assert_eq!(buf.to_string(), "");

        assert_eq!(buf.redo(), Some(5));
        assert_eq!(buf.to_string(), "Hello");
        assert!(buf.redo().is_none());
    }

    #[test]
    fn test_typing_word_is_one_undo_step() {
        let mut buf = Buffer::new();
        for (i, ch) in "hello".chars().enumerate() {
            buf.insert_char(i, ch);
        }
        assert_eq!(buf.undo_stack.len(), 1);
        buf.undo();
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn test_explicit_group() {
        let mut buf = Buffer::from_string("abc");
        buf.group(|b| {
            b.insert(3, ")");
            b.insert(0, "(");
        });
        assert_eq!(buf.to_string(), "(abc)");
        assert_eq!(buf.undo_stack.len(), 1);
        buf.undo();
        assert_eq!(buf.to_string(), "abc");
    }

    #[test]
    fn test_grapheme_boundaries() {
        let buf = Buffer::from_string("ae\u{0301}\nb");
        // "e" + combining acute is one grapheme, 3 bytes
        assert_eq!(buf.next_grapheme_boundary(1), 4);
        assert_eq!(buf.prev_grapheme_boundary(4), 1);
        // Stepping over the newline
        assert_eq!(buf.prev_grapheme_boundary(5), 4);
        assert_eq!(buf.next_grapheme_boundary(4), 5);
        assert_eq!(buf.next_grapheme_boundary(6), 6);
        assert_eq!(buf.prev_grapheme_boundary(0), 0);
    }

    #[test]
    fn test_char_neighbours() {
        let buf = Buffer::from_string("(世)");
        assert_eq!(buf.char_before(1), Some('('));
        assert_eq!(buf.char_at(1), Some('世'));
        assert_eq!(buf.char_at(4), Some(')'));
        assert!(!buf.is_char_boundary(2));
        assert_eq!(buf.char_at(2), None);
        assert_eq!(buf.char_before(0), None);
    }
}
