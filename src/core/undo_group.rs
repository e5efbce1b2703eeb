//! Undo Grouping
//!
//! Groups consecutive edits that belong to the same "logical operation" so that
//! a single undo reverts a typed word rather than a single keystroke.

use super::buffer::Edit;

/// A group of edits that should be undone/redone together
#[derive(Debug, Clone, Default)]
pub struct UndoGroup {
    /// The edits that belong to this group
    pub edits: Vec<Edit>,
    /// Optional description of what this group represents
    pub description: Option<String>,
}

impl UndoGroup {
    /// Create a new empty undo group
    pub fn new() -> Self {
        Self {
            edits: Vec::new(),
            description: None,
        }
    }

    /// Create an undo group with a specific description
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            edits: Vec::new(),
            description: Some(description.into()),
        }
    }

    /// Add an edit to this group
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Check if this group is empty
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Get the number of edits in this group
    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

/// Coarse character classes used to find word boundaries between edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Whitespace,
    Newline,
    Delimiter,
    Other,
}

fn classify(ch: char) -> CharClass {
    match ch {
        '\n' => CharClass::Newline,
        c if c.is_alphanumeric() || c == '_' => CharClass::Word,
        c if c.is_whitespace() => CharClass::Whitespace,
        '(' | ')' | '{' | '}' | '[' | ']' | '"' | '\'' => CharClass::Delimiter,
        _ => CharClass::Other,
    }
}

/// Determines how edits should be grouped for undo/redo operations
///
/// Adjacent single-character edits are batched until a word boundary is
/// crossed or the batch fills up. Multi-character edits always start a new group.
#[derive(Debug, Default)]
pub struct UndoGrouper {
    /// Count of consecutive small edits in current batch
    small_edit_count: usize,
    /// Set when the next edit must open a new group (cursor jumped, explicit break)
    broken: bool,
}

impl UndoGrouper {
    /// Maximum small edits to batch together
    const SMALL_EDIT_BATCH_SIZE: usize = 100;

    /// Create a new UndoGrouper
    pub fn new() -> Self {
        Self {
            small_edit_count: 0,
            broken: false,
        }
    }

    /// Force the next edit into a fresh group
    pub fn break_group(&mut self) {
        self.broken = true;
        self.small_edit_count = 0;
    }

    /// Determine if two consecutive edits should be grouped together
    pub fn should_group(&mut self, prev_edit: &Edit, curr_edit: &Edit) -> bool {
        if std::mem::take(&mut self.broken) {
            return false;
        }

        let edits_are_adjacent = match (prev_edit, curr_edit) {
            (
                Edit::Insert {
                    pos: prev_pos,
                    text: prev_text,
                },
                Edit::Insert { pos: curr_pos, .. },
            ) => *curr_pos == *prev_pos + prev_text.len_bytes(),
            (
                Edit::Delete { pos: prev_pos, .. },
                Edit::Delete {
                    pos: curr_pos,
                    text: curr_text,
                },
            ) => {
                // Forward delete keeps the position, backspace walks left
                *curr_pos == *prev_pos || *curr_pos + curr_text.len_bytes() == *prev_pos
            }
            _ => false,
        };

        let is_small_edit = match curr_edit {
            Edit::Insert { text, .. } | Edit::Delete { text, .. } => text.len_chars() <= 1,
        };

        if !edits_are_adjacent || !is_small_edit {
            self.small_edit_count = 0;
            return false;
        }

        if self.crosses_word_boundary(prev_edit, curr_edit) {
            self.small_edit_count = 1;
            return false;
        }

        self.small_edit_count += 1;
        if self.small_edit_count > Self::SMALL_EDIT_BATCH_SIZE {
            self.small_edit_count = 1;
            return false;
        }
        true
    }

    /// A word ends when typing moves from a word into whitespace or a newline
    fn crosses_word_boundary(&self, prev_edit: &Edit, curr_edit: &Edit) -> bool {
        let (Edit::Insert { text: prev, .. }, Edit::Insert { text: curr, .. }) =
            (prev_edit, curr_edit)
        else {
            return false;
        };
        let (Some(last), Some(first)) = (prev.chars().last(), curr.chars().next()) else {
            return true;
        };
        let (last, first) = (classify(last), classify(first));
        first == CharClass::Newline || (last != first && last == CharClass::Whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::Edit;

    fn ins(pos: usize, text: &str) -> Edit {
        Edit::Insert {
            pos,
            text: text.into(),
        }
    }

    #[test]
    fn test_undo_group_operations() {
        let mut group = UndoGroup::new();
        assert!(group.is_empty());

        group.add_edit(ins(0, "hello"));
        group.add_edit(ins(5, " world"));

        assert_eq!(group.len(), 2);
        assert!(!group.is_empty());

        let described = UndoGroup::with_description("wrap selection");
        assert_eq!(described.description.as_deref(), Some("wrap selection"));
    }

    #[test]
    fn test_typing_groups_within_word() {
        let mut grouper = UndoGrouper::new();
        assert!(grouper.should_group(&ins(0, "h"), &ins(1, "i")));
        assert!(grouper.should_group(&ins(1, "i"), &ins(2, " ")));
    }

    #[test]
    fn test_new_word_starts_new_group() {
        let mut grouper = UndoGrouper::new();
        assert!(!grouper.should_group(&ins(2, " "), &ins(3, "x")));
        assert!(!grouper.should_group(&ins(3, "x"), &ins(4, "\n")));
    }

    #[test]
    fn test_should_not_group_different_edit_types() {
        let mut grouper = UndoGrouper::new();
        let delete = Edit::Delete {
            pos: 0,
            text: "h".into(),
        };
        assert!(!grouper.should_group(&ins(0, "h"), &delete));
    }

    #[test]
    fn test_backspace_run_groups() {
        let mut grouper = UndoGrouper::new();
        let first = Edit::Delete {
            pos: 4,
            text: "o".into(),
        };
        let second = Edit::Delete {
            pos: 3,
            text: "l".into(),
        };
        assert!(grouper.should_group(&first, &second));
    }

    #[test]
    fn test_break_group() {
        let mut grouper = UndoGrouper::new();
        grouper.break_group();
        assert!(!grouper.should_group(&ins(0, "a"), &ins(1, "b")));
        assert!(grouper.should_group(&ins(1, "b"), &ins(2, "c")));
    }
}
