//! State for the minibuffer/prompt in terminal display mode.

use crate::core::dispatcher::{ConfirmAction, InputAction};
use crate::core::input::{InputEvent, Key};

/// What the answer to a prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A line of text completing a command
    Input(InputAction),
    /// A y/n answer completing a command
    Confirm(ConfirmAction),
    /// A line requested by a running script's `input()`
    Script,
}

/// Outcome of a key press in the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Continue,
    Submitted(String),
    Answered(bool),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub kind: PromptKind,
    pub prompt: String,
    pub input: String,
    /// Byte offset within `input`
    pub cursor: usize,
}

impl PromptState {
    pub fn new(kind: PromptKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            input: String::new(),
            cursor: 0,
        }
    }

    /// Process a key event in the prompt
    pub fn handle_key(&mut self, event: &InputEvent) -> PromptResult {
        if let PromptKind::Confirm(_) = self.kind {
            return match &event.key {
                Key::Char('y' | 'Y') => PromptResult::Answered(true),
                Key::Char('n' | 'N') => PromptResult::Answered(false),
                Key::Esc | Key::Ctrl('g') => PromptResult::Cancelled,
                _ => PromptResult::Continue,
            };
        }

        match &event.key {
            Key::Enter => return PromptResult::Submitted(self.input.clone()),
            Key::Esc | Key::Ctrl('g') => return PromptResult::Cancelled,
            Key::Backspace => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            Key::Left => self.cursor = self.prev_boundary(),
            Key::Right => self.cursor = self.next_boundary(),
            Key::Home | Key::Ctrl('a') => self.cursor = 0,
            Key::End | Key::Ctrl('e') => self.cursor = self.input.len(),
            Key::Ctrl('u') => {
                self.input.clear();
                self.cursor = 0;
            }
            Key::Char(c) if !event.ctrl && !event.alt => {
                self.input.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
        PromptResult::Continue
    }

    fn prev_boundary(&self) -> usize {
        self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_boundary(&self) -> usize {
        self.input[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn delete_backward(&mut self) {
        let start = self.prev_boundary();
        self.input.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn delete_forward(&mut self) {
        let end = self.next_boundary();
        self.input.replace_range(self.cursor..end, "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: Key) -> InputEvent {
        InputEvent::plain(k)
    }

    fn type_str(state: &mut PromptState, text: &str) {
        for c in text.chars() {
            state.handle_key(&key(Key::Char(c)));
        }
    }

    #[test]
    fn test_line_editing() {
        let mut state = PromptState::new(PromptKind::Input(InputAction::OpenFile), "Open: ");
        type_str(&mut state, "añb");
        assert_eq!(state.cursor, 4);
        state.handle_key(&key(Key::Left));
        state.handle_key(&key(Key::Backspace));
        assert_eq!(state.input, "ab");
        state.handle_key(&key(Key::Home));
        state.handle_key(&key(Key::Delete));
        assert_eq!(state.input, "b");
        assert_eq!(
            state.handle_key(&key(Key::Enter)),
            PromptResult::Submitted("b".to_string())
        );
    }

    #[test]
    fn test_cancel() {
        let mut state = PromptState::new(PromptKind::Script, "Name: ");
        type_str(&mut state, "x");
        assert_eq!(state.handle_key(&key(Key::Esc)), PromptResult::Cancelled);
    }

    #[test]
    fn test_confirm_answers() {
        let mut state = PromptState::new(PromptKind::Confirm(ConfirmAction::Exit), "Quit? ");
        assert_eq!(state.handle_key(&key(Key::Char('x'))), PromptResult::Continue);
        assert_eq!(
            state.handle_key(&key(Key::Char('Y'))),
            PromptResult::Answered(true)
        );
        assert_eq!(
            state.handle_key(&key(Key::Char('n'))),
            PromptResult::Answered(false)
        );
        assert!(state.input.is_empty());
    }
}
