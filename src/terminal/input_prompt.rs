//! Answers a running script's `input()` from the status line.
//!
//! The script runs on the UI thread, so the prompt runs its own small event
//! loop until Enter or Esc and then hands control back to the interpreter.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use crossterm::event::{self, Event, KeyEventKind};

use crate::core::sandbox::InputProvider;
use crate::terminal::color::Palette;
use crate::terminal::events::crossterm_key_to_input;
use crate::terminal::prompt::{PromptKind, PromptResult, PromptState};

pub struct TerminalInputPrompt {
    palette: Palette,
    /// Raised whenever the prompt has drawn over the screen
    redraw: Rc<Cell<bool>>,
}

impl TerminalInputPrompt {
    pub fn new(palette: Palette, redraw: Rc<Cell<bool>>) -> Self {
        Self { palette, redraw }
    }

    fn draw(&self, state: &PromptState) -> std::io::Result<()> {
        let (cols, rows) = crossterm::terminal::size()?;
        let (line, cursor) = prompt_line(state, cols);
        let mut out = std::io::stdout();
        write!(
            out,
            "\x1b[{};1H\x1b[{}m\x1b[{}m{}\x1b[0m",
            rows,
            self.palette.status_fg.to_ansi_fg_code(),
            self.palette.status_bg.to_ansi_bg_code(),
            line
        )?;
        crossterm::queue!(
            out,
            crossterm::cursor::MoveTo(cursor, rows.saturating_sub(1)),
            crossterm::cursor::Show
        )?;
        out.flush()
    }

    fn read(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut state = PromptState::new(PromptKind::Script, prompt.replace(['\n', '\r'], " "));
        loop {
            self.draw(&state)?;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    match state.handle_key(&crossterm_key_to_input(key)) {
                        PromptResult::Submitted(line) => return Ok(Some(line)),
                        PromptResult::Cancelled => return Ok(None),
                        PromptResult::Continue | PromptResult::Answered(_) => {}
                    }
                }
                _ => {}
            }
        }
    }
}

impl InputProvider for TerminalInputPrompt {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.redraw.set(true);
        match self.read(prompt) {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(target: "sandbox", %err, "input_prompt_failed");
                None
            }
        }
    }
}

/// The status line text padded to `cols`, and the cursor column
fn prompt_line(state: &PromptState, cols: u16) -> (String, u16) {
    let width = cols as usize;
    let mut line = String::new();
    let mut used = 0;
    let mut cursor = 0;
    let input_start = state.prompt.len();
    let text = format!("{}{}", state.prompt, state.input);
    for (idx, ch) in text.char_indices() {
        if idx == input_start + state.cursor {
            cursor = used;
        }
        let w = crate::core::utf8::char_width(ch);
        if used + w > width {
            break;
        }
        line.push(ch);
        used += w;
    }
    if input_start + state.cursor >= text.len() {
        cursor = used;
    }
    line.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    (line, cursor.min(width.saturating_sub(1)) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_line_pads_and_places_cursor() {
        let mut state = PromptState::new(PromptKind::Script, "Name: ");
        state.input = "Ada".into();
        state.cursor = 3;
        let (line, cursor) = prompt_line(&state, 20);
        assert_eq!(line, format!("{:<20}", "Name: Ada"));
        assert_eq!(cursor, 9);

        state.cursor = 1;
        assert_eq!(prompt_line(&state, 20).1, 7);
    }

    #[test]
    fn test_prompt_line_truncates() {
        let state = PromptState::new(PromptKind::Script, "a very long prompt");
        let (line, cursor) = prompt_line(&state, 6);
        assert_eq!(line, "a very");
        assert_eq!(cursor, 5);
    }
}
