use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::core::app::EditorApp;
use crate::core::id::SessionId;
use crate::core::session::Session;
use crate::core::utf8::{grapheme_width, visual_width_up_to};
use crate::terminal::color::Palette;
use crate::terminal::prompt::PromptState;

pub use crate::terminal::color::Color;

/// Header line of the results pane
pub const OUTPUT_HEADER: &str = "Output:";

/// Represents a single cell on the terminal screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    /// If true, this cell is covered by the previous wide character and should be skipped
    pub hidden: bool,
}

impl Cell {
    pub(crate) fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self {
            ch,
            fg,
            bg,
            hidden: false,
        }
    }

    fn hidden(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
            hidden: true,
        }
    }

    pub fn empty() -> Self {
        Self::new(' ', Color::Reset, Color::Reset)
    }
}

/// Represents the state of the entire screen
#[derive(Clone, Debug)]
pub struct ScreenBuffer {
    pub cells: Vec<Cell>,
    pub width: u16,
    pub height: u16,
}

impl ScreenBuffer {
    fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Cell::empty(); (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::empty();
        }
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            self.cells[idx] = cell;
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            Some(&self.cells[idx])
        } else {
            None
        }
    }

    fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            let idx = (y as usize) * (self.width as usize) + (x as usize);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Paint a whole row with one background
    fn fill_row(&mut self, y: u16, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
    }

    /// Write `text` from column `x`, clipped at `max_x`; returns the next column
    fn put_str(&mut self, x: u16, y: u16, max_x: u16, text: &str, fg: Color, bg: Color) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let w = crate::core::utf8::char_width(ch) as u16;
            if w == 0 {
                continue;
            }
            if col + w > max_x {
                break;
            }
            self.set(col, y, Cell::new(ch, fg, bg));
            if w == 2 {
                self.set(col + 1, y, Cell::hidden(bg));
            }
            col += w;
        }
        col
    }
}

/// Screen rows assigned to each region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub tab_row: u16,
    pub text_top: u16,
    pub text_height: u16,
    pub separator_row: u16,
    pub output_top: u16,
    pub output_height: u16,
    pub status_row: u16,
}

impl Layout {
    /// The results pane shrinks before the text area does
    pub fn compute(rows: u16, output_height: usize) -> Self {
        // tab bar and status line
        let available = rows.saturating_sub(2);
        let output_height = (output_height.min(u16::MAX as usize) as u16)
            .min(available.saturating_sub(2) / 2);
        let text_height = available.saturating_sub(output_height + 1);
        let separator_row = 1 + text_height;
        Self {
            tab_row: 0,
            text_top: 1,
            text_height,
            separator_row,
            output_top: separator_row + 1,
            output_height,
            status_row: rows.saturating_sub(1),
        }
    }
}

/// Manages the terminal display and rendering
pub struct Display {
    /// Terminal dimensions (cols, rows)
    pub terminal_size: (u16, u16),
    /// Whether the screen must be recomputed
    pub dirty: bool,
    /// Whether a full screen clear is needed (e.g. after resize)
    pub needs_full_redraw: bool,
    /// Current status message to display
    pub message: String,
    /// Current key sequence being built (e.g., "C-x -")
    pub key_sequence: String,
    /// Front buffer (currently displayed)
    pub front_buffer: ScreenBuffer,
    /// Back buffer (being drawn to)
    pub back_buffer: ScreenBuffer,
    pub palette: Palette,
    /// Where the terminal cursor is placed after drawing
    pub cursor_pos: Option<(u16, u16)>,
    /// Active prompt state for minibuffer input
    pub prompt_state: Option<PromptState>,
    /// First visible (line, column) per session
    scroll: HashMap<SessionId, (usize, usize)>,
}

impl Display {
    /// Initialize the display system with specified dimensions
    pub fn new(width: u16, height: u16, palette: Palette) -> Self {
        Self {
            terminal_size: (width, height),
            dirty: true,
            needs_full_redraw: true,
            message: String::new(),
            key_sequence: String::new(),
            front_buffer: ScreenBuffer::new(width, height),
            back_buffer: ScreenBuffer::new(width, height),
            palette,
            cursor_pos: None,
            prompt_state: None,
            scroll: HashMap::new(),
        }
    }

    /// Initialize the display system with terminal detection (for terminal mode)
    pub fn new_terminal() -> Result<Self, Box<dyn std::error::Error>> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(Self::new(cols, rows, Palette::detect()))
    }

    /// Set the current key sequence state
    pub fn set_key_sequence(&mut self, seq: String) {
        if self.key_sequence != seq {
            self.key_sequence = seq;
            self.dirty = true;
        }
    }

    pub fn set_prompt(&mut self, prompt: Option<PromptState>) {
        self.prompt_state = prompt;
        self.dirty = true;
    }

    /// Update terminal size
    pub fn update_size(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 {
            return;
        }
        self.terminal_size = (cols, rows);
        // fresh buffers; the full redraw repaints everything
        self.front_buffer = ScreenBuffer::new(cols, rows);
        self.back_buffer = ScreenBuffer::new(cols, rows);
        self.dirty = true;
        self.needs_full_redraw = true;
    }

    /// Draw the editor state into the back buffer
    pub fn render(&mut self, app: &EditorApp) -> Result<(), Box<dyn std::error::Error>> {
        let message = app.message.clone().unwrap_or_default();
        if self.message != message {
            self.message = message;
            self.dirty = true;
        }
        if !self.dirty {
            return Ok(());
        }

        self.back_buffer.clear();
        self.cursor_pos = None;
        let layout = Layout::compute(self.terminal_size.1, app.options.output_height);

        self.draw_tab_bar(app, layout.tab_row);
        self.draw_session(app.sessions.active(), app.options.tab_width, &layout);
        self.draw_output(&app.output, app.options.tab_width, &layout);
        self.draw_status(app.sessions.active(), &layout);

        self.validate_buffer_synchronization()?;
        self.dirty = false;
        Ok(())
    }

    /// Session titles; the active one is highlighted and always visible
    fn draw_tab_bar(&mut self, app: &EditorApp, row: u16) {
        let p = self.palette;
        let width = self.terminal_size.0;
        self.back_buffer.fill_row(row, p.tab_fg, p.tab_bg);

        let labels: Vec<String> = app
            .sessions
            .iter()
            .map(|s| format!(" {} ", s.title()))
            .collect();
        let active = app.sessions.active_index();

        // scroll the strip so the active tab fits
        let mut first = 0;
        while first < active {
            let span: usize = labels[first..=active]
                .iter()
                .map(|l| l.chars().count() + 1)
                .sum();
            if span <= width as usize {
                break;
            }
            first += 1;
        }

        let mut x = 0;
        for (idx, label) in labels.iter().enumerate().skip(first) {
            let (fg, bg) = if idx == active {
                (p.active_tab_fg, p.active_tab_bg)
            } else {
                (p.tab_fg, p.tab_bg)
            };
            x = self.back_buffer.put_str(x, row, width, label, fg, bg);
            x = self.back_buffer.put_str(x, row, width, "│", p.tab_fg, p.tab_bg);
            if x >= width {
                break;
            }
        }
    }

    /// Keep the cursor inside the viewport, returning the first visible (line, column)
    fn scroll_into_view(&mut self, session: &Session, cursor_x: usize, height: usize, width: usize) -> (usize, usize) {
        let (mut top, mut left) = self.scroll.get(&session.id).copied().unwrap_or((0, 0));
        let line = session.cursor_line();
        if line < top {
            top = line;
        } else if height > 0 && line >= top + height {
            top = line + 1 - height;
        }
        if cursor_x < left {
            left = cursor_x;
        } else if width > 0 && cursor_x >= left + width {
            left = cursor_x + 1 - width;
        }
        self.scroll.insert(session.id, (top, left));
        (top, left)
    }

    /// Gutter, text with tab expansion, selection and cursor
    fn draw_session(&mut self, session: &Session, tab_width: usize, layout: &Layout) {
        let p = self.palette;
        let width = self.terminal_size.0;
        let buffer = &session.buffer;

        let digits = buffer.line_count().max(1).to_string().len();
        let gutter = (digits + 1) as u16;
        let text_width = width.saturating_sub(gutter) as usize;

        let cursor_line = session.cursor_line();
        let cursor_line_start = buffer.line_to_byte(cursor_line).unwrap_or(0);
        let cursor_text = buffer.line(cursor_line).unwrap_or_default();
        let cursor_x = visual_width_up_to(
            &cursor_text,
            session.cursor - cursor_line_start,
            tab_width,
        );
        let (top, left) =
            self.scroll_into_view(session, cursor_x, layout.text_height as usize, text_width);
        let selection = session.selection();

        for row in 0..layout.text_height {
            let y = layout.text_top + row;
            self.back_buffer.fill_row(y, p.fg, p.bg);
            let line_idx = top + row as usize;
            let Some(text) = buffer.line(line_idx) else {
                continue;
            };
            let number = format!("{:>width$} ", line_idx + 1, width = digits);
            self.back_buffer.put_str(0, y, gutter, &number, p.gutter_fg, p.bg);

            let line_start = buffer.line_to_byte(line_idx).unwrap_or(0);
            let mut visual = 0;
            for (idx, grapheme) in text.grapheme_indices(true) {
                let pos = line_start + idx;
                let selected = selection.is_some_and(|(start, end)| pos >= start && pos < end);
                let bg = if selected { p.selection_bg } else { p.bg };
                let (glyph, w) = if grapheme == "\t" {
                    let w = tab_width.max(1) - visual % tab_width.max(1);
                    (' ', w)
                } else {
                    let Some(ch) = grapheme.chars().next() else {
                        continue;
                    };
                    (ch, grapheme_width(grapheme))
                };
                for i in 0..w {
                    let Some(col) = (visual + i).checked_sub(left) else {
                        continue;
                    };
                    if col >= text_width {
                        break;
                    }
                    let x = gutter + col as u16;
                    let cell = if i == 0 || grapheme == "\t" {
                        Cell::new(glyph, p.fg, bg)
                    } else {
                        Cell::hidden(bg)
                    };
                    self.back_buffer.set(x, y, cell);
                }
                visual += w;
            }
        }

        if self.prompt_state.is_none() {
            let row = cursor_line.saturating_sub(top) as u16;
            let col = cursor_x.saturating_sub(left) as u16;
            let (x, y) = (gutter + col, layout.text_top + row);
            if let Some(cell) = self.back_buffer.get_mut(x, y) {
                cell.fg = p.cursor_fg;
                cell.bg = p.cursor_bg;
            }
            self.cursor_pos = Some((x.min(width.saturating_sub(1)), y));
        }
    }

    /// Separator line and the tail of the results pane
    fn draw_output(&mut self, output: &str, tab_width: usize, layout: &Layout) {
        let p = self.palette;
        let width = self.terminal_size.0;
        self.back_buffer.fill_row(layout.separator_row, p.separator_fg, p.bg);
        let header = format!("{} ", OUTPUT_HEADER);
        let x = self
            .back_buffer
            .put_str(0, layout.separator_row, width, &header, p.separator_fg, p.bg);
        for col in x..width {
            self.back_buffer
                .set(col, layout.separator_row, Cell::new('─', p.separator_fg, p.bg));
        }

        let fg = if output.starts_with("Error:") {
            p.error_fg
        } else {
            p.output_fg
        };
        let lines: Vec<&str> = output.lines().collect();
        let shown = lines.len().saturating_sub(layout.output_height as usize);
        for row in 0..layout.output_height {
            let y = layout.output_top + row;
            self.back_buffer.fill_row(y, fg, p.bg);
            if let Some(line) = lines.get(shown + row as usize) {
                let expanded = expand_tabs(line, tab_width);
                self.back_buffer.put_str(0, y, width, &expanded, fg, p.bg);
            }
        }
    }

    /// Prompt, pending key sequence, or message on the left; position on the right
    fn draw_status(&mut self, session: &Session, layout: &Layout) {
        let p = self.palette;
        let width = self.terminal_size.0;
        let y = layout.status_row;
        self.back_buffer.fill_row(y, p.status_fg, p.status_bg);

        if let Some(prompt) = &self.prompt_state {
            let x = self
                .back_buffer
                .put_str(0, y, width, &prompt.prompt, p.status_fg, p.status_bg);
            self.back_buffer
                .put_str(x, y, width, &prompt.input, p.status_fg, p.status_bg);
            let before: usize = prompt.input[..prompt.cursor]
                .chars()
                .map(crate::core::utf8::char_width)
                .sum();
            let cx = (x as usize + before).min(width.saturating_sub(1) as usize) as u16;
            self.cursor_pos = Some((cx, y));
            return;
        }

        let position = format!(
            " Ln {}, Col {} ",
            session.cursor_line() + 1,
            session.cursor_column() + 1
        );
        let right = width.saturating_sub(position.chars().count() as u16);
        let left = if self.key_sequence.is_empty() {
            &self.message
        } else {
            &self.key_sequence
        };
        let fg = if left.starts_with("Error") {
            p.error_fg
        } else {
            p.status_fg
        };
        self.back_buffer.put_str(1, y, right, left, fg, p.status_bg);
        self.back_buffer
            .put_str(right, y, width, &position, p.status_fg, p.status_bg);
    }

    fn validate_buffer_synchronization(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.front_buffer.width != self.back_buffer.width
            || self.front_buffer.height != self.back_buffer.height
        {
            return Err("Buffer dimensions mismatch during synchronization".into());
        }
        if self.back_buffer.width != self.terminal_size.0
            || self.back_buffer.height != self.terminal_size.1
        {
            return Err("Back buffer dimensions don't match terminal size".into());
        }
        Ok(())
    }

    /// Make the drawn frame current once it has reached the terminal
    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.front_buffer, &mut self.back_buffer);
        self.back_buffer.clear();
        self.needs_full_redraw = false;
    }
}

/// Replace tabs with spaces up to the next tab stop
fn expand_tabs(line: &str, tab_width: usize) -> String {
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for g in line.graphemes(true) {
        if g == "\t" {
            let n = tab_width - col % tab_width;
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
        } else {
            out.push_str(g);
            col += grapheme_width(g);
        }
    }
    out
}
