//! Terminal rendering module
//!
//! This module handles the low-level rendering of the display buffer to the terminal,
//! using ANSI escape codes and crossterm for cursor control.

use std::io::Write;

use crate::terminal::display::Display;

/// Write the display's back buffer to the terminal, diffing against the front buffer
///
/// Only changed cells are written unless a full redraw is pending (e.g. after
/// resize). Color codes are emitted only when they change.
pub fn render_display_to_terminal(
    display: &Display,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    // Hide cursor during update to prevent flickering
    write!(out, "\x1b[?25l")?;

    let needs_full = display.needs_full_redraw;
    if needs_full {
        write!(out, "\x1b[2J\x1b[H")?;
    }

    let front_buffer = &display.front_buffer;
    let back_buffer = &display.back_buffer;

    let mut last_fg = String::new();
    let mut last_bg = String::new();
    let mut cursor_moved = false;

    for y in 0..display.terminal_size.1 {
        for x in 0..display.terminal_size.0 {
            let Some(new_cell) = back_buffer.get(x, y) else {
                continue;
            };

            if !needs_full && front_buffer.get(x, y) == Some(new_cell) {
                continue;
            }
            if new_cell.hidden {
                continue;
            }

            write!(out, "\x1b[{};{}H", y + 1, x + 1)?;
            cursor_moved = true;

            let fg_code = new_cell.fg.to_ansi_fg_code();
            let bg_code = new_cell.bg.to_ansi_bg_code();
            if fg_code != last_fg || bg_code != last_bg {
                write!(out, "\x1b[{}m\x1b[{}m", fg_code, bg_code)?;
                last_fg = fg_code;
                last_bg = bg_code;
            }

            write!(out, "{}", new_cell.ch)?;
        }
    }

    if cursor_moved {
        write!(out, "\x1b[0m")?;
    }

    {
        use crossterm::{QueueableCommand, cursor};
        if let Some((cx, cy)) = display.cursor_pos {
            out.queue(cursor::MoveTo(cx, cy))?;
            out.queue(cursor::Show)?;
        } else {
            out.queue(cursor::Hide)?;
        }
    }

    out.flush()?;
    Ok(())
}
