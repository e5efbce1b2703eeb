use crate::core::input::{InputEvent, Key};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Editor events
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Input(InputEvent),
    Resize(u16, u16),
    None,
}

#[derive(Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Check for available events with a timeout
    pub fn poll(&self, timeout: Duration) -> Result<bool, Box<dyn std::error::Error>> {
        Ok(event::poll(timeout)?)
    }

    /// Read the next event without blocking
    pub fn read(&mut self) -> Result<EditorEvent, Box<dyn std::error::Error>> {
        if event::poll(Duration::from_millis(0))? {
            return Ok(match event::read()? {
                // key releases arrive on terminals with the kitty protocol
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    EditorEvent::Input(crossterm_key_to_input(key_event))
                }
                Event::Resize(cols, rows) => EditorEvent::Resize(cols, rows),
                _ => EditorEvent::None,
            });
        }
        Ok(EditorEvent::None)
    }
}

/// Normalize a crossterm key event
pub fn crossterm_key_to_input(key_event: event::KeyEvent) -> InputEvent {
    let modifiers = key_event.modifiers;

    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    let key = match key_event.code {
        // Ctrl-Space arrives as a control space; bindings call it C-@
        KeyCode::Char(' ') if ctrl && !alt => Key::Ctrl('@'),
        KeyCode::Char(c) => {
            if ctrl && !alt {
                Key::Ctrl(c)
            } else if alt && !ctrl {
                Key::Alt(c)
            } else {
                Key::Char(c)
            }
        }
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Delete => Key::Delete,
        KeyCode::F(n) => Key::F(n),
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    };

    InputEvent {
        key,
        // BackTab already carries the shift
        shift: shift && !matches!(key_event.code, KeyCode::BackTab),
        alt,
        ctrl,
    }
}
