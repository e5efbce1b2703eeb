//! The crossterm front end: raw mode, key translation, bindings, the
//! double-buffered display and the minibuffer prompts.

pub mod color;
pub mod display;
pub mod event_handler;
pub mod events;
pub mod input_prompt;
pub mod keybinds;
pub mod prompt;
pub mod raw;
pub mod render;
