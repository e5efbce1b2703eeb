//! The headless editing engine of zypy: sessions and their buffers, the
//! command table and dispatcher, file persistence and the script sandbox.
//! Nothing here touches the terminal.

pub mod app;
pub mod autopair;
pub mod buffer;
pub mod command;
pub mod commands;
pub mod dispatcher;
pub mod id;
pub mod input;
pub mod persistence;
pub mod prompt;
pub mod sandbox;
pub mod script;
pub mod session;
pub mod sessions;
pub mod undo_group;
pub mod utf8;
