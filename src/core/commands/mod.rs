//! Command implementations for the zypy editor
//!
//! - **file**: open, save, save-as
//! - **session**: new, close, next and previous session (tabs)
//! - **editing**: newline, tab, deletion, clearing, selection
//! - **movement**: cursor navigation
//! - **undo**: undo/redo
//! - **run**: run the active session as a script
//! - **control**: exit
//!
//! All commands implement the [`Command`](crate::core::command::Command) trait.

/// Application control
pub mod control;
/// Basic editing (insert, delete, clear, selection)
pub mod editing;
/// File operations
pub mod file;
/// Cursor movement commands
pub mod movement;
/// Script execution
pub mod run;
/// Session (tab) management
pub mod session;
/// Undo/redo operations
pub mod undo;

use crate::core::command::CommandRegistry;

/// Register all commands
pub fn register_all(registry: &mut CommandRegistry) {
    use self::control::*;
    use self::editing::*;
    use self::file::*;
    use self::movement::*;
    use self::run::*;
    use self::session::*;
    use self::undo::*;

    // File
    registry.register(OpenFile);
    registry.register(SaveFile);
    registry.register(SaveFileAs);

    // Sessions
    registry.register(NewSession);
    registry.register(CloseSession);
    registry.register(NextSession);
    registry.register(PreviousSession);

    // Editing
    registry.register(InsertNewline);
    registry.register(InsertTab);
    registry.register(DeletePreviousChar);
    registry.register(DeleteNextChar);
    registry.register(Clear);
    registry.register(SetMark);
    registry.register(SelectAll);
    registry.register(KeyboardQuit);

    // Movement
    registry.register(ForwardChar);
    registry.register(BackwardChar);
    registry.register(NextLine);
    registry.register(PreviousLine);
    registry.register(BeginningOfLine);
    registry.register(EndOfLine);

    registry.register(Undo);
    registry.register(Redo);
    registry.register(RunScript);
    registry.register(Exit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bound_command_is_registered() {
        let mut registry = CommandRegistry::default();
        register_all(&mut registry);

        let mut config = crate::config::Config::default();
        crate::user_config::configure(&mut config);
        for (key, command) in &config.keybindings {
            assert!(registry.contains(command), "{} is bound to unknown {}", key, command);
        }
    }

    #[test]
    fn test_registry_names() {
        let mut registry = CommandRegistry::default();
        register_all(&mut registry);
        assert_eq!(registry.len(), 25);
        assert!(registry.names().contains(&"close-session"));
    }
}
