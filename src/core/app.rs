//! This module defines the central `EditorApp` structure: the open sessions,
//! the console scripts write to, the results pane and the command table.

use std::path::{Path, PathBuf};

use crate::config::{Config, EditorOptions};
use crate::core::autopair::AutoPair;
use crate::core::command::CommandRegistry;
use crate::core::id::SessionId;
use crate::core::persistence::{self, PersistError};
use crate::core::sandbox::{
    Console, ExecutionResult, InputProvider, LogSink, Sandbox, ScriptedInput,
};
use crate::core::sessions::SessionCollection;

/// Extension given to save-as names that have none
pub const DEFAULT_EXTENSION: &str = "zy";

/// The root application state
pub struct EditorApp {
    pub sessions: SessionCollection,
    /// Stand-in for standard output while a script runs
    pub console: Console,
    /// Answers `input()` calls; the terminal front end installs a modal prompt
    pub input_provider: Box<dyn InputProvider>,
    /// Results pane contents
    pub output: String,
    pub options: EditorOptions,
    pub autopair: AutoPair,
    pub sandbox: Sandbox,
    pub commands: CommandRegistry,
    /// Status message to display to user
    pub message: Option<String>,
    /// Dispatch depth counter for recursion prevention
    pub dispatch_depth: usize,
}

impl EditorApp {
    /// One empty session, default options, all commands registered
    pub fn new() -> Self {
        Self::with_options(EditorOptions::default())
    }

    pub fn with_options(options: EditorOptions) -> Self {
        let mut app = Self {
            sessions: SessionCollection::new(),
            console: Console::new(Box::new(LogSink)),
            input_provider: Box::new(ScriptedInput::default()),
            output: String::new(),
            autopair: AutoPair::new(options.auto_pair, options.pair_delete),
            sandbox: Sandbox::new(options.script_input),
            options,
            commands: CommandRegistry::default(),
            message: None,
            dispatch_depth: 0,
        };
        crate::core::commands::register_all(&mut app.commands);
        app
    }

    /// Build from configuration and open the given files.
    ///
    /// Files that fail to open are reported in the status message. When at
    /// least one opens, the initial empty session is dropped.
    pub fn initialize_with_config(config: &Config, files: &[PathBuf]) -> Self {
        let mut app = Self::with_options(EditorOptions::from_config(config));
        let mut opened = false;
        for path in files {
            match app.open_file(path) {
                Ok(_) => opened = true,
                Err(err) => app.message = Some(format!("Error: {}", err)),
            }
        }
        if opened {
            app.sessions.discard_untouched(SessionId(0));
        }
        app
    }

    /// Read `path` into a new active session
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<SessionId, PersistError> {
        let path = path.as_ref();
        let text = persistence::open(path)?;
        Ok(self.sessions.open_session(path, &text))
    }

    /// Save the active session to its own path; `Ok(false)` when it has none
    pub fn save_active(&mut self) -> Result<bool, PersistError> {
        let Some(path) = self.sessions.active().file_path.clone() else {
            return Ok(false);
        };
        self.save_active_as(&path)?;
        Ok(true)
    }

    /// Save the active session to `path` and bind it there
    pub fn save_active_as(&mut self, path: &Path) -> Result<(), PersistError> {
        let text = self.sessions.active().text();
        persistence::save(path, &text)?;
        self.sessions.mark_active_saved(path);
        Ok(())
    }

    /// Run the active session's text and put the result in the results pane
    pub fn run_active(&mut self) -> ExecutionResult {
        let source = self.sessions.active().text();
        let result = self
            .sandbox
            .execute(&source, &mut self.console, self.input_provider.as_mut());
        self.output = result.render();
        result
    }
}

/// Append the default extension when `name` has none
pub fn with_default_extension(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

impl Default for EditorApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_new() {
        let app = EditorApp::new();
        assert_eq!(app.sessions.len(), 1);
        assert!(app.commands.contains("run-script"));
        assert!(app.output.is_empty());
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(with_default_extension("demo"), PathBuf::from("demo.zy"));
        assert_eq!(with_default_extension("demo.txt"), PathBuf::from("demo.txt"));
    }

    #[test]
    fn test_initialize_opens_files_and_drops_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.zy");
        std::fs::write(&path, "print(1)").unwrap();

        let app = EditorApp::initialize_with_config(&Config::default(), &[path.clone()]);
        assert_eq!(app.sessions.len(), 1);
        assert_eq!(app.sessions.active().file_path.as_deref(), Some(path.as_path()));
        assert!(!app.sessions.active().dirty);
    }

    #[test]
    fn test_initialize_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let app =
            EditorApp::initialize_with_config(&Config::default(), &[dir.path().join("none.zy")]);
        assert_eq!(app.sessions.len(), 1);
        assert!(app.message.as_deref().is_some_and(|m| m.starts_with("Error:")));
    }

    #[test]
    fn test_save_without_path_reports_false() {
        let mut app = EditorApp::new();
        assert!(!app.save_active().unwrap());
    }

    #[test]
    fn test_run_active_replaces_output() {
        let mut app = EditorApp::new();
        app.output = "stale".into();
        app.sessions.edit_active(|s| s.insert_str("print('hi')"));
        let result = app.run_active();
        assert!(!result.is_error());
        assert_eq!(app.output, "hi\n");
    }
}
