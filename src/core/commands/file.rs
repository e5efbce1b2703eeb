use crate::core::app::EditorApp;
/// File operation commands
use crate::core::command::Command;
use crate::core::dispatcher::{DispatchResult, InputAction};

/// Open a file into a new session (prompts for the path)
#[derive(Clone)]
pub struct OpenFile;

impl Command for OpenFile {
    fn name(&self) -> &'static str {
        "open-file"
    }

    fn execute(&self, _app: &mut EditorApp, _count: usize) -> DispatchResult {
        DispatchResult::NeedsInput {
            prompt: "Open file: ".to_string(),
            action: InputAction::OpenFile,
        }
    }
}

/// Save the active session; behaves as save-as when it has no path yet
#[derive(Clone)]
pub struct SaveFile;

impl Command for SaveFile {
    fn name(&self) -> &'static str {
        "save-file"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        match app.save_active() {
            Ok(true) => {
                app.message = Some(format!("Wrote {}", app.sessions.active().display_name()));
                DispatchResult::Success
            }
            Ok(false) => SaveFileAs.execute(app, 1),
            Err(err) => {
                tracing::error!(target: "persistence", %err, "save_failed");
                app.message = Some(format!("Error: {}", err));
                DispatchResult::Success
            }
        }
    }
}

/// Save the active session under a new path (prompts)
#[derive(Clone)]
pub struct SaveFileAs;

impl Command for SaveFileAs {
    fn name(&self) -> &'static str {
        "save-file-as"
    }

    fn execute(&self, _app: &mut EditorApp, _count: usize) -> DispatchResult {
        DispatchResult::NeedsInput {
            prompt: "Save as: ".to_string(),
            action: InputAction::SaveAs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_unsaved_prompts_for_path() {
        let mut app = EditorApp::new();
        assert_eq!(
            SaveFile.execute(&mut app, 1),
            DispatchResult::NeedsInput {
                prompt: "Save as: ".to_string(),
                action: InputAction::SaveAs,
            }
        );
    }

    #[test]
    fn test_save_with_path_writes_and_cleans() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.zy");
        std::fs::write(&path, "").unwrap();
        let mut app = EditorApp::new();
        app.open_file(&path).unwrap();
        app.sessions.edit_active(|s| s.insert_str("print(3)"));
        assert_eq!(app.sessions.active().title(), "*a.zy");

        assert_eq!(SaveFile.execute(&mut app, 1), DispatchResult::Success);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(3)");
        assert_eq!(app.sessions.active().title(), "a.zy");
    }

    #[test]
    fn test_save_failure_keeps_dirty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone").join("a.zy");
        let mut app = EditorApp::new();
        app.sessions.edit_active(|s| s.insert_str("x"));
        app.sessions.active_mut().file_path = Some(path);

        SaveFile.execute(&mut app, 1);
        assert!(app.sessions.active().dirty);
        assert!(app.message.as_deref().is_some_and(|m| m.starts_with("Error:")));
    }
}
