use crate::core::app::EditorApp;
use crate::core::command::Command;
use crate::core::dispatcher::DispatchResult;

/// Undo the last edit group
#[derive(Clone)]
pub struct Undo;

impl Command for Undo {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        let mut undone = false;
        for _ in 0..count {
            if !app.sessions.edit_active(|s| s.undo()) {
                break;
            }
            undone = true;
        }
        if undone {
            DispatchResult::Success
        } else {
            DispatchResult::Info("Nothing to undo".to_string())
        }
    }
}

/// Redo the last undone edit group
#[derive(Clone)]
pub struct Redo;

impl Command for Redo {
    fn name(&self) -> &'static str {
        "redo"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        let mut redone = false;
        for _ in 0..count {
            if !app.sessions.edit_active(|s| s.redo()) {
                break;
            }
            redone = true;
        }
        if redone {
            DispatchResult::Success
        } else {
            DispatchResult::Info("Nothing to redo".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatcher::dispatch;

    #[test]
    fn test_pair_insert_undoes_in_one_step() {
        let mut app = EditorApp::new();
        dispatch(&mut app, None, Some('"'), 1);
        assert_eq!(app.sessions.active().text(), "\"\"");
        assert_eq!(Undo.execute(&mut app, 1), DispatchResult::Success);
        assert_eq!(app.sessions.active().text(), "");
        assert_eq!(Redo.execute(&mut app, 1), DispatchResult::Success);
        assert_eq!(app.sessions.active().text(), "\"\"");
    }

    #[test]
    fn test_nothing_to_undo() {
        let mut app = EditorApp::new();
        assert_eq!(
            Undo.execute(&mut app, 1),
            DispatchResult::Info("Nothing to undo".to_string())
        );
    }
}
