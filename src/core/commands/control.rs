use crate::core::app::EditorApp;
/// Application control commands
use crate::core::command::Command;
use crate::core::dispatcher::{ConfirmAction, DispatchResult};

/// Exit, asking once when any session has unsaved changes
#[derive(Clone)]
pub struct Exit;

impl Command for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        if app.sessions.any_dirty() {
            return DispatchResult::NeedsConfirm {
                prompt: "Modified sessions exist; exit anyway? (y/n) ".to_string(),
                action: ConfirmAction::Exit,
            };
        }
        DispatchResult::Exit
    }
}
