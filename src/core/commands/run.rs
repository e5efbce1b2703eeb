use crate::core::app::EditorApp;
use crate::core::command::Command;
use crate::core::dispatcher::DispatchResult;
use crate::core::sandbox::ExecutionResult;

/// Run the active session as a script; the results pane gets its output
#[derive(Clone)]
pub struct RunScript;

impl Command for RunScript {
    fn name(&self) -> &'static str {
        "run-script"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.message = Some(match app.run_active() {
            ExecutionResult::Output(_) => "Run finished".to_string(),
            ExecutionResult::Error(err) => format!("Run failed: {}", err.kind),
        });
        DispatchResult::Success
    }
}
