//! Completion of minibuffer prompts, shared by every front end

use std::path::PathBuf;

use crate::core::app::{EditorApp, with_default_extension};
use crate::core::dispatcher::{ConfirmAction, DispatchResult, InputAction};

/// Finish a command that asked for a line of text.
///
/// An empty answer cancels. The result may itself be a further prompt.
pub fn handle_prompt_action(app: &mut EditorApp, action: InputAction, input: String) -> DispatchResult {
    let input = input.trim();
    if input.is_empty() {
        if action == InputAction::SaveAsThenClose {
            // declining the path still closes, matching a "no" to the save question
            app.sessions.close_active();
        }
        return DispatchResult::Success;
    }

    match action {
        InputAction::OpenFile => {
            let path = PathBuf::from(input);
            match app.open_file(&path) {
                Ok(_) => app.message = Some(format!("Opened {}", path.display())),
                Err(err) => report_io_error(app, "open", &err),
            }
        }
        InputAction::SaveAs => {
            save_as(app, input);
        }
        InputAction::SaveAsThenClose => {
            save_as(app, input);
            app.sessions.close_active();
        }
    }
    DispatchResult::Success
}

/// Finish a command that asked a yes/no question
pub fn handle_confirm_action(app: &mut EditorApp, action: ConfirmAction, yes: bool) -> DispatchResult {
    match action {
        ConfirmAction::CloseSession => {
            if !yes {
                app.sessions.close_active();
                return DispatchResult::Success;
            }
            match app.save_active() {
                Ok(true) => {
                    app.message = Some(format!("Wrote {}", app.sessions.active().display_name()));
                    app.sessions.close_active();
                    DispatchResult::Success
                }
                Ok(false) => DispatchResult::NeedsInput {
                    prompt: "Save as: ".to_string(),
                    action: InputAction::SaveAsThenClose,
                },
                Err(err) => {
                    report_io_error(app, "save", &err);
                    app.sessions.close_active();
                    DispatchResult::Success
                }
            }
        }
        ConfirmAction::Exit => {
            if yes {
                DispatchResult::Exit
            } else {
                DispatchResult::Success
            }
        }
    }
}

fn save_as(app: &mut EditorApp, name: &str) {
    let path = with_default_extension(name);
    match app.save_active_as(&path) {
        Ok(()) => app.message = Some(format!("Wrote {}", path.display())),
        Err(err) => report_io_error(app, "save", &err),
    }
}

fn report_io_error(app: &mut EditorApp, op: &str, err: &dyn std::error::Error) {
    tracing::error!(target: "persistence", op, %err, "io_failed");
    app.message = Some(format!("Error: {}", err));
}
