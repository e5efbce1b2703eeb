use crate::core::app::EditorApp;
/// Basic editing commands
use crate::core::command::Command;
use crate::core::dispatcher::DispatchResult;

/// Insert a line break
#[derive(Clone)]
pub struct InsertNewline;

impl Command for InsertNewline {
    fn name(&self) -> &'static str {
        "insert-newline"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        app.sessions
            .edit_active(|s| s.insert_str(&"\n".repeat(count)));
        DispatchResult::Success
    }
}

/// Insert a literal tab; the display expands it to `tab_width` columns
#[derive(Clone)]
pub struct InsertTab;

impl Command for InsertTab {
    fn name(&self) -> &'static str {
        "insert-tab"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        app.sessions
            .edit_active(|s| s.insert_str(&"\t".repeat(count)));
        DispatchResult::Success
    }
}

/// Backspace: an empty auto-pair goes as a unit, otherwise one grapheme
/// (or the selection)
#[derive(Clone)]
pub struct DeletePreviousChar;

impl Command for DeletePreviousChar {
    fn name(&self) -> &'static str {
        "delete-previous-character"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        let autopair = app.autopair;
        for _ in 0..count {
            app.sessions.edit_active(|s| {
                let paired = match autopair.handle_backspace(s) {
                    Ok(paired) => paired,
                    Err(err) => {
                        tracing::warn!(target: "autopair", %err, "pair_delete_fault");
                        false
                    }
                };
                if !paired {
                    s.delete_backward();
                }
            });
        }
        DispatchResult::Success
    }
}

#[derive(Clone)]
pub struct DeleteNextChar;

impl Command for DeleteNextChar {
    fn name(&self) -> &'static str {
        "delete-next-character"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        for _ in 0..count {
            app.sessions.edit_active(|s| s.delete_forward());
        }
        DispatchResult::Success
    }
}

/// Empty the active buffer (undoable) and the results pane
#[derive(Clone)]
pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.sessions.edit_active(|s| s.clear());
        app.output.clear();
        DispatchResult::Success
    }
}

/// Start a selection at the cursor
#[derive(Clone)]
pub struct SetMark;

impl Command for SetMark {
    fn name(&self) -> &'static str {
        "set-mark"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.sessions.active_mut().set_mark();
        app.message = Some("Mark set".to_string());
        DispatchResult::Success
    }
}

#[derive(Clone)]
pub struct SelectAll;

impl Command for SelectAll {
    fn name(&self) -> &'static str {
        "select-all"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.sessions.active_mut().select_all();
        DispatchResult::Success
    }
}

/// Drop the selection and any status message
#[derive(Clone)]
pub struct KeyboardQuit;

impl Command for KeyboardQuit {
    fn name(&self) -> &'static str {
        "keyboard-quit"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.sessions.active_mut().clear_selection();
        app.message = Some("Quit".to_string());
        DispatchResult::Success
    }
}
