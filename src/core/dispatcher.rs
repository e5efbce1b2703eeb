use crate::core::app::EditorApp;

/// Follow-up that needs a line of text from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Open a file into a new session
    OpenFile,
    /// Save the active session to a new path
    SaveAs,
    /// Save to a new path, then close the session whatever the outcome
    SaveAsThenClose,
}

/// Follow-up that needs a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Offer to save a modified session before closing it
    CloseSession,
    /// Leave even though sessions have unsaved changes
    Exit,
}

/// Result of command dispatch
#[derive(Debug, PartialEq)]
pub enum DispatchResult {
    /// Command executed successfully
    Success,
    /// Command not found/handled
    NotHandled,
    /// Exit requested
    Exit,
    /// Informational message to display
    Info(String),
    /// Command needs user input before completing
    NeedsInput { prompt: String, action: InputAction },
    /// Command needs a yes/no answer before completing
    NeedsConfirm { prompt: String, action: ConfirmAction },
}

/// Commands may dispatch other commands; this bounds the nesting
const MAX_DISPATCH_DEPTH: usize = 16;

/// Run a named command, or insert a typed character, `count` times.
///
/// Character insertion goes through the auto-pair engine first; anything it
/// does not consume is inserted as is.
pub fn dispatch(
    app: &mut EditorApp,
    command_name: Option<&str>,
    insert_char: Option<char>,
    count: usize,
) -> DispatchResult {
    if app.dispatch_depth > MAX_DISPATCH_DEPTH {
        return DispatchResult::Info("Command recursion limit exceeded".to_string());
    }
    app.dispatch_depth += 1;

    let result = dispatch_inner(app, command_name, insert_char, count);

    app.dispatch_depth -= 1;
    result
}

fn dispatch_inner(
    app: &mut EditorApp,
    command_name: Option<&str>,
    insert_char: Option<char>,
    count: usize,
) -> DispatchResult {
    if let Some(c) = insert_char {
        for _ in 0..count.max(1) {
            self_insert(app, c);
        }
        return DispatchResult::Success;
    }

    if let Some(name) = command_name {
        let Some(command) = app.commands.get(name) else {
            tracing::warn!(target: "dispatch", command = name, "unknown_command");
            return DispatchResult::NotHandled;
        };
        tracing::debug!(target: "dispatch", command = name, count, "dispatch");
        return command.execute(app, count.max(1));
    }

    DispatchResult::NotHandled
}

fn self_insert(app: &mut EditorApp, c: char) {
    let autopair = app.autopair;
    let consumed = app
        .sessions
        .edit_active(|session| match autopair.handle_char(session, c) {
            Ok(consumed) => consumed,
            Err(err) => {
                tracing::warn!(target: "autopair", %err, ch = %c, "autopair_fault");
                false
            }
        });
    if !consumed {
        app.sessions.edit_active(|session| session.insert_char(c));
    }
}
