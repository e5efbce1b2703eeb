use crate::core::app::EditorApp;
/// Cursor movement commands; an active mark stays put so the selection follows the cursor
use crate::core::command::Command;
use crate::core::dispatcher::DispatchResult;
use crate::core::session::Session;

fn repeat(app: &mut EditorApp, count: usize, step: fn(&mut Session)) -> DispatchResult {
    let session = app.sessions.active_mut();
    for _ in 0..count {
        step(session);
    }
    DispatchResult::Success
}

#[derive(Clone)]
pub struct ForwardChar;

impl Command for ForwardChar {
    fn name(&self) -> &'static str {
        "forward-character"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        repeat(app, count, Session::move_right)
    }
}

#[derive(Clone)]
pub struct BackwardChar;

impl Command for BackwardChar {
    fn name(&self) -> &'static str {
        "backward-character"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        repeat(app, count, Session::move_left)
    }
}

#[derive(Clone)]
pub struct NextLine;

impl Command for NextLine {
    fn name(&self) -> &'static str {
        "next-line"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        repeat(app, count, Session::move_down)
    }
}

#[derive(Clone)]
pub struct PreviousLine;

impl Command for PreviousLine {
    fn name(&self) -> &'static str {
        "previous-line"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        repeat(app, count, Session::move_up)
    }
}

#[derive(Clone)]
pub struct BeginningOfLine;

impl Command for BeginningOfLine {
    fn name(&self) -> &'static str {
        "beginning-of-line"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        repeat(app, 1, Session::move_line_start)
    }
}

#[derive(Clone)]
pub struct EndOfLine;

impl Command for EndOfLine {
    fn name(&self) -> &'static str {
        "end-of-line"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        repeat(app, 1, Session::move_line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_movement_keeps_goal_column() {
        let mut app = EditorApp::new();
        app.sessions.edit_active(|s| s.insert_str("abcdef\nab\nabcdef"));
        app.sessions.active_mut().cursor = 5;
        NextLine.execute(&mut app, 1);
        assert_eq!(app.sessions.active().cursor_column(), 2);
        NextLine.execute(&mut app, 1);
        assert_eq!(app.sessions.active().cursor_column(), 5);
    }

    #[test]
    fn test_mark_then_move_extends_selection() {
        let mut app = EditorApp::new();
        app.sessions.edit_active(|s| s.insert_str("hello"));
        BeginningOfLine.execute(&mut app, 1);
        app.sessions.active_mut().set_mark();
        ForwardChar.execute(&mut app, 3);
        assert_eq!(app.sessions.active().selected_text().as_deref(), Some("hel"));
        EndOfLine.execute(&mut app, 1);
        assert_eq!(app.sessions.active().cursor, 5);
    }

    #[test]
    fn test_movement_stops_at_edges() {
        let mut app = EditorApp::new();
        app.sessions.edit_active(|s| s.insert_str("ab"));
        ForwardChar.execute(&mut app, 5);
        assert_eq!(app.sessions.active().cursor, 2);
        BackwardChar.execute(&mut app, 5);
        assert_eq!(app.sessions.active().cursor, 0);
        PreviousLine.execute(&mut app, 1);
        assert_eq!(app.sessions.active().cursor, 0);
    }
}
