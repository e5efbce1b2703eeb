//! Session (tab) commands

use crate::core::app::EditorApp;
use crate::core::command::Command;
use crate::core::dispatcher::{ConfirmAction, DispatchResult};

#[derive(Clone)]
pub struct NewSession;

impl Command for NewSession {
    fn name(&self) -> &'static str {
        "new-session"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        app.sessions.create_session();
        DispatchResult::Success
    }
}

/// Close the active session, offering to save it first when modified
#[derive(Clone)]
pub struct CloseSession;

impl Command for CloseSession {
    fn name(&self) -> &'static str {
        "close-session"
    }

    fn execute(&self, app: &mut EditorApp, _count: usize) -> DispatchResult {
        let session = app.sessions.active();
        if session.dirty {
            return DispatchResult::NeedsConfirm {
                prompt: format!("Save changes to {}? (y/n) ", session.display_name()),
                action: ConfirmAction::CloseSession,
            };
        }
        app.sessions.close_active();
        DispatchResult::Success
    }
}

#[derive(Clone)]
pub struct NextSession;

impl Command for NextSession {
    fn name(&self) -> &'static str {
        "next-session"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        for _ in 0..count {
            app.sessions.select_next();
        }
        DispatchResult::Success
    }
}

#[derive(Clone)]
pub struct PreviousSession;

impl Command for PreviousSession {
    fn name(&self) -> &'static str {
        "previous-session"
    }

    fn execute(&self, app: &mut EditorApp, count: usize) -> DispatchResult {
        for _ in 0..count {
            app.sessions.select_previous();
        }
        DispatchResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_clean_session_closes_immediately() {
        let mut app = EditorApp::new();
        NewSession.execute(&mut app, 1);
        assert_eq!(app.sessions.len(), 2);
        assert_eq!(CloseSession.execute(&mut app, 1), DispatchResult::Success);
        assert_eq!(app.sessions.len(), 1);
    }

    #[test]
    fn test_close_dirty_session_asks() {
        let mut app = EditorApp::new();
        app.sessions.edit_active(|s| s.insert_char('x'));
        let result = CloseSession.execute(&mut app, 1);
        assert_eq!(
            result,
            DispatchResult::NeedsConfirm {
                prompt: "Save changes to Untitled? (y/n) ".to_string(),
                action: ConfirmAction::CloseSession,
            }
        );
        assert_eq!(app.sessions.len(), 1);
        assert!(app.sessions.active().dirty);
    }

    #[test]
    fn test_next_and_previous_cycle() {
        let mut app = EditorApp::new();
        NewSession.execute(&mut app, 1);
        NewSession.execute(&mut app, 1);
        assert_eq!(app.sessions.active_index(), 2);
        NextSession.execute(&mut app, 1);
        assert_eq!(app.sessions.active_index(), 0);
        PreviousSession.execute(&mut app, 1);
        assert_eq!(app.sessions.active_index(), 2);
    }
}
