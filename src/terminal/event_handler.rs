//! Terminal event handler module
//!
//! This module processes terminal events (input, resize) and dispatches
//! them to the prompt or the command layer.

use crate::core::app::EditorApp;
use crate::core::dispatcher::{DispatchResult, dispatch};
use crate::core::input::InputEvent;
use crate::core::prompt::{handle_confirm_action, handle_prompt_action};
use crate::terminal::display::Display;
use crate::terminal::events::EditorEvent;
use crate::terminal::keybinds::KeyBindingManager;
use crate::terminal::prompt::{PromptKind, PromptResult, PromptState};

/// Processes a single editor event and returns true if exit is requested.
pub fn process_terminal_event(
    app: &mut EditorApp,
    display: &mut Display,
    keybind_manager: &mut KeyBindingManager,
    event: EditorEvent,
) -> Result<bool, Box<dyn std::error::Error>> {
    match event {
        EditorEvent::Input(key) => {
            if display.prompt_state.is_some() {
                return Ok(handle_prompt_input(app, display, &key));
            }

            let (command_name_opt, char_to_insert_opt, is_complete) =
                keybind_manager.process_key(&key);

            // Display partial key sequences in status bar
            display.set_key_sequence(keybind_manager.current_sequence());

            if is_complete {
                app.message = None;
                let result = dispatch(app, command_name_opt.as_deref(), char_to_insert_opt, 1);
                return Ok(apply_result(app, display, result));
            }
        }
        EditorEvent::Resize(cols, rows) => {
            display.update_size(cols, rows);
        }
        EditorEvent::None => {}
    }
    Ok(false)
}

/// Act on a dispatch result; true means exit
fn apply_result(app: &mut EditorApp, display: &mut Display, result: DispatchResult) -> bool {
    display.dirty = true;
    match result {
        DispatchResult::Exit => return true,
        DispatchResult::Success | DispatchResult::NotHandled => {}
        DispatchResult::Info(msg) => app.message = Some(msg),
        DispatchResult::NeedsInput { prompt, action } => {
            display.set_prompt(Some(PromptState::new(PromptKind::Input(action), prompt)));
        }
        DispatchResult::NeedsConfirm { prompt, action } => {
            display.set_prompt(Some(PromptState::new(PromptKind::Confirm(action), prompt)));
        }
    }
    false
}

/// Feed a key to the open minibuffer prompt
fn handle_prompt_input(app: &mut EditorApp, display: &mut Display, key: &InputEvent) -> bool {
    let Some(mut state) = display.prompt_state.take() else {
        return false;
    };
    display.dirty = true;

    match (state.kind, state.handle_key(key)) {
        (_, PromptResult::Continue) => {
            display.prompt_state = Some(state);
            false
        }
        (_, PromptResult::Cancelled) => {
            app.message = Some("Quit".to_string());
            false
        }
        (PromptKind::Input(action), PromptResult::Submitted(text)) => {
            let result = handle_prompt_action(app, action, text);
            apply_result(app, display, result)
        }
        (PromptKind::Confirm(action), PromptResult::Answered(yes)) => {
            let result = handle_confirm_action(app, action, yes);
            apply_result(app, display, result)
        }
        // script input is read by its own modal loop, never through here
        (kind, result) => {
            tracing::warn!(target: "prompt", ?kind, ?result, "unexpected_prompt_result");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::input::Key;
    use crate::terminal::color::Palette;
    use tempfile::TempDir;

    struct Harness {
        app: EditorApp,
        display: Display,
        keys: KeyBindingManager,
    }

    impl Harness {
        fn new() -> Self {
            let mut config = Config::default();
            crate::user_config::configure(&mut config);
            let mut keys = KeyBindingManager::new();
            for (seq, cmd) in &config.keybindings {
                keys.bind(seq, cmd.clone());
            }
            Self {
                app: EditorApp::initialize_with_config(&config, &[]),
                display: Display::new(60, 20, Palette::dark()),
                keys,
            }
        }

        fn press(&mut self, key: Key) -> bool {
            let ctrl = matches!(key, Key::Ctrl(_));
            let event = InputEvent {
                key,
                shift: false,
                alt: false,
                ctrl,
            };
            process_terminal_event(
                &mut self.app,
                &mut self.display,
                &mut self.keys,
                EditorEvent::Input(event),
            )
            .unwrap()
        }

        fn type_str(&mut self, text: &str) {
            for c in text.chars() {
                self.press(Key::Char(c));
            }
        }
    }

    #[test]
    fn test_typing_and_exit() {
        let mut h = Harness::new();
        h.type_str("print(1");
        assert_eq!(h.app.sessions.active().text(), "print(1)");
        h.press(Key::Ctrl('z'));
        assert!(h.app.sessions.active().text().len() < "print(1)".len());
    }

    #[test]
    fn test_exit_on_clean_sessions() {
        let mut h = Harness::new();
        assert!(h.press(Key::Ctrl('q')));
    }

    #[test]
    fn test_exit_with_dirty_session_asks_first() {
        let mut h = Harness::new();
        h.type_str("x");
        assert!(!h.press(Key::Ctrl('q')));
        assert!(h.display.prompt_state.is_some());
        assert!(!h.press(Key::Char('n')));
        assert!(h.display.prompt_state.is_none());
        h.press(Key::Ctrl('q'));
        assert!(h.press(Key::Char('y')));
    }

    #[test]
    fn test_close_dirty_session_declined() {
        let mut h = Harness::new();
        h.type_str("x");
        h.press(Key::Ctrl('n'));
        h.press(Key::Ctrl('w'));
        // the new session is clean, so it closes without asking
        assert!(h.display.prompt_state.is_none());
        assert_eq!(h.app.sessions.len(), 1);

        h.press(Key::Ctrl('w'));
        let prompt = h.display.prompt_state.as_ref().unwrap();
        assert!(prompt.prompt.starts_with("Save changes to Untitled?"));
        h.press(Key::Char('n'));
        assert_eq!(h.app.sessions.len(), 1);
        assert!(!h.app.sessions.active().dirty);
    }

    #[test]
    fn test_open_file_through_prompt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.zy");
        std::fs::write(&path, "print('hi')").unwrap();

        let mut h = Harness::new();
        h.press(Key::Ctrl('o'));
        h.type_str(&path.display().to_string());
        h.press(Key::Enter);
        assert!(h.display.prompt_state.is_none());
        assert_eq!(h.app.sessions.len(), 2);
        assert_eq!(h.app.sessions.active().text(), "print('hi')");

        h.press(Key::F(5));
        assert_eq!(h.app.output, "hi\n");
    }

    #[test]
    fn test_prompt_escape_cancels() {
        let mut h = Harness::new();
        h.press(Key::Ctrl('o'));
        h.type_str("abc");
        h.press(Key::Esc);
        assert!(h.display.prompt_state.is_none());
        assert_eq!(h.app.message.as_deref(), Some("Quit"));
        assert_eq!(h.app.sessions.len(), 1);
    }

    #[test]
    fn test_resize() {
        let mut h = Harness::new();
        process_terminal_event(
            &mut h.app,
            &mut h.display,
            &mut h.keys,
            EditorEvent::Resize(100, 40),
        )
        .unwrap();
        assert_eq!(h.display.terminal_size, (100, 40));
        assert!(h.display.needs_full_redraw);
    }
}
