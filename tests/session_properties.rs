//! Editor-level properties: the session collection never empties, pairs are
//! inserted and removed whole, scripts run contained, and saved files reopen
//! byte for byte.

use std::cell::RefCell;
use std::rc::Rc;

use zypy::core::app::EditorApp;
use zypy::core::dispatcher::{DispatchResult, dispatch};
use zypy::core::prompt::{handle_confirm_action, handle_prompt_action};
use zypy::core::sandbox::{CaptureBuffer, Console, ExecutionResult, Sandbox, ScriptedInput};
use zypy::core::sessions::{SessionCollection, SessionEvent};

fn run(app: &mut EditorApp, command: &str) -> DispatchResult {
    dispatch(app, Some(command), None, 1)
}

fn type_char(app: &mut EditorApp, c: char) {
    dispatch(app, None, Some(c), 1);
}

// =============================================================================
// SESSION COLLECTION
// =============================================================================

#[test]
fn collection_is_never_empty_under_random_new_and_close() {
    let mut sessions = SessionCollection::new();
    // deterministic pseudo-random walk
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..2_000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        match seed % 3 {
            0 => {
                sessions.create_session();
            }
            1 => sessions.close_active(),
            _ => sessions.select_next(),
        }
        assert!(!sessions.is_empty());
        assert!(sessions.active_index() < sessions.len());
    }
}

#[test]
fn closing_sole_session_leaves_fresh_one() {
    let mut app = EditorApp::new();
    type_char(&mut app, 'x');
    let old_id = app.sessions.active().id;

    // dirty: asks first; answering no closes without saving
    let DispatchResult::NeedsConfirm { action, .. } = run(&mut app, "close-session") else {
        panic!("dirty session should ask before closing");
    };
    handle_confirm_action(&mut app, action, false);

    assert_eq!(app.sessions.len(), 1);
    let fresh = app.sessions.active();
    assert_ne!(fresh.id, old_id);
    assert!(fresh.buffer.is_empty());
    assert!(fresh.file_path.is_none());
    assert!(!fresh.dirty);
}

#[test]
fn next_then_previous_returns_to_start() {
    let mut sessions = SessionCollection::new();
    for _ in 0..4 {
        sessions.create_session();
    }
    for start in 0..sessions.len() {
        while sessions.active_index() != start {
            sessions.select_next();
        }
        sessions.select_next();
        sessions.select_previous();
        assert_eq!(sessions.active_index(), start);
        sessions.select_previous();
        sessions.select_next();
        assert_eq!(sessions.active_index(), start);
    }
}

#[test]
fn dirty_marker_is_announced_once() {
    let mut app = EditorApp::new();
    let titles = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&titles);
    app.sessions.subscribe(move |event| {
        if let SessionEvent::TitleChanged { title, .. } = event {
            seen.borrow_mut().push(title.clone());
        }
    });

    for c in "abc".chars() {
        type_char(&mut app, c);
    }
    run(&mut app, "insert-newline");
    assert_eq!(*titles.borrow(), vec!["*Untitled".to_string()]);
    assert_eq!(app.sessions.active().title(), "*Untitled");
}

// =============================================================================
// AUTO-PAIR
// =============================================================================

#[test]
fn opener_on_empty_buffer_inserts_pair() {
    let mut app = EditorApp::new();
    type_char(&mut app, '(');
    assert_eq!(app.sessions.active().text(), "()");
    assert_eq!(app.sessions.active().cursor, 1);
}

#[test]
fn quote_wraps_selection() {
    let mut app = EditorApp::new();
    app.sessions.edit_active(|s| s.insert_str("abc"));
    run(&mut app, "select-all");
    type_char(&mut app, '"');
    let session = app.sessions.active();
    assert_eq!(session.text(), "\"abc\"");
    assert_eq!(session.cursor, 5);
    assert!(session.selection().is_none());
}

#[test]
fn backspace_inside_empty_pair_removes_both() {
    let mut app = EditorApp::new();
    type_char(&mut app, '{');
    assert_eq!(app.sessions.active().cursor, 1);
    run(&mut app, "delete-previous-character");
    assert_eq!(app.sessions.active().text(), "");
    assert_eq!(app.sessions.active().cursor, 0);
}

#[test]
fn pair_delete_can_be_turned_off() {
    let mut config = zypy::config::Config::default();
    zypy::user_config::configure(&mut config);
    config.set("pair_delete", false);
    let mut app = EditorApp::initialize_with_config(&config, &[]);
    type_char(&mut app, '[');
    run(&mut app, "delete-previous-character");
    assert_eq!(app.sessions.active().text(), "]");
}

// =============================================================================
// EXECUTION SANDBOX
// =============================================================================

#[test]
fn print_is_captured_and_buffer_untouched() {
    let mut app = EditorApp::new();
    app.sessions.edit_active(|s| s.insert_str("print(\"hi\")"));
    let before = app.sessions.active().text();
    let version = app.sessions.active().buffer.version;

    run(&mut app, "run-script");
    assert_eq!(app.output, "hi\n");
    assert_eq!(app.sessions.active().text(), before);
    assert_eq!(app.sessions.active().buffer.version, version);
}

#[test]
fn division_by_zero_is_reported_not_raised() {
    let mut app = EditorApp::new();
    app.sessions.edit_active(|s| s.insert_str("1/0"));
    let result = app.run_active();
    assert!(result.is_error());
    assert!(app.output.contains("division by zero"), "{}", app.output);

    // the host carries on
    app.sessions.edit_active(|s| {
        s.clear();
        s.insert_str("print(2 ** 10)");
    });
    assert_eq!(app.run_active(), ExecutionResult::Output("1024\n".to_string()));
}

#[test]
fn long_expressions_and_cyclic_lists_run_to_completion() {
    let mut console = Console::new(Box::new(CaptureBuffer::default()));
    let mut input = ScriptedInput::default();
    let sandbox = Sandbox::default();

    let sum = format!("x = {}\nprint(x)", vec!["1"; 3_000].join(" + "));
    assert_eq!(
        sandbox.execute(&sum, &mut console, &mut input),
        ExecutionResult::Output("3000\n".to_string())
    );

    let cyclic = "x = [1]\nx.append(x)\nprint(x)\nprint(x == x)";
    assert_eq!(
        sandbox.execute(cyclic, &mut console, &mut input),
        ExecutionResult::Output("[1, [...]]\nTrue\n".to_string())
    );

    let deep = "x = [1]\nx.append(x)\ny = [1]\ny.append(y)\nprint(x == y)";
    let result = sandbox.execute(deep, &mut console, &mut input);
    assert!(result.render().contains("RecursionError"), "{}", result.render());
}

#[test]
fn console_sink_is_restored_after_failure() {
    let outer = CaptureBuffer::default();
    let mut console = Console::new(Box::new(outer.clone()));
    let mut input = ScriptedInput::default();

    let result = Sandbox::default().execute("print('inside')\nundefined_name", &mut console, &mut input);
    assert!(result.is_error());
    console.write("after");
    assert_eq!(outer.contents(), "after");
}

#[test]
fn script_input_reaches_provider() {
    let mut app = EditorApp::new();
    app.input_provider = Box::new(ScriptedInput::new(["Ada", "7"]));
    app.sessions.edit_active(|s| {
        s.insert_str("name = input('Name: ')\nn = int(input('N: '))\nprint(name, n * 2)")
    });
    run(&mut app, "run-script");
    assert_eq!(app.output, "Name: N: Ada 14\n");
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[test]
fn save_then_reopen_is_byte_identical() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("round.zy");
    let text = "# ünïcödé 🦀\r\nprint('a\\tb')\n\n  trailing spaces  ";

    let mut app = EditorApp::new();
    app.sessions.edit_active(|s| s.insert_str(text));
    handle_prompt_action(
        &mut app,
        zypy::core::dispatcher::InputAction::SaveAs,
        path.display().to_string(),
    );
    assert_eq!(std::fs::read(&path).unwrap(), text.as_bytes());

    app.open_file(&path).unwrap();
    assert_eq!(app.sessions.len(), 2);
    assert_eq!(app.sessions.active().text(), text);
    assert!(!app.sessions.active().dirty);
}

#[test]
fn save_clears_dirty_and_next_edit_restores_it() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("d.zy");
    std::fs::write(&path, "").unwrap();

    let mut app = EditorApp::new();
    app.open_file(&path).unwrap();
    type_char(&mut app, 'a');
    assert_eq!(app.sessions.active().title(), "*d.zy");

    assert_eq!(run(&mut app, "save-file"), DispatchResult::Success);
    assert!(!app.sessions.active().dirty);
    assert_eq!(app.sessions.active().title(), "d.zy");

    type_char(&mut app, 'b');
    type_char(&mut app, 'c');
    assert_eq!(app.sessions.active().title(), "*d.zy");
}

#[test]
fn save_without_path_prompts_for_one() {
    let mut app = EditorApp::new();
    type_char(&mut app, 'x');
    let result = run(&mut app, "save-file");
    assert!(matches!(result, DispatchResult::NeedsInput { .. }), "{:?}", result);
}
