//! Foundation Stress Tests
//!
//! Buffer integrity, undo/redo and UTF-8 handling under many edits, plus
//! save integrity through the persistence layer.

use zypy::core::app::EditorApp;
use zypy::core::buffer::Buffer;
use zypy::core::persistence;

/// Simple hash function for content comparison (no crypto needed)
fn hash_content(s: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// BUFFER INTEGRITY TESTS
// =============================================================================

#[test]
fn buffer_10k_edits_undo_all() {
    let initial_content = "print('start')\nx = 1\n";
    let mut buffer = Buffer::from_string(initial_content);
    let original_hash = hash_content(&buffer.to_string());

    // adjacent single-char edits are batched, so far fewer groups than edits
    for _ in 0..10_000u64 {
        buffer.insert(buffer.len(), "x");
    }
    assert_ne!(buffer.to_string(), initial_content);

    let mut undo_count = 0;
    while buffer.undo().is_some() {
        undo_count += 1;
        assert!(
            undo_count <= 500,
            "Too many undo operations: {} - batch grouping may not be working",
            undo_count
        );
    }

    assert_eq!(
        original_hash,
        hash_content(&buffer.to_string()),
        "Original and final content differ after undo"
    );
}

#[test]
fn buffer_deep_undo_redo_cycle() {
    let mut buffer = Buffer::from_string("Start\n");
    for i in 0..200 {
        // multi-char inserts each open their own group
        buffer.insert(buffer.len(), &format!("line {}\n", i));
    }
    let edited = buffer.to_string();

    for _ in 0..200 {
        assert!(buffer.undo().is_some());
    }
    assert_eq!(buffer.to_string(), "Start\n");

    for _ in 0..200 {
        assert!(buffer.redo().is_some());
    }
    assert_eq!(buffer.to_string(), edited);
    assert!(buffer.redo().is_none());
}

// =============================================================================
// UTF-8 BOUNDARY TESTS
// =============================================================================

#[test]
fn utf8_multibyte_delete() {
    let mut buffer = Buffer::from_string("Hello 世界 🦀");
    // "世" starts at byte 6 and is 3 bytes long
    buffer.delete(6, 3);
    assert_eq!(buffer.to_string(), "Hello 界 🦀");
    buffer.undo();
    assert_eq!(buffer.to_string(), "Hello 世界 🦀");
}

#[test]
fn utf8_grapheme_boundaries() {
    let buffer = Buffer::from_string("a🦀b");
    assert_eq!(buffer.next_grapheme_boundary(1), 5);
    assert_eq!(buffer.prev_grapheme_boundary(5), 1);
    assert_eq!(buffer.char_at(1), Some('🦀'));
}

// =============================================================================
// SESSION EDITING THROUGH THE APP
// =============================================================================

#[test]
fn typing_and_backspacing_keeps_buffer_consistent() {
    use zypy::core::dispatcher::dispatch;

    let mut app = EditorApp::new();
    for c in "print('hi".chars() {
        dispatch(&mut app, None, Some(c), 1);
    }
    assert_eq!(app.sessions.active().text(), "print('hi')");
    assert_eq!(app.sessions.active().cursor, "print('hi".len());

    // letters go one by one, then each emptied pair goes whole
    for _ in 0..20 {
        dispatch(&mut app, Some("delete-previous-character"), None, 1);
    }
    assert_eq!(app.sessions.active().text(), "");
    assert_eq!(app.sessions.active().cursor, 0);
}

// =============================================================================
// SAVE INTEGRITY (requires temp files)
// =============================================================================

#[test]
fn atomic_save_creates_valid_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("stress.zy");
    let content: String = (0..2_000).map(|i| format!("print({}) # 日本語 🦀\n", i)).collect();

    persistence::save(&path, &content).unwrap();
    assert_eq!(persistence::open(&path).unwrap(), content);

    // overwrite leaves no stray temp files next to the target
    persistence::save(&path, "x").unwrap();
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
}
