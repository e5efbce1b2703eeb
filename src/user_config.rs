// zypy Configuration
// Edit this file to customize your editor, then rebuild

use crate::config::Config;

/// User configuration function
pub fn configure(config: &mut Config) {
    // Sessions (tabs)
    config.bind("^N", "new-session");
    config.bind("^W", "close-session");
    config.bind("C-Right", "next-session");
    config.bind("F6", "next-session");
    config.bind("C-Left", "previous-session");
    config.bind("S-F6", "previous-session");

    // File operations
    config.bind("^O", "open-file");
    config.bind("^S", "save-file");
    config.bind("ESC-s", "save-file-as"); // M-s (Alt + s)
    config.bind("Esc s", "save-file-as"); // ESC then s for terminals without Alt

    // Running
    config.bind("F5", "run-script");
    config.bind("^R", "run-script");
    config.bind("^L", "clear");

    // Undo
    config.bind("^Z", "undo");
    config.bind("^Y", "redo");

    // Movement
    config.bind("Right", "forward-character");
    config.bind("Left", "backward-character");
    config.bind("Down", "next-line");
    config.bind("Up", "previous-line");
    config.bind("Home", "beginning-of-line");
    config.bind("End", "end-of-line");
    config.bind("^E", "end-of-line");

    // Editing
    config.bind("Enter", "insert-newline");
    config.bind("Tab", "insert-tab");
    config.bind("Backspace", "delete-previous-character");
    config.bind("Delete", "delete-next-character");

    // Mark & Region
    config.bind("^@", "set-mark"); // C-@ (Ctrl-Space on most terminals)
    config.bind("ESC-m", "set-mark");
    config.bind("^A", "select-all");
    config.bind("^G", "keyboard-quit"); // abort prompt or selection

    config.bind("^Q", "exit");

    // =========================================================================
    // EDITOR SETTINGS
    // =========================================================================
    // Typing an opener inserts its closer, or wraps the selection
    config.set("auto_pair", true);
    // Backspace between an adjacent pair removes both halves
    // CLI override: --no-pair-delete
    config.set("pair_delete", true);
    // Scripts may call input(); when false input() raises EOFError
    // CLI override: --no-input-prompt
    config.set("script_input", true);

    // Display settings
    config.set("tab_width", 4); // Columns per tab stop
    config.set("output_height", 8); // Rows of the results pane

    // Log destination; the terminal belongs to the UI so logs go to a file.
    // Empty means zypy.log in the system temp directory.
    config.set("log_file", "");
}
