//! Application execution modes for zypy.
//!
//! - Terminal mode: the tabbed editor
//! - Headless mode: run one script and print its result

mod headless;
mod tui;

use std::io::IsTerminal;
use std::path::PathBuf;

use crate::cli::Cli;

pub use headless::{run_headless_mode, run_script};
pub use tui::run_terminal_mode;

/// Editor execution mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// Run this script without the editor
    Headless(PathBuf),
    Terminal,
}

/// Detect the appropriate editor mode from the arguments and stdin.
pub fn detect_mode(cli: &Cli) -> Result<EditorMode, Box<dyn std::error::Error>> {
    detect_mode_internal(cli, std::io::stdin().is_terminal())
}

/// Internal mode detection with injectable terminal check.
pub fn detect_mode_internal(
    cli: &Cli,
    is_stdin_tty: bool,
) -> Result<EditorMode, Box<dyn std::error::Error>> {
    if let Some(script) = &cli.run {
        return Ok(EditorMode::Headless(script.clone()));
    }
    if !is_stdin_tty {
        return Err("stdin is not a terminal; use --run FILE to run a script".into());
    }
    Ok(EditorMode::Terminal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flag_selects_headless() {
        let cli = Cli {
            run: Some(PathBuf::from("demo.zy")),
            ..Cli::default()
        };
        assert_eq!(
            detect_mode_internal(&cli, false).unwrap(),
            EditorMode::Headless(PathBuf::from("demo.zy"))
        );
        assert_eq!(
            detect_mode_internal(&cli, true).unwrap(),
            EditorMode::Headless(PathBuf::from("demo.zy"))
        );
    }

    #[test]
    fn test_terminal_mode_needs_a_tty() {
        let cli = Cli::default();
        assert_eq!(detect_mode_internal(&cli, true).unwrap(), EditorMode::Terminal);
        assert!(detect_mode_internal(&cli, false).is_err());
    }
}
