//! Headless mode: run one script file and print what it printed.

use std::io::{self, Write};
use std::path::Path;

use crate::config::{Config, EditorOptions};
use crate::core::persistence;
use crate::core::sandbox::{Console, InputProvider, Sandbox, StdinInput, StdoutSink};

/// Run `script` with stdin answering `input()`; returns false when the script failed.
pub fn run_headless_mode(script: &Path, config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    let options = EditorOptions::from_config(config);
    let source = persistence::open(script)?;
    let mut stdout = io::stdout().lock();
    Ok(run_script(&source, &options, &mut StdinInput, &mut stdout)?)
}

/// Execute `source` in a fresh sandbox and write the rendered result to `out`
pub fn run_script(
    source: &str,
    options: &EditorOptions,
    input: &mut dyn InputProvider,
    out: &mut impl Write,
) -> io::Result<bool> {
    let sandbox = Sandbox::new(options.script_input);
    let mut console = Console::new(Box::new(StdoutSink));
    let result = sandbox.execute(source, &mut console, input);

    let rendered = result.render();
    out.write_all(rendered.as_bytes())?;
    if result.is_error() && !rendered.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(!result.is_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sandbox::ScriptedInput;

    fn run(source: &str, options: &EditorOptions, answers: &[&str]) -> (bool, String) {
        let mut input = ScriptedInput::new(answers.iter().copied());
        let mut out = Vec::new();
        let ok = run_script(source, options, &mut input, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_output_is_printed() {
        let (ok, out) = run("print('hi')\nprint(1 + 2)", &EditorOptions::default(), &[]);
        assert!(ok);
        assert_eq!(out, "hi\n3\n");
    }

    #[test]
    fn test_error_is_printed_and_reported() {
        let (ok, out) = run("print('lost')\n1/0", &EditorOptions::default(), &[]);
        assert!(!ok);
        assert_eq!(out, "Error:\nZeroDivisionError: division by zero\n");
    }

    #[test]
    fn test_input_answers() {
        let (ok, out) = run(
            "name = input('Name: ')\nprint('Hello', name)",
            &EditorOptions::default(),
            &["Ada"],
        );
        assert!(ok);
        assert_eq!(out, "Name: Hello Ada\n");
    }

    #[test]
    fn test_input_disabled() {
        let options = EditorOptions {
            script_input: false,
            ..EditorOptions::default()
        };
        let (ok, out) = run("input()", &options, &["ignored"]);
        assert!(!ok);
        assert_eq!(out, "Error:\nEOFError: EOF when reading a line\n");
    }
}
