//! Execution sandbox: runs a script with its output captured.
//!
//! The [`Console`] is the editor's stand-in for a process-wide standard output.
//! A run swaps its sink for a [`CaptureBuffer`] through a [`Redirect`] guard,
//! so the previous sink comes back on every exit path, panics included.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::core::script::{self, ErrorKind, Host, Interpreter, ScriptError, ScriptResult};

/// Destination for console text
pub trait OutputSink {
    fn write_str(&mut self, text: &str);
}

/// Sink used while nothing is captured in the terminal UI; keeps stray text off the screen
pub struct LogSink;

impl OutputSink for LogSink {
    fn write_str(&mut self, text: &str) {
        tracing::info!(target: "console", text, "uncaptured_output");
    }
}

/// Sink writing to the real standard output
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_str(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        if let Err(err) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::error!(target: "console", %err, "stdout_write_failed");
        }
    }
}

/// In-memory sink; clones share the same text
#[derive(Clone, Default)]
pub struct CaptureBuffer(Rc<RefCell<String>>);

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl OutputSink for CaptureBuffer {
    fn write_str(&mut self, text: &str) {
        self.0.borrow_mut().push_str(text);
    }
}

/// A swappable output stream
pub struct Console {
    sink: Box<dyn OutputSink>,
}

impl Console {
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self { sink }
    }

    pub fn write(&mut self, text: &str) {
        self.sink.write_str(text);
    }

    /// Send output to `sink` until the returned guard is dropped
    pub fn redirect(&mut self, sink: Box<dyn OutputSink>) -> Redirect<'_> {
        let previous = std::mem::replace(&mut self.sink, sink);
        Redirect {
            console: self,
            previous: Some(previous),
        }
    }
}

/// Restores the console's previous sink on drop
pub struct Redirect<'c> {
    console: &'c mut Console,
    previous: Option<Box<dyn OutputSink>>,
}

impl Deref for Redirect<'_> {
    type Target = Console;

    fn deref(&self) -> &Console {
        self.console
    }
}

impl DerefMut for Redirect<'_> {
    fn deref_mut(&mut self) -> &mut Console {
        self.console
    }
}

impl Drop for Redirect<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.console.sink = previous;
        }
    }
}

/// Supplies answers to a script's `input()` calls
pub trait InputProvider {
    /// The user's answer, or `None` when they cancelled
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Fixed answers, handed out in order; cancels once exhausted
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts seen so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front()
    }
}

/// Reads answers from standard input; the prompt goes to stderr so it stays visible
pub struct StdinInput;

impl InputProvider for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let mut err = io::stderr().lock();
        let _ = err.write_all(prompt.as_bytes()).and_then(|_| err.flush());
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(err) => {
                tracing::error!(target: "sandbox", %err, "stdin_read_failed");
                None
            }
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Output(String),
    Error(ScriptError),
}

impl ExecutionResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ExecutionResult::Error(_))
    }

    /// Text for the results pane
    pub fn render(&self) -> String {
        match self {
            ExecutionResult::Output(text) => text.clone(),
            ExecutionResult::Error(err) => format!("Error:\n{}", err),
        }
    }
}

/// Replaces the panic hook for its lifetime so a contained panic is logged, not printed
struct PanicHookGuard {
    previous: Option<Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl PanicHookGuard {
    fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            tracing::error!(target: "sandbox", %info, "script_panicked");
        }));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "interpreter panicked".to_string()
    }
}

/// Connects a running script to the console and the input provider
struct SandboxHost<'a> {
    console: &'a mut Console,
    input: &'a mut dyn InputProvider,
    input_enabled: bool,
}

impl Host for SandboxHost<'_> {
    fn write(&mut self, text: &str) {
        self.console.write(text);
    }

    fn read_line(&mut self, prompt: &str) -> ScriptResult<String> {
        if !self.input_enabled {
            return Err(ScriptError::eof());
        }
        self.console.write(prompt);
        Ok(self.input.read_line(prompt).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sandbox {
    /// Route `input()` to the provider; when off, `input()` raises `EOFError`
    pub input_enabled: bool,
    pub recursion_limit: usize,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self {
            input_enabled: true,
            recursion_limit: script::DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl Sandbox {
    pub fn new(input_enabled: bool) -> Self {
        Self {
            input_enabled,
            ..Self::default()
        }
    }

    /// Run `source` with the console captured.
    ///
    /// Output written before a failure is discarded; the result holds either
    /// everything the script printed or the error alone.
    pub fn execute(
        &self,
        source: &str,
        console: &mut Console,
        input: &mut dyn InputProvider,
    ) -> ExecutionResult {
        tracing::info!(target: "sandbox", bytes = source.len(), "run_started");
        let capture = CaptureBuffer::default();
        let outcome = {
            let mut redirect = console.redirect(Box::new(capture.clone()));
            let _hook = PanicHookGuard::install();
            let mut host = SandboxHost {
                console: &mut redirect,
                input,
                input_enabled: self.input_enabled,
            };
            let limit = self.recursion_limit;
            panic::catch_unwind(AssertUnwindSafe(|| {
                let program = script::parse(source)?;
                Interpreter::new(&mut host)
                    .with_recursion_limit(limit)
                    .run(&program)
            }))
        };

        let result = match outcome {
            Ok(Ok(())) => ExecutionResult::Output(capture.take()),
            Ok(Err(err)) => ExecutionResult::Error(err),
            Err(payload) => ExecutionResult::Error(ScriptError::new(
                ErrorKind::InternalError,
                panic_message(payload.as_ref()),
            )),
        };
        match &result {
            ExecutionResult::Output(text) => {
                tracing::info!(target: "sandbox", bytes = text.len(), "run_finished")
            }
            ExecutionResult::Error(err) => {
                tracing::info!(target: "sandbox", %err, line = ?err.line, "run_failed")
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickingInput;

    impl InputProvider for PanickingInput {
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            panic!("provider exploded");
        }
    }

    fn console_with_marker() -> (Console, CaptureBuffer) {
        let outside = CaptureBuffer::default();
        (Console::new(Box::new(outside.clone())), outside)
    }

    #[test]
    fn test_captures_print_output() {
        let (mut console, outside) = console_with_marker();
        let result = Sandbox::default().execute(
            "print(\"hi\")",
            &mut console,
            &mut ScriptedInput::default(),
        );
        assert_eq!(result, ExecutionResult::Output("hi\n".into()));

        console.write("after");
        assert_eq!(outside.contents(), "after");
    }

    #[test]
    fn test_error_is_rendered_and_sink_restored() {
        let (mut console, outside) = console_with_marker();
        let result = Sandbox::default().execute(
            "print('partial')\n1/0",
            &mut console,
            &mut ScriptedInput::default(),
        );
        assert!(result.is_error());
        assert_eq!(result.render(), "Error:\nZeroDivisionError: division by zero");

        console.write("x");
        assert_eq!(outside.contents(), "x");
    }

    #[test]
    fn test_input_echoes_prompt_then_answer() {
        let (mut console, _) = console_with_marker();
        let mut input = ScriptedInput::new(["Ada"]);
        let result = Sandbox::default().execute(
            "name = input('Name: ')\nprint('Hello', name)",
            &mut console,
            &mut input,
        );
        assert_eq!(result.render(), "Name: Hello Ada\n");
        assert_eq!(input.prompts(), ["Name: "]);
    }

    #[test]
    fn test_cancelled_input_is_empty_string() {
        let (mut console, _) = console_with_marker();
        let result = Sandbox::default().execute(
            "x = input()\nprint(len(x))",
            &mut console,
            &mut ScriptedInput::default(),
        );
        assert_eq!(result.render(), "0\n");
    }

    #[test]
    fn test_input_disabled_raises_eof() {
        let (mut console, _) = console_with_marker();
        let result = Sandbox::new(false).execute(
            "input('? ')",
            &mut console,
            &mut ScriptedInput::new(["unused"]),
        );
        assert_eq!(result.render(), "Error:\nEOFError: EOF when reading a line");
    }

    #[test]
    fn test_panic_is_contained() {
        let (mut console, outside) = console_with_marker();
        let result = Sandbox::default().execute("input()", &mut console, &mut PanickingInput);
        match result {
            ExecutionResult::Error(err) => {
                assert_eq!(err.kind, ErrorKind::InternalError);
                assert_eq!(err.message, "provider exploded");
            }
            other => panic!("expected error, got {:?}", other),
        }
        console.write("still here");
        assert_eq!(outside.contents(), "still here");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let (mut console, _) = console_with_marker();
        let result = Sandbox::default().execute(
            "print('a'",
            &mut console,
            &mut ScriptedInput::default(),
        );
        assert!(result.render().starts_with("Error:\nSyntaxError: "));
    }

    #[test]
    fn test_redirect_guard_nests() {
        let (mut console, outside) = console_with_marker();
        let inner = CaptureBuffer::default();
        {
            let mut redirect = console.redirect(Box::new(inner.clone()));
            redirect.write("captured");
        }
        console.write("restored");
        assert_eq!(inner.contents(), "captured");
        assert_eq!(outside.contents(), "restored");
    }
}
