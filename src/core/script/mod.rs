//! The embedded script language.
//!
//! A small, indentation-structured language in the Python mould: integers,
//! floats, strings, lists, functions, `if`/`while`/`for`, and the `print` and
//! `input` built-ins. Programs only reach the outside world through a [`Host`],
//! which is how the sandbox captures output and supplies input.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod value;

pub use error::{ErrorKind, ScriptError, ScriptResult};
pub use eval::{DEFAULT_RECURSION_LIMIT, Host, Interpreter};
pub use parser::parse;
pub use value::Value;

/// Parse and run `source` against `host`
pub fn run(source: &str, host: &mut dyn Host) -> ScriptResult<()> {
    let program = parse(source)?;
    tracing::debug!(target: "script", statements = program.body.len(), "program_parsed");
    Interpreter::new(host).run(&program)
}
