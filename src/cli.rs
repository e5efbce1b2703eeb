//! Command-line argument parsing for zypy.
//!
//! This module provides the `Cli` struct which encapsulates all command-line
//! options and methods for parsing them.

use crate::config::{Config, ConfigValue};
use std::path::PathBuf;

/// Command-line interface configuration.
#[derive(Debug, Default, PartialEq)]
pub struct Cli {
    /// File(s) to open
    pub files: Vec<PathBuf>,

    /// Script to run without the editor (-r flag)
    pub run: Option<PathBuf>,

    /// Backspace between a pair deletes only the opener
    pub no_pair_delete: bool,

    /// input() raises EOFError instead of prompting
    pub no_input_prompt: bool,
}

const HELP: &str = "\
zypy - A tabbed script editor

Usage: zypy [OPTIONS] [FILES...]

Options:
  -h, --help             Show this help message
  -r, --run FILE         Run FILE without the editor and print its output
      --no-pair-delete   Backspace inside a pair removes only the opener
      --no-input-prompt  Make input() in scripts raise EOFError";

impl Cli {
    /// Parse command-line arguments.
    ///
    /// Returns a `Cli` struct populated with parsed arguments.
    /// Returns an error if required values are missing.
    pub fn parse() -> Result<Self, Box<dyn std::error::Error>> {
        Self::parse_from(std::env::args().skip(1))
    }

    pub fn parse_from<I>(args: I) -> Result<Self, Box<dyn std::error::Error>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-pair-delete" => cli.no_pair_delete = true,
                "--no-input-prompt" => cli.no_input_prompt = true,
                "-r" | "--run" => {
                    if let Some(path) = args.next() {
                        cli.run = Some(PathBuf::from(path));
                    } else {
                        return Err("--run requires a value".into());
                    }
                }
                "-h" | "--help" => {
                    println!("{}", HELP);
                    std::process::exit(0);
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(format!("Unknown flag: {}. Use --help for usage.", arg).into());
                }
                _ => {
                    // Positional arguments are files
                    cli.files.push(PathBuf::from(arg));
                }
            }
        }

        Ok(cli)
    }

    /// Apply CLI overrides to a configuration object.
    pub fn apply_to_config(&self, config: &mut Config) {
        if self.no_pair_delete {
            config.set("pair_delete", ConfigValue::Bool(false));
        }
        if self.no_input_prompt {
            config.set("script_input", ConfigValue::Bool(false));
        }
    }
}
