//! zypy - A tabbed script editor
//!
//! This is the main entry point. It parses CLI arguments, sets up logging
//! and delegates to the terminal editor or the headless runner.

use std::path::Path;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use zypy::config::{Config, DEFAULT_LOG_FILE, EditorOptions};
use zypy::{cli, run, user_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse()?;

    // Load configuration
    let mut config = Config::default();
    user_config::configure(&mut config);

    // Apply CLI overrides
    cli.apply_to_config(&mut config);

    let options = EditorOptions::from_config(&config);
    let log_guard = configure_logging(&options.log_file);
    install_panic_hook();
    tracing::info!(target: "app", version = env!("CARGO_PKG_VERSION"), "startup");

    match run::detect_mode(&cli)? {
        run::EditorMode::Headless(script) => {
            if !run::run_headless_mode(&script, &config)? {
                // exit skips destructors; flush the log writer first
                drop(log_guard);
                std::process::exit(1);
            }
        }
        run::EditorMode::Terminal => {
            run::run_terminal_mode(&cli.files, &config)?;
        }
    }

    Ok(())
}

/// Send tracing output to `log_file`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard
/// flushes the background writer when dropped.
fn configure_logging(log_file: &Path) -> Option<WorkerGuard> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = log_file
        .file_name()
        .map_or_else(|| DEFAULT_LOG_FILE.into(), |n| n.to_os_string());

    let file_appender = tracing_appender::rolling::never(dir, name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // a subscriber is already installed; dropping the guard stops the writer
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "app.panic", %info, "panic");
            default_panic(info);
        }));
    });
}
