//! Terminal (TUI) mode implementation.

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::config::Config;
use crate::core::app::EditorApp;
use crate::terminal;
use crate::terminal::display::Display;

/// Run in terminal (TUI) mode.
pub fn run_terminal_mode(files: &[PathBuf], config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut keybind_manager = terminal::keybinds::KeyBindingManager::new();
    for (binding, command) in &config.keybindings {
        keybind_manager.bind(binding, command.clone());
    }

    let mut app = EditorApp::initialize_with_config(config, files);
    let mut display = Display::new_terminal()?;

    // script input() reads from the status line
    let prompt_drew = Rc::new(Cell::new(false));
    app.input_provider = Box::new(terminal::input_prompt::TerminalInputPrompt::new(
        display.palette,
        Rc::clone(&prompt_drew),
    ));

    let _raw_mode = terminal::raw::RawMode::new()?;
    tracing::info!(target: "app", sessions = app.sessions.len(), "terminal_started");

    let mut stdout = io::stdout();
    display.render(&app)?;
    terminal::render::render_display_to_terminal(&display, &mut stdout)?;
    display.swap_buffers();

    let mut event_handler = terminal::events::EventHandler::new();
    loop {
        if event_handler.poll(Duration::from_millis(50))? {
            let event = event_handler.read()?;
            let exit = terminal::event_handler::process_terminal_event(
                &mut app,
                &mut display,
                &mut keybind_manager,
                event,
            )?;
            if exit {
                break;
            }
        }

        // the input prompt painted outside the display; repaint everything
        if prompt_drew.replace(false) {
            let (cols, rows) = crossterm::terminal::size()?;
            display.update_size(cols, rows);
        }

        if display.dirty {
            display.render(&app)?;
            terminal::render::render_display_to_terminal(&display, &mut stdout)?;
            display.swap_buffers();
        }
    }

    tracing::info!(target: "app", "terminal_exited");
    Ok(())
}
