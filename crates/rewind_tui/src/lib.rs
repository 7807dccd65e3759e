//! Full-screen terminal interface for the Rewind debugger.
//!
//! Wraps a [`rewind_session::DebugSession`] in a ratatui layout: a grid
//! of per-module panels, a command output pane, and an input line with a
//! module-name completer and a `Time: sim/end` indicator.
//!
//! # Usage
//!
//! ```ignore
//! let session = DebugSession::new(model, resolver);
//! rewind_tui::run_tui(session)?;
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod completer;
pub mod event;
pub mod render;
pub mod state;
pub mod terminal;
pub mod widgets;

use std::io::Stdout;
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use rewind_session::DebugSession;

use app::TuiApp;
use event::{poll_event, TuiEvent};
use terminal::TerminalGuard;

/// Runs the interactive debugger until the user quits.
///
/// The terminal (raw mode plus alternate screen) is held by a guard for
/// the duration of the loop and released on every exit path — normal
/// quit, I/O error, or panic.
pub fn run_tui(session: DebugSession) -> std::io::Result<()> {
    let mut guard = TerminalGuard::acquire()?;
    let mut app = TuiApp::new(session);
    run_loop(&mut app, guard.terminal())
}

fn run_loop(
    app: &mut TuiApp,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> std::io::Result<()> {
    let tick_rate = Duration::from_millis(50);

    loop {
        terminal.draw(|frame| render::render(app, frame))?;

        match poll_event(tick_rate)? {
            TuiEvent::Key(key) => app.handle_key(key),
            TuiEvent::Tick => {}
            TuiEvent::Resize(_, _) => {
                // Ratatui re-lays out on the next draw.
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
