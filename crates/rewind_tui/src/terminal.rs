//! Scoped terminal acquisition.
//!
//! The debugger owns the terminal for its whole run: raw mode plus the
//! alternate screen buffer. [`TerminalGuard`] acquires both and
//! guarantees release on every exit path — normal return, error, or
//! panic (via a hook installed at acquisition time). Without the panic
//! path the terminal would be left in raw mode with the panic message
//! invisible on the alternate screen.

use std::io::{self, Stdout};

use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

/// Holds the raw-mode alternate-screen terminal for the debugger's
/// lifetime; dropping it hands the user their shell back.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    /// Enters raw mode and the alternate screen, and installs a panic
    /// hook that releases both before the panic message prints.
    ///
    /// Partial acquisition is rolled back: if the alternate screen or
    /// the backend fails, raw mode is released before the error returns.
    pub fn acquire() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        if let Err(e) = io::stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = release();
                Err(e)
            }
        }
    }

    /// The terminal to draw frames on.
    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = release();
    }
}

/// Leaves the alternate screen and disables raw mode. Safe to call more
/// than once, and when nothing was ever acquired.
fn release() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = release();
        original_hook(panic_info);
    }));
}
