//! Event source for the TUI.
//!
//! Polls crossterm for keyboard events and generates periodic tick
//! events so the UI refreshes even when the user is idle.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};

/// Events consumed by the TUI main loop.
#[derive(Clone, Debug)]
pub enum TuiEvent {
    /// A keyboard key was pressed.
    Key(KeyEvent),
    /// A periodic tick for UI refresh.
    Tick,
    /// The terminal was resized.
    Resize(u16, u16),
}

/// Polls for the next TUI event with a timeout.
///
/// Returns `TuiEvent::Tick` when the timeout expires without input.
pub fn poll_event(timeout: Duration) -> std::io::Result<TuiEvent> {
    if event::poll(timeout)? {
        match event::read()? {
            CrosstermEvent::Key(key) => Ok(TuiEvent::Key(key)),
            CrosstermEvent::Resize(w, h) => Ok(TuiEvent::Resize(w, h)),
            _ => Ok(TuiEvent::Tick),
        }
    } else {
        Ok(TuiEvent::Tick)
    }
}
