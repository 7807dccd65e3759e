//! The command layer of the debugger.
//!
//! [`DebugSession`] binds the hardware model, the breakpoint table, and
//! the optional DWARF resolver behind a line-oriented command interface:
//! the TUI (or a script) feeds it command strings and renders whatever
//! text comes back. Input and binary errors are reported in-band and
//! never disturb the model or the breakpoints.

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod session;

pub use command::{parse_command, Command, COMMANDS};
pub use error::SessionError;
pub use session::{CommandOutcome, DebugSession};
