//! The command grammar.
//!
//! Commands are regex-matched after trimming, one pattern per command,
//! from a single table that also drives the `help` text and the TUI's
//! completion list.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::SessionError;

/// The command table: usage, description, and the pattern that matches it.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    (
        "fedge [n]",
        "Run simulation <n> clock edges forward (default 1)",
        r"^(f|fedge)\s*(\d*)$",
    ),
    (
        "redge [n]",
        "Run simulation <n> clock edges backward (default 1)",
        r"^(r|redge)\s*(\d*)$",
    ),
    (
        "step <core> [n]",
        "Step <n> source lines forward on a core (default 1)",
        r"^(s|step)\s+(\w+)\s*(\d*)$",
    ),
    (
        "rstep <core> [n]",
        "Step <n> source lines backward on a core (default 1)",
        r"^(rs|rstep)\s+(\w+)\s*(\d*)$",
    ),
    (
        "break <condition>",
        "Set a breakpoint on a signal condition",
        r"^(b|break)\s+(.+)$",
    ),
    ("lsbrk", "List all active breakpoints", r"^(l|lsbrk)$"),
    ("delete <n>", "Delete breakpoint <n>", r"^(d|delete)\s+(\d+)$"),
    (
        "run [t]",
        "Run simulation until time <t> (default: end), honoring breakpoints",
        r"^(run)\s*(\d*)$",
    ),
    (
        "jump <t>",
        "Jump to time <t>, ignoring breakpoints",
        r"^(j|jump)\s+(\d+)$",
    ),
    (
        "where <loc> [n]",
        "Show source and instructions around a core's PC or an address",
        r"^(w|where)\s+(\S+)\s*(\d*)$",
    ),
    (
        "info <module>",
        "Give detailed information on a module",
        r"^(i|info)\s+(\w+)$",
    ),
    (
        "modules",
        "Print a list of modules in the model",
        r"^(m|modules)$",
    ),
    (
        "traceback",
        "Reverse to the most recent cycle with no unknown signals",
        r"^(traceback)$",
    ),
    ("clear", "Clear the output window", r"^(c|clear)$"),
    ("help", "Print this help text", r"^(h|help)$"),
    ("quit", "Quit the debugger (also C-c, C-d)", r"^(q|quit)$"),
    (
        "debugger",
        "Dump session internals (for tool debugging)",
        r"^(debugger)$",
    ),
];

/// A parsed user command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advance n edges.
    Fedge {
        /// Edge count.
        count: u64,
    },
    /// Reverse n edges.
    Redge {
        /// Edge count.
        count: u64,
    },
    /// Step forward n source lines on a core module.
    Step {
        /// The core module name.
        target: String,
        /// Distinct-line count.
        count: u64,
    },
    /// Step backward n source lines on a core module.
    Rstep {
        /// The core module name.
        target: String,
        /// Distinct-line count.
        count: u64,
    },
    /// Add a breakpoint.
    Break {
        /// The predicate source text.
        condition: String,
    },
    /// List breakpoints.
    Lsbrk,
    /// Delete a breakpoint.
    Delete {
        /// The breakpoint id.
        id: u32,
    },
    /// Run forward to a time (or the end), honoring breakpoints.
    Run {
        /// The target time; `None` means end of trace.
        until: Option<u64>,
    },
    /// Jump to a time, ignoring breakpoints.
    Jump {
        /// The target time.
        time: u64,
    },
    /// Show source and instructions around a location.
    Where {
        /// A core module name, literal address, or expression.
        target: String,
        /// Context lines on each side.
        context: u32,
    },
    /// Pretty-print one module.
    Info {
        /// The module name.
        module: String,
    },
    /// List module names.
    Modules,
    /// Reverse to the most recent `x`-free cycle.
    Traceback,
    /// Clear the output pane.
    Clear,
    /// Show help.
    Help,
    /// Exit the debugger.
    Quit,
    /// Dump session internals.
    Debugger,
}

fn compiled_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        COMMANDS
            .iter()
            .map(|(_, _, pattern)| Regex::new(pattern).expect("command pattern"))
            .collect()
    })
}

fn count_or_one(capture: Option<&str>) -> u64 {
    match capture {
        Some(text) if !text.is_empty() => text.parse().unwrap_or(1),
        _ => 1,
    }
}

/// Parses a trimmed command line against the command table.
pub fn parse_command(input: &str) -> Result<Command, SessionError> {
    let text = input.trim();
    for (index, regex) in compiled_patterns().iter().enumerate() {
        let Some(caps) = regex.captures(text) else {
            continue;
        };
        let arg = |n: usize| caps.get(n).map(|m| m.as_str());
        let command = match COMMANDS[index].0.split_whitespace().next().unwrap() {
            "fedge" => Command::Fedge {
                count: count_or_one(arg(2)),
            },
            "redge" => Command::Redge {
                count: count_or_one(arg(2)),
            },
            "step" => Command::Step {
                target: arg(2).unwrap().to_string(),
                count: count_or_one(arg(3)),
            },
            "rstep" => Command::Rstep {
                target: arg(2).unwrap().to_string(),
                count: count_or_one(arg(3)),
            },
            "break" => Command::Break {
                condition: arg(2).unwrap().to_string(),
            },
            "lsbrk" => Command::Lsbrk,
            "delete" => Command::Delete {
                id: arg(2).unwrap().parse().map_err(|_| {
                    SessionError::input("Breakpoint id out of range")
                })?,
            },
            "run" => Command::Run {
                until: match arg(2) {
                    Some(text) if !text.is_empty() => Some(text.parse().map_err(|_| {
                        SessionError::input("Time out of range")
                    })?),
                    _ => None,
                },
            },
            "jump" => Command::Jump {
                time: arg(2)
                    .unwrap()
                    .parse()
                    .map_err(|_| SessionError::input("Time out of range"))?,
            },
            "where" => Command::Where {
                target: arg(2).unwrap().to_string(),
                context: match arg(3) {
                    Some(text) if !text.is_empty() => text.parse().unwrap_or(2),
                    _ => 2,
                },
            },
            "info" => Command::Info {
                module: arg(2).unwrap().to_string(),
            },
            "modules" => Command::Modules,
            "traceback" => Command::Traceback,
            "clear" => Command::Clear,
            "help" => Command::Help,
            "quit" => Command::Quit,
            "debugger" => Command::Debugger,
            _ => unreachable!("command table covers every usage head"),
        };
        return Ok(command);
    }
    Err(SessionError::input("Invalid Command!"))
}

/// Renders the help text from the command table.
pub fn help_text() -> String {
    let mut out = String::from("HELP\n");
    for (usage, description, _) in COMMANDS {
        out.push_str(&format!("{usage}: {description}\n"));
    }
    out.pop();
    out
}
