//! Rewind — a post-mortem debugger for hardware simulation traces.
//!
//! Loads a VCD trace and a hardware-model description, then drops into a
//! full-screen interface for walking simulation time in both directions,
//! replaying memory writes, and stopping on signal-condition breakpoints.

#![warn(missing_docs)]

use std::path::PathBuf;
use std::process;

use clap::Parser;

use rewind_dwarf::DwarfResolver;
use rewind_model::{parse_model_args, resolve_model};
use rewind_session::DebugSession;
use rewind_trace::{load_or_parse, parser::scan_signals, reader::open_trace_reader};

/// Rewind — interactive VCD trace debugger.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about = "VCD Trace Debugger")]
struct Cli {
    /// Input VCD file (xz- or gzip-compressed traces are decoded
    /// transparently).
    input: PathBuf,

    /// Hardware model: a built-in name or a path to a model TOML file.
    model: String,

    /// Force re-parsing the VCD and overwrite the cache.
    #[arg(long)]
    regen: bool,

    /// Dump the list of all signals in the trace to a file and exit.
    #[arg(long, value_name = "FILE")]
    dump_siglist: Option<PathBuf>,

    /// ELF binary used in the simulation, for source-level commands.
    #[arg(long, value_name = "PATH")]
    binary: Option<PathBuf>,

    /// Arguments passed to the model (repeatable, `key=value`).
    #[arg(long = "model-arg", value_name = "KEY=VALUE")]
    model_args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(out_path) = &cli.dump_siglist {
        let reader = open_trace_reader(&cli.input)?;
        let names = scan_signals(reader)?;
        std::fs::write(out_path, names.join("\n") + "\n")?;
        return Ok(());
    }

    let args = parse_model_args(&cli.model_args)?;
    let def = resolve_model(&cli.model, &args)?;

    let siglist = def.signal_names();
    let trace = load_or_parse(&cli.input, Some(&siglist), cli.regen, None)?;
    let model = def.bind(trace)?;

    let resolver = match &cli.binary {
        Some(path) => Some(DwarfResolver::load(path)?),
        None => None,
    };

    let session = DebugSession::new(model, resolver);
    rewind_tui::run_tui(session)?;
    Ok(())
}
