//! The module abstraction and its Basic and Core variants.
//!
//! Every module is a named group of signals with three time-motion
//! operations: `edge` (one clock edge), `update` (skip forward n edges),
//! and `rupdate` (skip backward n edges). Basic and Core modules simply
//! mirror trace values at the cursor; the interesting replay semantics
//! live in [`crate::memory::MemoryModule`].

use std::collections::HashMap;

use rewind_common::{Logic, SigValue, Value};
use rewind_trace::TraceStore;

use crate::error::ModelError;
use crate::signal::{assign_short_names, Signal};

/// A named group of signals with forward/backward state-replay semantics.
///
/// `curr` is always the model's cursor before the motion and `dt` the edge
/// duration; `update`/`rupdate` receive the already-clamped step count.
pub trait DebugModule {
    /// The module's unique name within its model.
    fn name(&self) -> &str;

    /// The hierarchical names this module declares (before binding).
    fn signal_names(&self) -> Vec<String>;

    /// The bound signals; empty before [`DebugModule::bind`].
    fn signals(&self) -> &[Signal];

    /// Resolves declared names against the trace and initializes values
    /// at time 0.
    fn bind(&mut self, trace: &TraceStore) -> Result<(), ModelError>;

    /// Short name to comparison projection of each signal, the
    /// breakpoint evaluator's view of this module: the integer value
    /// when fully defined, the raw four-state bits otherwise.
    fn signal_dict(&self) -> HashMap<String, SigValue> {
        self.signals()
            .iter()
            .map(|s| (s.short_name.clone(), SigValue::from_value(&s.value)))
            .collect()
    }

    /// Advances one edge: refresh state to `curr + dt`.
    fn edge(&mut self, trace: &TraceStore, curr: u64, dt: u64) -> Result<(), ModelError>;

    /// Skips forward: refresh state to `curr + steps * dt`.
    fn update(&mut self, trace: &TraceStore, curr: u64, dt: u64, steps: u64)
        -> Result<(), ModelError>;

    /// Skips backward: refresh state to `curr - steps * dt`.
    fn rupdate(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError>;

    /// The program counter signal, for Core modules.
    fn pc(&self) -> Option<&Signal> {
        None
    }

    /// Text serialization for the display layer.
    fn render(&self) -> String;
}

/// Formats a value for panel display.
///
/// Single-bit values render bare (`0`, `1`, `x`, `z`); wider values render
/// in the Verilog sized-hex form (`8'ha5`, `4'hx`).
pub fn format_value(v: &Value) -> String {
    if v.width() == 1 {
        match v.get(0) {
            Logic::Zero => "0".into(),
            Logic::One => "1".into(),
            Logic::X => "x".into(),
            Logic::Z => "z".into(),
        }
    } else {
        format!("{}'h{}", v.width(), v.as_hex())
    }
}

fn render_signal_lines(out: &mut String, signals: &[Signal]) {
    for s in signals {
        out.push_str(&format!("\n    {}: {}", s.short_name, format_value(&s.value)));
    }
}

/// A read-only mirror of N signals at the cursor time.
#[derive(Debug)]
pub struct BasicModule {
    name: String,
    declared: Vec<String>,
    signals: Vec<Signal>,
}

impl BasicModule {
    /// Creates an unbound basic module over the given hierarchical names.
    pub fn new(name: impl Into<String>, signals: Vec<String>) -> Self {
        Self {
            name: name.into(),
            declared: signals,
            signals: Vec::new(),
        }
    }

    fn refresh_all(&mut self, trace: &TraceStore, t: u64) {
        for s in &mut self.signals {
            s.refresh(trace, t);
        }
    }
}

impl DebugModule for BasicModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal_names(&self) -> Vec<String> {
        self.declared.clone()
    }

    fn signals(&self) -> &[Signal] {
        &self.signals
    }

    fn bind(&mut self, trace: &TraceStore) -> Result<(), ModelError> {
        self.signals = self
            .declared
            .iter()
            .map(|name| Signal::bind(name, trace))
            .collect::<Result<_, _>>()?;
        assign_short_names(&mut self.signals);
        Ok(())
    }

    fn edge(&mut self, trace: &TraceStore, curr: u64, dt: u64) -> Result<(), ModelError> {
        self.refresh_all(trace, curr + dt);
        Ok(())
    }

    fn update(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        self.refresh_all(trace, curr + steps * dt);
        Ok(())
    }

    fn rupdate(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        self.refresh_all(trace, curr.saturating_sub(steps * dt));
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = format!("{}: ", self.name);
        render_signal_lines(&mut out, &self.signals);
        out
    }
}

/// A basic module whose first signal is the program counter.
///
/// The PC correlates trace state with addresses in the debugged binary,
/// which is what source-line stepping and `where` are built on.
#[derive(Debug)]
pub struct CoreModule {
    inner: BasicModule,
}

impl CoreModule {
    /// Creates an unbound core module. `pc` becomes the first signal,
    /// followed by any extra tracked signals.
    pub fn new(name: impl Into<String>, pc: String, mut extra: Vec<String>) -> Self {
        let mut signals = vec![pc];
        signals.append(&mut extra);
        Self {
            inner: BasicModule::new(name, signals),
        }
    }
}

impl DebugModule for CoreModule {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn signal_names(&self) -> Vec<String> {
        self.inner.signal_names()
    }

    fn signals(&self) -> &[Signal] {
        self.inner.signals()
    }

    fn bind(&mut self, trace: &TraceStore) -> Result<(), ModelError> {
        self.inner.bind(trace)
    }

    fn edge(&mut self, trace: &TraceStore, curr: u64, dt: u64) -> Result<(), ModelError> {
        self.inner.edge(trace, curr, dt)
    }

    fn update(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        self.inner.update(trace, curr, dt, steps)
    }

    fn rupdate(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        self.inner.rupdate(trace, curr, dt, steps)
    }

    fn pc(&self) -> Option<&Signal> {
        self.inner.signals().first()
    }

    fn render(&self) -> String {
        self.inner.render()
    }
}
