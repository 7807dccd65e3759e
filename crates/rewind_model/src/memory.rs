//! Memory modules: addressed storage reconstructed by replaying writes.
//!
//! A memory watches three signals — write address, write data, and write
//! enable — and applies a write whenever the enable carries its active
//! level at the cursor. Forward and backward skips do not walk every edge:
//! they hop between enable-signal events with `next_change`/`prev_change`,
//! which is what makes skipping millions of idle cycles cheap.

use std::collections::BTreeMap;

use rewind_common::Value;
use rewind_trace::TraceStore;

use crate::error::ModelError;
use crate::module::{format_value, DebugModule};
use crate::signal::{assign_short_names, Signal};

const ADDR: usize = 0;
const WDATA: usize = 1;
const ENABLE: usize = 2;

/// An inclusive address range a memory tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Lowest tracked address.
    pub lo: u64,
    /// Highest tracked address (inclusive).
    pub hi: u64,
}

impl Segment {
    /// A single-address segment.
    pub fn single(addr: u64) -> Self {
        Self { lo: addr, hi: addr }
    }

    fn contains(&self, addr: u64) -> bool {
        self.lo <= addr && addr <= self.hi
    }
}

/// Addressed storage reconstructed from the trace's write stream.
#[derive(Debug)]
pub struct MemoryModule {
    name: String,
    declared: [String; 3],
    signals: Vec<Signal>,
    enable_level: bool,
    size: Option<u64>,
    segments: Vec<Segment>,
    show_signals: bool,
    memory: BTreeMap<u64, Value>,
}

impl MemoryModule {
    /// Creates an unbound memory over `addr`/`wdata`/`enable` signals.
    ///
    /// `enable_high` selects the active level of the enable signal.
    pub fn new(
        name: impl Into<String>,
        addr: String,
        wdata: String,
        enable: String,
        enable_high: bool,
    ) -> Self {
        Self {
            name: name.into(),
            declared: [addr, wdata, enable],
            signals: Vec::new(),
            enable_level: enable_high,
            size: None,
            segments: Vec::new(),
            show_signals: true,
            memory: BTreeMap::new(),
        }
    }

    /// Bounds the address space; enabled writes at or above `size` fault.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Restricts tracking to the given address segments.
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Controls whether the signal header appears in the rendering.
    pub fn show_signals(mut self, show: bool) -> Self {
        self.show_signals = show;
        self
    }

    /// Read back a reconstructed cell.
    pub fn cell(&self, addr: u64) -> Option<&Value> {
        self.memory.get(&addr)
    }

    fn enabled(&self, v: &Value) -> bool {
        // An x enable never matches the active level.
        v.as_int().map(|i| i != 0) == Some(self.enable_level)
    }

    fn tracked(&self, addr: u64) -> bool {
        if !self.segments.is_empty() {
            return self.segments.iter().any(|s| s.contains(addr));
        }
        true
    }

    /// Applies one write at the current signal state.
    ///
    /// No-op when the address has no integer projection or lies outside
    /// the tracked range; a fault when it exceeds the size bound.
    fn write(&mut self, addr: &Value, wdata: &Value) -> Result<(), ModelError> {
        let Some(a) = addr.as_int() else {
            return Ok(());
        };
        if let Some(size) = self.size {
            if a >= size {
                return Err(ModelError::OutOfBounds {
                    module: self.name.clone(),
                    addr: a,
                    size,
                });
            }
        }
        if !self.tracked(a) {
            return Ok(());
        }
        self.memory.insert(a, wdata.clone());
        Ok(())
    }

    fn refresh_all(&mut self, trace: &TraceStore, t: u64) {
        for s in &mut self.signals {
            s.refresh(trace, t);
        }
    }

    /// The value last written to `addr` strictly before `t`, walking the
    /// enable event stream backwards.
    fn last_write_before(&self, trace: &TraceStore, addr: u64, t: u64) -> Option<Value> {
        let en = self.signals[ENABLE].symbol;
        let mut tp = t;
        while let Some((te, v)) = trace.prev_change(en, tp) {
            tp = te;
            if !self.enabled(&v) {
                continue;
            }
            let a = trace.value_at(self.signals[ADDR].symbol, te);
            if a.as_int() == Some(addr) {
                return Some(trace.value_at(self.signals[WDATA].symbol, te));
            }
        }
        None
    }

    fn render_dense_table(&self, size: u64) -> String {
        const COLUMNS: u64 = 3;
        let wdata_width = self.signals.get(WDATA).map_or(1, |s| s.width);
        let rows = size.div_ceil(COLUMNS);
        let mut table = String::new();
        for row in 0..rows {
            for col in 0..COLUMNS {
                let pos = row * COLUMNS + col;
                if pos >= size {
                    break;
                }
                let text = match self.memory.get(&pos) {
                    Some(v) => format_value(v),
                    None => format_value(&Value::unknown(wdata_width)),
                };
                table.push_str(&format!("{:<16}", format!("  ({pos}) {text}")));
            }
            table.push('\n');
        }
        table
    }
}

impl DebugModule for MemoryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal_names(&self) -> Vec<String> {
        self.declared.to_vec()
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
        // A write already enabled at time 0 counts.
        if self.enabled(&self.signals[ENABLE].value) {
            let addr = self.signals[ADDR].value.clone();
            let wdata = self.signals[WDATA].value.clone();
            self.write(&addr, &wdata)?;
        }
        Ok(())
    }

    fn edge(&mut self, trace: &TraceStore, curr: u64, dt: u64) -> Result<(), ModelError> {
        self.refresh_all(trace, curr + dt);
        if self.enabled(&self.signals[ENABLE].value) {
            let addr = self.signals[ADDR].value.clone();
            let wdata = self.signals[WDATA].value.clone();
            self.write(&addr, &wdata)?;
        }
        Ok(())
    }

    fn update(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        let end = curr + steps * dt;
        let en = self.signals[ENABLE].symbol;
        let mut t = curr;
        // Hop between enable events; everything in between is idle.
        while let Some((te, v)) = trace.next_change(en, t) {
            if te > end {
                break;
            }
            t = te;
            if self.enabled(&v) {
                let addr = trace.value_at(self.signals[ADDR].symbol, te);
                let wdata = trace.value_at(self.signals[WDATA].symbol, te);
                self.write(&addr, &wdata)?;
            }
        }
        self.refresh_all(trace, end);
        Ok(())
    }

    fn rupdate(
        &mut self,
        trace: &TraceStore,
        curr: u64,
        dt: u64,
        steps: u64,
    ) -> Result<(), ModelError> {
        let new = curr.saturating_sub(steps * dt);
        let en = self.signals[ENABLE].symbol;
        let wdata_width = self.signals[WDATA].width;
        let mut t = curr;
        // Visit every enable assertion in (new, curr], most recent first,
        // and put back whatever the cell held before that write.
        while let Some((te, v)) = trace.prev_change(en, t) {
            if te <= new {
                break;
            }
            t = te;
            if !self.enabled(&v) {
                continue;
            }
            let addr = trace.value_at(self.signals[ADDR].symbol, te);
            let Some(a) = addr.as_int() else {
                continue;
            };
            if !self.tracked(a) || self.size.is_some_and(|s| a >= s) {
                continue;
            }
            let restored = self
                .last_write_before(trace, a, te)
                .unwrap_or_else(|| Value::unknown(wdata_width));
            self.memory.insert(a, restored);
        }
        self.refresh_all(trace, new);
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = format!("{}: ", self.name);
        if self.show_signals {
            for s in &self.signals {
                out.push_str(&format!("\n    {}: {}", s.short_name, format_value(&s.value)));
            }
        }
        out.push_str("\nmem:\n");
        match self.size {
            Some(size) if self.segments.is_empty() => {
                out.push_str(&self.render_dense_table(size));
            }
            _ => {
                for (addr, value) in &self.memory {
                    out.push_str(&format!("    {addr}: {}\n", format_value(value)));
                }
            }
        }
        out
    }
}
