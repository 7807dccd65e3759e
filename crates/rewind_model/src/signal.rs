//! Signals bind hierarchical trace names to live values.

use rewind_common::Value;
use rewind_trace::{SymbolId, TraceStore};

use crate::error::ModelError;

/// A traced signal inside a module: the declared hierarchical name, the
/// trace symbol it resolved to, and its value at the current cursor time.
#[derive(Clone, Debug)]
pub struct Signal {
    /// The hierarchical name as declared in the model (may carry a
    /// trailing `[msb:lsb]` slice).
    pub hier_name: String,
    /// The resolved trace symbol.
    pub symbol: SymbolId,
    /// Declared trace width.
    pub width: u32,
    /// The display name: the slice-stripped suffix of `hier_name`, deep
    /// enough to be unique within the owning module.
    pub short_name: String,
    /// The value at the model's current time.
    pub value: Value,
}

impl Signal {
    /// Resolves a declared name against the trace.
    ///
    /// The `[msb:lsb]` slice, if present, is stripped before lookup (trace
    /// keys never carry one). The initial value is the value at time 0.
    pub fn bind(hier_name: &str, trace: &TraceStore) -> Result<Self, ModelError> {
        let lookup = strip_slice(hier_name);
        let symbol = trace
            .symbol(lookup)
            .ok_or_else(|| ModelError::UnknownSignal {
                name: hier_name.to_string(),
            })?;
        Ok(Self {
            hier_name: hier_name.to_string(),
            symbol,
            width: trace.width(symbol),
            short_name: last_components(lookup, 1),
            value: trace.value_at(symbol, 0),
        })
    }

    /// Refreshes the value to the trace contents at time `t`.
    pub fn refresh(&mut self, trace: &TraceStore, t: u64) {
        self.value = trace.value_at(self.symbol, t);
    }
}

/// Strips a trailing `[msb:lsb]` (or `[idx]`) slice from a signal name.
pub fn strip_slice(name: &str) -> &str {
    if name.ends_with(']') {
        if let Some(open) = name.rfind('[') {
            return &name[..open];
        }
    }
    name
}

/// The last `depth` dot-separated components of a name.
fn last_components(name: &str, depth: usize) -> String {
    let parts: Vec<&str> = name.split('.').collect();
    let start = parts.len().saturating_sub(depth);
    parts[start..].join(".")
}

/// Assigns display names, deepening the dotted suffix until every name in
/// the slice is distinct (or the full path is reached).
pub fn assign_short_names(signals: &mut [Signal]) {
    let stripped: Vec<String> = signals
        .iter()
        .map(|s| strip_slice(&s.hier_name).to_string())
        .collect();
    let max_depth = stripped
        .iter()
        .map(|n| n.split('.').count())
        .max()
        .unwrap_or(1);

    for depth in 1..=max_depth {
        let candidates: Vec<String> = stripped
            .iter()
            .map(|n| last_components(n, depth))
            .collect();
        let mut seen = std::collections::HashSet::new();
        if candidates.iter().all(|c| seen.insert(c.clone())) || depth == max_depth {
            for (signal, short) in signals.iter_mut().zip(candidates) {
                signal.short_name = short;
            }
            return;
        }
    }
}
