//! The time-indexed trace store and its query primitives.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use rewind_common::Value;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::parser::{self, ParsedTrace};
use crate::reader::open_trace_reader;
use crate::timescale::{TimeUnit, Timescale};

/// Index of a retained symbol inside a [`TraceStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// One symbol's event timeline: parallel `times`/`values` arrays kept
/// sorted by time so queries binary-search.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Timeline {
    width: u32,
    var_type: String,
    times: Vec<u64>,
    values: Vec<Value>,
}

/// An immutable store of per-symbol event timelines.
///
/// Built once at startup (from a parse or the on-disk cache) and shared by
/// reference afterwards; every query is read-only and deterministic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceStore {
    symbols: Vec<Timeline>,
    names: HashMap<String, SymbolId>,
    end_time: u64,
    timescale: Option<Timescale>,
}

impl TraceStore {
    /// Parses a trace file, retaining only `siglist` signals when given.
    ///
    /// `requested` rescales timestamps into the given unit; `None` keeps
    /// the file's native units.
    pub fn parse(
        path: &Path,
        siglist: Option<&[String]>,
        requested: Option<TimeUnit>,
    ) -> Result<Self, TraceError> {
        let reader = open_trace_reader(path)?;
        Self::parse_reader(reader, siglist, requested)
    }

    /// Parses a trace from an already-open reader. See [`TraceStore::parse`].
    pub fn parse_reader<R: BufRead>(
        reader: R,
        siglist: Option<&[String]>,
        requested: Option<TimeUnit>,
    ) -> Result<Self, TraceError> {
        Ok(Self::from_parsed(parser::parse_trace(
            reader, siglist, requested,
        )?))
    }

    fn from_parsed(parsed: ParsedTrace) -> Self {
        let ParsedTrace {
            timescale,
            symbols,
            names,
            end_time,
        } = parsed;
        let symbols: Vec<Timeline> = symbols
            .into_iter()
            .map(|s| {
                let (times, values) = if s.times.is_empty() {
                    // A symbol never toggled in the file starts unknown.
                    (vec![0], vec![Value::unknown(s.width)])
                } else {
                    (s.times, s.values)
                };
                Timeline {
                    width: s.width,
                    var_type: s.var_type,
                    times,
                    values,
                }
            })
            .collect();
        let names = names
            .into_iter()
            .map(|(name, idx)| (name, SymbolId(idx as u32)))
            .collect();
        Self {
            symbols,
            names,
            end_time,
            timescale,
        }
    }

    /// Resolves a hierarchical name to its symbol.
    pub fn symbol(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// The declared bit width of a symbol.
    pub fn width(&self, id: SymbolId) -> u32 {
        self.symbols[id.0 as usize].width
    }

    /// The last time marker seen in the trace.
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    /// The `$timescale` declaration, if the trace had one.
    pub fn timescale(&self) -> Option<Timescale> {
        self.timescale
    }

    /// Number of retained symbols.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The value of a symbol at time `t`: the value of the latest event
    /// with `event_time <= t`, or all-`x` before the first event.
    pub fn value_at(&self, id: SymbolId, t: u64) -> Value {
        let tl = &self.symbols[id.0 as usize];
        let idx = tl.times.partition_point(|&et| et <= t);
        if idx == 0 {
            Value::unknown(tl.width)
        } else {
            tl.values[idx - 1].clone()
        }
    }

    /// The first event strictly after `t`, if any.
    pub fn next_change(&self, id: SymbolId, t: u64) -> Option<(u64, Value)> {
        let tl = &self.symbols[id.0 as usize];
        let idx = tl.times.partition_point(|&et| et <= t);
        tl.times
            .get(idx)
            .map(|&et| (et, tl.values[idx].clone()))
    }

    /// The last event strictly before `t`, if any.
    pub fn prev_change(&self, id: SymbolId, t: u64) -> Option<(u64, Value)> {
        let tl = &self.symbols[id.0 as usize];
        let idx = tl.times.partition_point(|&et| et < t);
        if idx == 0 {
            None
        } else {
            Some((tl.times[idx - 1], tl.values[idx - 1].clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn clk_trace() -> TraceStore {
        let vcd = "\
$timescale 1ns $end
$scope module top $end
$var wire 1 ! clk $end
$var wire 4 \" data $end
$var wire 1 # idle $end
$upscope $end
$enddefinitions $end
#0
0!
b0000 \"
#10
1!
#20
0!
b1010 \"
#30
1!
";
        TraceStore::parse_reader(Cursor::new(vcd), None, None).unwrap()
    }

    #[test]
    fn value_at_latest_event() {
        let store = clk_trace();
        let clk = store.symbol("top.clk").unwrap();
        assert_eq!(store.value_at(clk, 0).as_bits(), "0");
        assert_eq!(store.value_at(clk, 5).as_bits(), "0");
        assert_eq!(store.value_at(clk, 10).as_bits(), "1");
        assert_eq!(store.value_at(clk, 15).as_bits(), "1");
        assert_eq!(store.value_at(clk, 99).as_bits(), "1");
    }

    #[test]
    fn value_at_ties_take_the_event() {
        let store = clk_trace();
        let data = store.symbol("top.data").unwrap();
        assert_eq!(store.value_at(data, 20).as_int(), Some(0b1010));
        assert_eq!(store.value_at(data, 19).as_int(), Some(0));
    }

    #[test]
    fn untoggled_symbol_is_unknown_from_zero() {
        let store = clk_trace();
        let idle = store.symbol("top.idle").unwrap();
        assert_eq!(store.value_at(idle, 0).as_bits(), "x");
        assert_eq!(store.value_at(idle, 100).as_bits(), "x");
        assert_eq!(store.next_change(idle, 0), None);
    }

    #[test]
    fn next_change_strictly_after() {
        let store = clk_trace();
        let clk = store.symbol("top.clk").unwrap();
        let (t, v) = store.next_change(clk, 5).unwrap();
        assert_eq!((t, v.as_bits().as_str()), (10, "1"));
        let (t, _) = store.next_change(clk, 10).unwrap();
        assert_eq!(t, 20);
        assert!(store.next_change(clk, 30).is_none());
    }

    #[test]
    fn prev_change_strictly_before() {
        let store = clk_trace();
        let clk = store.symbol("top.clk").unwrap();
        let (t, v) = store.prev_change(clk, 20).unwrap();
        assert_eq!((t, v.as_bits().as_str()), (10, "1"));
        assert!(store.prev_change(clk, 0).is_none());
    }

    #[test]
    fn next_and_prev_are_inverses_on_events() {
        let store = clk_trace();
        let clk = store.symbol("top.clk").unwrap();
        // Walking forward then backward from any event returns to it.
        for t in [0u64, 10, 20] {
            let (next_t, _) = store.next_change(clk, t).unwrap();
            let (back_t, _) = store.prev_change(clk, next_t).unwrap();
            assert_eq!(back_t, t);
        }
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let store = clk_trace();
        let data = store.symbol("top.data").unwrap();
        let a = store.value_at(data, 25);
        let b = store.value_at(data, 25);
        assert_eq!(a.as_bits(), b.as_bits());
    }

    #[test]
    fn end_time_and_metadata() {
        let store = clk_trace();
        assert_eq!(store.end_time(), 30);
        assert_eq!(store.timescale().unwrap().to_string(), "1ns");
        assert_eq!(store.symbol_count(), 3);
        assert_eq!(store.width(store.symbol("top.data").unwrap()), 4);
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        let store = clk_trace();
        assert!(store.symbol("top.nope").is_none());
    }

    #[test]
    fn value_before_first_event_is_unknown() {
        let vcd = "\
$scope module t $end
$var wire 2 ! s $end
$upscope $end
$enddefinitions $end
#50
b11 !
";
        let store = TraceStore::parse_reader(Cursor::new(vcd), None, None).unwrap();
        let s = store.symbol("t.s").unwrap();
        assert_eq!(store.value_at(s, 49).as_bits(), "xx");
        assert_eq!(store.value_at(s, 50).as_bits(), "11");
    }
}
