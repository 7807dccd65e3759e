//! The breakpoint table: compiled predicates with session-stable ids.

use crate::error::ExprError;
use crate::eval::eval;
use crate::{compile, Compiled, Env};

/// One breakpoint: a session-unique id and its compiled predicate.
#[derive(Clone, Debug)]
pub struct Breakpoint {
    /// The id reported to the user. Ids count up from 0 and are never
    /// reused, so gaps from deletions stay gaps.
    pub id: u32,
    /// The compiled predicate (source text plus AST).
    pub compiled: Compiled,
}

/// The session's breakpoints, evaluated in creation order.
#[derive(Clone, Debug, Default)]
pub struct BreakpointSet {
    breakpoints: Vec<Breakpoint>,
    next_id: u32,
}

impl BreakpointSet {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `source` against the current environment and registers it.
    /// Returns the new breakpoint's id.
    pub fn set(&mut self, source: &str, env: &Env) -> Result<u32, ExprError> {
        let compiled = compile(source, env)?;
        let id = self.next_id;
        self.next_id += 1;
        self.breakpoints.push(Breakpoint { id, compiled });
        Ok(id)
    }

    /// All breakpoints as `(id, source)`, in creation order.
    pub fn list(&self) -> impl Iterator<Item = (u32, &str)> {
        self.breakpoints
            .iter()
            .map(|b| (b.id, b.compiled.source.as_str()))
    }

    /// Deletes the breakpoint with the given id.
    pub fn delete(&mut self, id: u32) -> Result<(), ExprError> {
        let before = self.breakpoints.len();
        self.breakpoints.retain(|b| b.id != id);
        if self.breakpoints.len() < before {
            Ok(())
        } else {
            Err(ExprError::UnknownBreakpoint { id })
        }
    }

    /// True when no breakpoints exist (the stepping loop's fast-path
    /// condition).
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Evaluates every breakpoint in creation order against the snapshot
    /// and returns the first hit.
    pub fn check(&self, env: &Env) -> Option<u32> {
        self.breakpoints
            .iter()
            .find(|b| eval(&b.compiled.expr, env).map(|v| v.is_hit()).unwrap_or(false))
            .map(|b| b.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_common::{SigValue, Value};
    use std::collections::HashMap;

    fn env(addr: i64) -> Env {
        sig_env(SigValue::Int(addr))
    }

    fn bits_env(bits: &str) -> Env {
        sig_env(SigValue::Bits(Value::from_bits(bits).unwrap()))
    }

    fn sig_env(addr: SigValue) -> Env {
        let mut mem = HashMap::new();
        mem.insert("addr".to_string(), addr);
        let mut env = HashMap::new();
        env.insert("mem".to_string(), mem);
        env
    }

    #[test]
    fn ids_count_from_zero() {
        let mut set = BreakpointSet::new();
        assert_eq!(set.set("mem.addr == 1", &env(0)).unwrap(), 0);
        assert_eq!(set.set("mem.addr == 2", &env(0)).unwrap(), 1);
    }

    #[test]
    fn deleted_ids_leave_gaps() {
        let mut set = BreakpointSet::new();
        set.set("mem.addr == 1", &env(0)).unwrap();
        set.set("mem.addr == 2", &env(0)).unwrap();
        set.delete(0).unwrap();
        let id = set.set("mem.addr == 3", &env(0)).unwrap();
        assert_eq!(id, 2);
        let listed: Vec<u32> = set.list().map(|(id, _)| id).collect();
        assert_eq!(listed, vec![1, 2]);
    }

    #[test]
    fn delete_unknown_id_fails() {
        let mut set = BreakpointSet::new();
        assert!(matches!(
            set.delete(7),
            Err(ExprError::UnknownBreakpoint { id: 7 })
        ));
    }

    #[test]
    fn set_rejects_bad_predicates() {
        let mut set = BreakpointSet::new();
        assert!(set.set("mem.addr", &env(0)).is_err());
        assert!(set.set("mem.nope == 1", &env(0)).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn check_returns_first_hit_in_creation_order() {
        let mut set = BreakpointSet::new();
        set.set("mem.addr > 3", &env(0)).unwrap();
        set.set("mem.addr == 5", &env(0)).unwrap();
        assert_eq!(set.check(&env(5)), Some(0));
        assert_eq!(set.check(&env(4)), Some(0));
        assert_eq!(set.check(&env(2)), None);
    }

    #[test]
    fn check_masked_matches_partial_values() {
        let mut set = BreakpointSet::new();
        set.set("mem.addr == 5", &env(0)).unwrap();
        // 1x0 cannot be 5 (its low bit is driven 0); 1x1 and a fully
        // unknown value can.
        assert_eq!(set.check(&bits_env("1x0")), None);
        assert_eq!(set.check(&bits_env("1x1")), Some(0));
        assert_eq!(set.check(&bits_env("xxx")), Some(0));
    }

    #[test]
    fn check_skips_undecidable_predicates() {
        let mut set = BreakpointSet::new();
        set.set("mem.addr + 1 == 6", &env(0)).unwrap();
        // Arithmetic over partial bits cannot be decided: not a hit.
        assert_eq!(set.check(&bits_env("1x1")), None);
        assert_eq!(set.check(&env(5)), Some(0));
    }

    #[test]
    fn list_preserves_source_text() {
        let mut set = BreakpointSet::new();
        set.set("mem.addr == 5", &env(0)).unwrap();
        let listed: Vec<(u32, &str)> = set.list().collect();
        assert_eq!(listed, vec![(0, "mem.addr == 5")]);
    }
}
