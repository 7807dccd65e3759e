//! The model: an ordered collection of modules driven by one time cursor.

use std::collections::HashMap;

use rewind_common::SigValue;
use rewind_trace::TraceStore;

use crate::error::ModelError;
use crate::module::DebugModule;

/// The breakpoint evaluator's environment: module name to signal short
/// name to comparison projection (the integer when fully defined, the
/// raw four-state bits otherwise).
pub type SignalDict = HashMap<String, HashMap<String, SigValue>>;

/// An unbound model: modules and a clock period, before a trace exists.
///
/// Modules are declared first so their signal lists can drive the trace
/// parser's retain list; binding the trace then produces a [`DebugModel`].
pub struct ModelDef {
    edge_time: u64,
    modules: Vec<Box<dyn DebugModule>>,
}

impl ModelDef {
    /// Creates an empty model with the given edge duration.
    pub fn new(edge_time: u64) -> Self {
        Self {
            edge_time,
            modules: Vec::new(),
        }
    }

    /// Appends a module, enforcing name uniqueness.
    pub fn add_module(&mut self, module: Box<dyn DebugModule>) -> Result<(), ModelError> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            return Err(ModelError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        self.modules.push(module);
        Ok(())
    }

    /// Every hierarchical signal name any module declares, in model order.
    ///
    /// This is the retain list handed to the trace parser.
    pub fn signal_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for module in &self.modules {
            names.extend(module.signal_names());
        }
        names.sort();
        names.dedup();
        names
    }

    /// The configured edge duration.
    pub fn edge_time(&self) -> u64 {
        self.edge_time
    }

    /// Binds every module against the trace, producing a live model with
    /// the cursor at time 0.
    pub fn bind(mut self, trace: TraceStore) -> Result<DebugModel, ModelError> {
        for module in &mut self.modules {
            module.bind(&trace)?;
        }
        let end_time = trace.end_time();
        Ok(DebugModel {
            trace,
            modules: self.modules,
            edge_time: self.edge_time,
            sim_time: 0,
            end_time,
            generation: 0,
        })
    }
}

/// A bound model: the trace, the modules, and the `sim_time` cursor.
///
/// The cursor starts at 0, never leaves `[0, end_time]`, and is always a
/// multiple of `edge_time`. Every mutation bumps `generation`, which is
/// the change signal the display layer polls.
pub struct DebugModel {
    trace: TraceStore,
    modules: Vec<Box<dyn DebugModule>>,
    edge_time: u64,
    sim_time: u64,
    end_time: u64,
    generation: u64,
}

impl DebugModel {
    /// The current cursor time.
    pub fn sim_time(&self) -> u64 {
        self.sim_time
    }

    /// The last event time in the trace.
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    /// The clock edge duration.
    pub fn edge_time(&self) -> u64 {
        self.edge_time
    }

    /// The mutation counter; changes whenever module state or the cursor
    /// moved.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The backing trace.
    pub fn trace(&self) -> &TraceStore {
        &self.trace
    }

    /// True when no further whole edge fits before `end_time`.
    pub fn at_end(&self) -> bool {
        self.end_time - self.sim_time < self.edge_time
    }

    /// Advances one edge and refreshes every module.
    ///
    /// Returns `false` (and leaves all state untouched) when already at
    /// the end of the trace.
    pub fn edge(&mut self) -> Result<bool, ModelError> {
        if self.at_end() {
            return Ok(false);
        }
        let curr = self.sim_time;
        for module in &mut self.modules {
            module.edge(&self.trace, curr, self.edge_time)?;
        }
        self.sim_time = curr + self.edge_time;
        self.generation += 1;
        Ok(true)
    }

    /// Skips forward `n` edges, clamped to the end of the trace.
    pub fn update(&mut self, n: u64) -> Result<(), ModelError> {
        let steps = n.min((self.end_time - self.sim_time) / self.edge_time);
        if steps == 0 {
            return Ok(());
        }
        let curr = self.sim_time;
        for module in &mut self.modules {
            module.update(&self.trace, curr, self.edge_time, steps)?;
        }
        self.sim_time = curr + steps * self.edge_time;
        self.generation += 1;
        Ok(())
    }

    /// Skips backward `n` edges, clamped to time 0.
    pub fn rupdate(&mut self, n: u64) -> Result<(), ModelError> {
        let steps = n.min(self.sim_time / self.edge_time);
        if steps == 0 {
            return Ok(());
        }
        let curr = self.sim_time;
        for module in &mut self.modules {
            module.rupdate(&self.trace, curr, self.edge_time, steps)?;
        }
        self.sim_time = curr - steps * self.edge_time;
        self.generation += 1;
        Ok(())
    }

    /// The model-wide signal dictionary for breakpoint evaluation.
    pub fn signal_dict(&self) -> SignalDict {
        self.modules
            .iter()
            .map(|m| (m.name().to_string(), m.signal_dict()))
            .collect()
    }

    /// Module names in declaration order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Looks up a module by name.
    pub fn module(&self, name: &str) -> Option<&dyn DebugModule> {
        self.modules
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    /// The modules, in declaration order.
    pub fn modules(&self) -> impl Iterator<Item = &dyn DebugModule> {
        self.modules.iter().map(|m| m.as_ref())
    }

    /// True when any signal of any module currently carries an `x` bit.
    pub fn has_unknown(&self) -> bool {
        self.modules
            .iter()
            .any(|m| m.signals().iter().any(|s| s.value.has_unknown()))
    }
}
