//! The hardware-model engine: groupings of trace signals into modules with
//! forward/backward time-motion semantics.
//!
//! A [`DebugModel`] owns an ordered set of [`DebugModule`]s over one
//! [`rewind_trace::TraceStore`] and drives them with a monotone `sim_time`
//! cursor. Basic modules mirror signal values; memory modules reconstruct
//! addressed storage by replaying enabled writes (in both directions);
//! core modules designate a program counter for source-level stepping.

#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod model;
pub mod module;
pub mod signal;
pub mod spec;

pub use error::ModelError;
pub use memory::{MemoryModule, Segment};
pub use model::{DebugModel, ModelDef, SignalDict};
pub use module::{format_value, BasicModule, CoreModule, DebugModule};
pub use rewind_common::SigValue;
pub use signal::Signal;
pub use spec::{parse_model_args, resolve_model};
