//! Shared foundational types for the Rewind trace debugger.
//!
//! This crate provides the four-state logic scalar, the packed four-state
//! [`Value`] bit-vector used throughout the trace store and hardware model,
//! and content hashing for cache validation.

#![warn(missing_docs)]

pub mod hash;
pub mod logic;
pub mod value;

pub use hash::ContentHash;
pub use logic::Logic;
pub use value::{SigValue, Value};
