//! Common types used throughout curvepay.
//!
//! [`market`] holds the curve, receipt and settlement records; [`execution`] holds the state keys,
//! stored values, submitted instructions and emitted events, all with a stable binary encoding.

pub mod execution;
pub mod market;

pub use execution::{Event, Instruction, Key, Value};
