//! Fire-direction calculation engine.
//!
//! Consumes already-parsed reference data and ballistic tables, and produces
//! firing solutions: grid geodesy, table interpolation, tactical charge
//! selection, observer-correction recomputation, and multi-emitter
//! synchronization. Pure synchronous computation over immutable inputs; the
//! engine performs no I/O and keeps no mutable state between queries.

pub mod adjustment;
pub mod allocation;
pub mod engine;
pub mod formation;
pub mod interpolate;
pub mod sync;
pub mod table;
pub mod tactical;

pub use engine::{FireDirectionEngine, FiringSolution, SolveOptions};
pub use table::BallisticTable;

#[cfg(test)]
mod tests;
