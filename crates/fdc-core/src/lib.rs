//! Core types and definitions for the FDC fire-direction calculator.
//!
//! This crate defines the vocabulary shared across the workspace:
//! grid coordinates, angular conversions, reference data records,
//! enums, errors, and tuning constants. It has no dependency on the
//! calculation engine or any runtime framework.

pub mod constants;
pub mod enums;
pub mod errors;
pub mod grid;
pub mod reference;

pub use errors::{FdcError, FdcResult};
pub use grid::GridCoordinate;
