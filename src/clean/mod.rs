//! Source-specific cleaners.
//!
//! Each cleaner is an independent stage: one raw tabular input, one cleaned
//! CSV output with a documented column set. Filtering is best-effort: rows
//! that fail a quality rule are dropped and counted, never fatal. Only
//! structural problems (missing file, missing column) abort a stage.

pub mod doe;
pub mod epa;
pub mod nhtsa;
