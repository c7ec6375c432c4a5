//! DCC bridge daemon library surface.
//!
//! The binary in `main.rs` is a thin wiring layer; argument and
//! configuration handling live here so they stay testable.

pub mod cli;
pub mod config;
