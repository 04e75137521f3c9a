//! CLI command implementations for jstat-exporter.
//!
//! - `check`: target and jstat validation

pub mod check;

pub use check::command_check;
