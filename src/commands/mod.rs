//! Subcommand implementations.
//!
//! Each subcommand is a thin consumer of the resolved configuration store;
//! resolution itself happens in `main` before any of these run.

pub mod demo;
pub mod gencert;
pub mod grace;
