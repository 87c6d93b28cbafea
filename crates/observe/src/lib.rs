//! Logging setup shared by the binaries of this workspace. That includes
//! initialization of the global `tracing` subscriber and a panic hook that
//! routes panic messages through it.
pub mod config;
pub mod tracing;

pub use config::Config;
