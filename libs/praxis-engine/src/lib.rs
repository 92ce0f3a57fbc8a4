//! Execution engine for praxis: an isolated interpreter worker, a bridge
//! that owns it, a test-harness generator, and a verdict extractor.
//!
//! Data flow: caller → harness (source text) → bridge (dispatch) →
//! worker (execute, capture output) → results (extract verdicts).

pub mod bridge;
pub mod config;
pub mod harness;
pub mod results;
pub mod worker;

#[cfg(test)]
mod engine_tests;

pub use bridge::ExecutionBridge;
pub use config::EngineConfig;
pub use harness::{build_harness, VERDICT_SENTINEL};
pub use results::{console_lines, extract_verdicts};
pub use worker::ExecutionWorker;
