// Engine configuration with in-code defaults and environment overrides

use std::env;
use std::time::Duration;
use tracing::warn;

/// Runtime budget for code execution.
///
/// `run_timeout` is the bridge's wall-clock budget per run; the worker
/// itself cannot be preempted mid-evaluation, so the interpreter's
/// loop-iteration and recursion limits are the cooperative backstop that
/// eventually stops runaway scripts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub run_timeout: Option<Duration>,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_timeout: Some(Duration::from_secs(10)),
            loop_iteration_limit: 10_000_000,
            recursion_limit: 512,
        }
    }
}

impl EngineConfig {
    /// Defaults with environment overrides applied:
    /// `PRAXIS_RUN_TIMEOUT_MS` (0 disables the wall-clock budget),
    /// `PRAXIS_LOOP_ITERATION_LIMIT`, `PRAXIS_RECURSION_LIMIT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_env::<u64>("PRAXIS_RUN_TIMEOUT_MS") {
            config.run_timeout = if ms == 0 {
                None
            } else {
                Some(Duration::from_millis(ms))
            };
        }
        if let Some(limit) = parse_env::<u64>("PRAXIS_LOOP_ITERATION_LIMIT") {
            config.loop_iteration_limit = limit;
        }
        if let Some(limit) = parse_env::<usize>("PRAXIS_RECURSION_LIMIT") {
            config.recursion_limit = limit;
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}
