/// Execution Bridge - Owned Execution Session
///
/// **Core Responsibility:**
/// Own the worker's lifecycle and expose a fire-and-forget
/// request/response surface with transient running-state.
///
/// **Contract:**
/// - Construction spawns the worker and installs a single reply-consuming
///   task for the worker's lifetime; dropping the bridge releases the
///   worker.
/// - `run` clears accumulated output, marks the session running, assigns
///   a fresh request id, dispatches, and returns immediately. Completion
///   is observed later through `is_running`/`output`.
/// - Replies are correlated against the single in-flight request id. A
///   reply for a superseded or unknown id is logged and dropped, never
///   misattributed to the current run.
/// - At most one run is in flight per bridge; a second `run` before the
///   first reply simply supersedes it. Runs are serialized by the single
///   worker thread regardless.
/// - When configured, a wall-clock budget finishes the run with a defined
///   timed-out error line; the worker itself cannot be preempted, so the
///   late reply is discarded on arrival.

use crate::config::EngineConfig;
use crate::worker::ExecutionWorker;
use anyhow::Result;
use praxis_common::types::{ExecutionRequest, ExecutionReply};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct RunState {
    /// Append-only per run; reset at run start.
    output: Vec<String>,
    /// Id of the request whose reply we are waiting for.
    in_flight: Option<Uuid>,
}

pub struct ExecutionBridge {
    worker: ExecutionWorker,
    state: Arc<Mutex<RunState>>,
    run_timeout: Option<Duration>,
}

impl ExecutionBridge {
    /// Create the session. Must be called within a tokio runtime: the
    /// reply handler and timeout timers run as tokio tasks.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let (reply_tx, mut reply_rx) = tokio::sync::mpsc::unbounded_channel::<ExecutionReply>();
        let worker = ExecutionWorker::spawn(&config, reply_tx)?;
        let state = Arc::new(Mutex::new(RunState::default()));

        let reply_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(reply) = reply_rx.recv().await {
                let mut state = lock(&reply_state);
                if state.in_flight != Some(reply.id) {
                    warn!(request_id = %reply.id, "dropping reply for superseded request");
                    continue;
                }
                state.in_flight = None;

                if let Some(error) = reply.error {
                    state.output.push(format!("Error: {error}"));
                } else if !reply.captured_output.is_empty() {
                    state.output.push(reply.captured_output);
                }
                // reply.structured_result is available here but is not
                // surfaced by this layer.
            }
            debug!("reply channel closed");
        });

        Ok(Self {
            worker,
            state,
            run_timeout: config.run_timeout,
        })
    }

    /// Dispatch a run and return its request id immediately.
    pub fn run(&self, source_code: &str) -> Uuid {
        let id = Uuid::new_v4();
        {
            let mut state = lock(&self.state);
            state.output.clear();
            state.in_flight = Some(id);
        }
        debug!(request_id = %id, "dispatching run");

        let request = ExecutionRequest {
            id,
            source_code: source_code.to_string(),
        };
        if let Err(err) = self.worker.submit(request) {
            let mut state = lock(&self.state);
            state.in_flight = None;
            state.output.push(format!("Error: {err}"));
            return id;
        }

        if let Some(timeout) = self.run_timeout {
            let timer_state = Arc::clone(&self.state);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let mut state = lock(&timer_state);
                if state.in_flight == Some(id) {
                    state.in_flight = None;
                    state
                        .output
                        .push(format!("Error: execution timed out after {}ms", timeout.as_millis()));
                    warn!(
                        request_id = %id,
                        timeout_ms = timeout.as_millis() as u64,
                        "run exceeded wall-clock budget"
                    );
                }
            });
        }

        id
    }

    /// Output entries accumulated by the current (or last finished) run.
    pub fn output(&self) -> Vec<String> {
        lock(&self.state).output.clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
