/// Execution Worker - Isolated Interpreter Host
///
/// **Core Responsibility:**
/// Own one long-lived ECMAScript interpreter, isolated on a dedicated OS
/// thread, and turn execution requests into terminal replies.
///
/// **Contract:**
/// - The interpreter context is built once, on thread start, and reused
///   across requests; requests arriving before it is ready queue in the
///   channel and run in arrival order.
/// - One request executes fully before the next starts; a request is not
///   cancellable once started.
/// - stdout/stderr are merged: a `print` global (aliased by
///   `console.log`/`error`/`warn`/`info`) appends one line per call to a
///   capture buffer that is cleared per request. No captured output ever
///   leaks across requests.
/// - The interpreter's global scope is intentionally reused across runs;
///   redefinition collisions between runs are acceptable (single user,
///   single session).
///
/// The boa `Context` is not `Send`, which is exactly why all coordination
/// happens over channels rather than shared memory.

use crate::config::EngineConfig;
use anyhow::{anyhow, Context as _, Result};
use boa_engine::context::ContextBuilder;
use boa_engine::{js_string, Context, JsResult, JsValue, NativeFunction, Source};
use praxis_common::types::{ExecutionReply, ExecutionRequest};
use std::cell::RefCell;
use std::sync::mpsc;
use std::thread;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

thread_local! {
    // Per-thread because the interpreter thread is the only writer and
    // reader; one worker per thread keeps requests fully isolated.
    static CAPTURED_OUTPUT: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

const CONSOLE_SHIM: &str =
    "var console = { log: print, error: print, warn: print, info: print };";

enum WorkerMessage {
    Execute(ExecutionRequest),
    Shutdown,
}

/// Handle to the interpreter thread. Dropping it releases the worker: a
/// shutdown message is sent and the thread is detached, mirroring the
/// fact that a script stuck in a loop cannot be force-killed, only
/// abandoned.
pub struct ExecutionWorker {
    sender: mpsc::Sender<WorkerMessage>,
}

impl ExecutionWorker {
    /// Spawn the interpreter thread. Replies for every submitted request
    /// are delivered on `replies`, exactly one per request.
    pub fn spawn(config: &EngineConfig, replies: UnboundedSender<ExecutionReply>) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let config = config.clone();

        thread::Builder::new()
            .name("praxis-interpreter".to_string())
            .spawn(move || interpreter_loop(&config, &receiver, &replies))
            .context("failed to spawn interpreter thread")?;

        Ok(Self { sender })
    }

    /// Queue a request for execution. Fails only when the worker thread
    /// is gone.
    pub fn submit(&self, request: ExecutionRequest) -> Result<()> {
        self.sender
            .send(WorkerMessage::Execute(request))
            .map_err(|_| anyhow!("execution worker is no longer running"))
    }
}

impl Drop for ExecutionWorker {
    fn drop(&mut self) {
        // Best effort: a worker stuck in user code will never read this
        // and stays abandoned until process exit.
        let _ = self.sender.send(WorkerMessage::Shutdown);
    }
}

fn interpreter_loop(
    config: &EngineConfig,
    requests: &mpsc::Receiver<WorkerMessage>,
    replies: &UnboundedSender<ExecutionReply>,
) {
    let mut context = match build_context(config) {
        Ok(context) => context,
        Err(err) => {
            error!(error = %err, "interpreter initialization failed");
            // Keep the contract of one reply per request even though
            // nothing can execute.
            while let Ok(message) = requests.recv() {
                match message {
                    WorkerMessage::Execute(request) => {
                        let reply = ExecutionReply {
                            id: request.id,
                            captured_output: String::new(),
                            structured_result: None,
                            error: Some(format!("interpreter failed to initialize: {err}")),
                        };
                        if replies.send(reply).is_err() {
                            break;
                        }
                    }
                    WorkerMessage::Shutdown => break,
                }
            }
            return;
        }
    };

    info!(
        loop_iteration_limit = config.loop_iteration_limit,
        recursion_limit = config.recursion_limit,
        "interpreter ready"
    );

    while let Ok(message) = requests.recv() {
        match message {
            WorkerMessage::Execute(request) => {
                let reply = execute(&mut context, &request);
                if replies.send(reply).is_err() {
                    // Bridge dropped; no one is listening anymore.
                    break;
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }

    debug!("interpreter thread exiting");
}

fn build_context(config: &EngineConfig) -> Result<Context> {
    let mut context = ContextBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to construct interpreter context: {err}"))?;

    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(config.loop_iteration_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(config.recursion_limit);

    context
        .register_global_callable(js_string!("print"), 1, NativeFunction::from_fn_ptr(print_line))
        .map_err(|err| anyhow!("failed to register print: {err}"))?;
    context
        .eval(Source::from_bytes(CONSOLE_SHIM.as_bytes()))
        .map_err(|err| anyhow!("failed to install console shim: {err}"))?;

    Ok(context)
}

/// Native `print`: space-joins its arguments and appends one line to the
/// capture buffer.
fn print_line(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(arg.to_string(context)?.to_std_string_escaped());
    }
    CAPTURED_OUTPUT.with(|buffer| buffer.borrow_mut().push(parts.join(" ")));
    Ok(JsValue::undefined())
}

fn execute(context: &mut Context, request: &ExecutionRequest) -> ExecutionReply {
    CAPTURED_OUTPUT.with(|buffer| buffer.borrow_mut().clear());
    debug!(
        request_id = %request.id,
        source_bytes = request.source_code.len(),
        "executing request"
    );

    match context.eval(Source::from_bytes(request.source_code.as_bytes())) {
        Ok(value) => {
            let structured_result = if value.is_undefined() {
                None
            } else {
                value
                    .to_string(context)
                    .ok()
                    .map(|rendered| rendered.to_std_string_escaped())
            };
            let captured_output = CAPTURED_OUTPUT.with(|buffer| buffer.borrow().join("\n"));
            ExecutionReply {
                id: request.id,
                captured_output,
                structured_result,
                error: None,
            }
        }
        Err(err) => ExecutionReply {
            id: request.id,
            captured_output: String::new(),
            structured_result: None,
            error: Some(err.to_string()),
        },
    }
}
