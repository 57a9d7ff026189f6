//! Supervises the stdio session from startup to the final exit decision.

use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use terraform_mcp_config::{RunConfiguration, TfeAccess, TfeSettings};

use crate::build_info::BuildInfo;
use crate::dispatch::{Dispatcher, ToolRegistry};
use crate::telemetry::{SERVER_STARTED_EVENT, TelemetrySink, TracingDestination};
use crate::transport::{
    BoxedReader, BoxedWriter, Recorder, RecordingTap, StreamPair, TracingRecorder, TransportError,
    TransportSession, serve,
};

use super::errors::LaunchError;
use super::reporter::{LifecycleReporter, LifecycleState, StructuredLifecycleReporter};
use super::shutdown::{InterruptGuard, InterruptListener, ShutdownToken, SignalInterruptListener};
use super::{PROCESS_TARGET, TELEMETRY_FLUSH_TIMEOUT};

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShutdownReason {
    /// An interruption arrived before the message loop finished.
    Interrupted,
    /// The client closed the input stream.
    StreamClosed,
}

/// First event that moves the supervisor out of `Running`.
#[derive(Debug)]
enum ShutdownTrigger {
    Interrupted,
    Terminated(Result<(), TransportError>),
}

/// Interruption source and the token it cancels.
pub(crate) struct ProcessControl<L> {
    pub(crate) interrupts: L,
    pub(crate) token: ShutdownToken,
}

/// Services shared with the message loop and the dispatcher.
pub(crate) struct ServiceDeps {
    pub(crate) registry: ToolRegistry,
    pub(crate) telemetry: Arc<TelemetrySink>,
    pub(crate) reporter: Arc<dyn LifecycleReporter>,
    pub(crate) recorder: Arc<dyn Recorder>,
}

/// Collaborators required to run one session.
pub(crate) struct LaunchPlan<R, W, L> {
    pub(crate) config: RunConfiguration,
    pub(crate) streams: StreamPair<R, W>,
    pub(crate) process: ProcessControl<L>,
    pub(crate) services: ServiceDeps,
}

/// Serves MCP over the process's stdin and stdout until the client
/// disconnects or the process is interrupted.
///
/// # Errors
///
/// Returns a [`LaunchError`] when startup fails or the session ends with a
/// transport failure.
pub fn run_stdio_server(
    config: RunConfiguration,
    registry: ToolRegistry,
) -> Result<ShutdownReason, LaunchError> {
    let telemetry = Arc::new(TelemetrySink::spawn(
        TracingDestination,
        TELEMETRY_FLUSH_TIMEOUT,
    )?);
    let plan = LaunchPlan {
        config,
        streams: StreamPair::new(io::stdin(), io::stdout()),
        process: ProcessControl {
            interrupts: SignalInterruptListener::new(),
            token: ShutdownToken::new(),
        },
        services: ServiceDeps {
            registry,
            telemetry,
            reporter: Arc::new(StructuredLifecycleReporter::new()),
            recorder: Arc::new(TracingRecorder),
        },
    };
    run_server_with(plan)
}

/// Runs a session with injected collaborators.
///
/// The telemetry sink is closed exactly once on every path out of this
/// function, including startup failures after the sink was handed over.
pub(crate) fn run_server_with<R, W, L>(
    plan: LaunchPlan<R, W, L>,
) -> Result<ShutdownReason, LaunchError>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
    L: InterruptListener,
{
    let LaunchPlan {
        config,
        streams,
        process,
        services,
    } = plan;
    let ProcessControl { interrupts, token } = process;
    let ServiceDeps {
        registry,
        telemetry,
        reporter,
        recorder,
    } = services;

    reporter.state_changed(LifecycleState::Initializing);
    let build = BuildInfo::current();
    info!(
        target: PROCESS_TARGET,
        version = build.version,
        commit = build.commit,
        read_only = config.read_only(),
        command_logging = config.log_commands(),
        dynamic_toolsets = config.dynamic_toolsets(),
        export_translations = config.export_translations(),
        "starting MCP server"
    );
    telemetry.track(SERVER_STARTED_EVENT, build.attributes());
    report_enterprise_access(config.tfe());

    let guard = match interrupts.install(&token) {
        Ok(guard) => guard,
        Err(source) => {
            abort_startup(&telemetry, &*reporter, None);
            return Err(source.into());
        }
    };

    let (trigger_tx, triggers) = mpsc::channel();
    let interrupt_tx = trigger_tx.clone();
    token.on_cancel(move || {
        if interrupt_tx.send(ShutdownTrigger::Interrupted).is_err() {
            debug!(target: PROCESS_TARGET, "interruption arrived after shutdown");
        }
    });

    let session_streams = if config.log_commands() {
        RecordingTap::wrap(streams, recorder).boxed()
    } else {
        streams.boxed()
    };
    let dispatcher = Dispatcher::new(registry, config, Arc::clone(&telemetry));
    let session = TransportSession::new(session_streams, token.clone());
    let loop_thread = match spawn_loop(session, dispatcher, trigger_tx) {
        Ok(handle) => handle,
        Err(source) => {
            token.cancel();
            abort_startup(&telemetry, &*reporter, Some(guard));
            return Err(LaunchError::Spawn { source });
        }
    };

    reporter.state_changed(LifecycleState::Running);
    reporter.listening();

    // The loop thread sends exactly once, even when `serve` panics.
    let trigger = triggers
        .recv()
        .unwrap_or(ShutdownTrigger::Terminated(Err(TransportError::LoopPanicked)));

    reporter.state_changed(LifecycleState::ShuttingDown);
    let outcome = match trigger {
        ShutdownTrigger::Interrupted => {
            reporter.interrupted();
            Ok(ShutdownReason::Interrupted)
        }
        ShutdownTrigger::Terminated(Ok(())) => Ok(ShutdownReason::StreamClosed),
        ShutdownTrigger::Terminated(Err(source)) => {
            reporter.transport_failed(&source);
            Err(LaunchError::Transport { source })
        }
    };

    token.cancel();
    guard.release();
    reporter.telemetry_closed(telemetry.close());

    match &outcome {
        Ok(ShutdownReason::Interrupted) => {
            debug!(target: PROCESS_TARGET, "message loop left to finish in the background");
        }
        Ok(ShutdownReason::StreamClosed) | Err(_) => join_loop(loop_thread),
    }

    reporter.state_changed(LifecycleState::Terminated);
    info!(target: PROCESS_TARGET, ok = outcome.is_ok(), "shutdown sequence completed");
    outcome
}

fn spawn_loop(
    session: TransportSession<BoxedReader, BoxedWriter>,
    dispatcher: Dispatcher,
    trigger_tx: mpsc::Sender<ShutdownTrigger>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("message-loop".to_owned())
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| serve(session, &dispatcher)))
                .unwrap_or(Err(TransportError::LoopPanicked));
            if trigger_tx.send(ShutdownTrigger::Terminated(result)).is_err() {
                debug!(target: PROCESS_TARGET, "message loop finished after shutdown");
            }
        })
}

fn abort_startup(
    telemetry: &TelemetrySink,
    reporter: &dyn LifecycleReporter,
    guard: Option<InterruptGuard>,
) {
    if let Some(installed) = guard {
        installed.release();
    }
    reporter.telemetry_closed(telemetry.close());
    reporter.state_changed(LifecycleState::Terminated);
}

fn report_enterprise_access(tfe: &TfeSettings) {
    match tfe.access() {
        TfeAccess::Anonymous => warn!(
            target: PROCESS_TARGET,
            "HCP_TFE_TOKEN not set, defaulting to non-authenticated client"
        ),
        TfeAccess::DefaultAddress(address) => warn!(
            target: PROCESS_TARGET,
            address,
            "HCP_TFE_ADDRESS not set, defaulting to {address}"
        ),
        TfeAccess::Configured(address) => {
            info!(target: PROCESS_TARGET, address, "using Terraform Enterprise");
        }
    }
}

fn join_loop(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        warn!(target: PROCESS_TARGET, "message loop thread panicked");
    }
}
