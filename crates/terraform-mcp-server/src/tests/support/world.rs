//! Scenario world driving the supervisor on a background thread.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::Value;

use terraform_mcp_config::RunConfiguration;

use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_server_with};
use crate::process::{LaunchError, LifecycleReporter, ShutdownReason, ShutdownToken};
use crate::telemetry::TelemetrySink;
use crate::transport::{BoxedWriter, Recorder, StreamPair};

use super::{
    ChannelReader, CollectingDestination, FailingWriter, LifecycleEvent, ManualInterruptListener,
    MemoryRecorder, RecordingLifecycleReporter, SharedBuffer, channel_input, fixture_registry,
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Result type returned by fallible steps.
pub type StepResult = Result<(), String>;

type RunResult = Result<ShutdownReason, LaunchError>;

/// Collaborators and observations for one supervisor run.
pub struct LifecycleWorld {
    pub config: RunConfiguration,
    input: Option<Sender<Vec<u8>>>,
    reader: Option<ChannelReader>,
    failing_output: bool,
    pub output: SharedBuffer,
    pub token: ShutdownToken,
    pub interrupts: ManualInterruptListener,
    pub reporter: Arc<RecordingLifecycleReporter>,
    pub recorder: Arc<MemoryRecorder>,
    pub destination: CollectingDestination,
    telemetry: Option<Arc<TelemetrySink>>,
    handle: Option<JoinHandle<RunResult>>,
    result: Option<RunResult>,
}

impl LifecycleWorld {
    /// A world with default configuration and an open, idle input stream.
    pub fn new() -> Self {
        let (input, reader) = channel_input();
        Self {
            config: RunConfiguration::default(),
            input: Some(input),
            reader: Some(reader),
            failing_output: false,
            output: SharedBuffer::default(),
            token: ShutdownToken::new(),
            interrupts: ManualInterruptListener::default(),
            reporter: Arc::new(RecordingLifecycleReporter::default()),
            recorder: Arc::new(MemoryRecorder::default()),
            destination: CollectingDestination::default(),
            telemetry: None,
            handle: None,
            result: None,
        }
    }

    /// Makes every write to the output stream fail.
    pub fn fail_output(&mut self) {
        self.failing_output = true;
    }

    /// Starts the supervisor on a background thread.
    pub fn start(&mut self) -> StepResult {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| "supervisor already started".to_owned())?;
        let writer: BoxedWriter = if self.failing_output {
            Box::new(FailingWriter)
        } else {
            Box::new(self.output.clone())
        };
        let telemetry = Arc::new(
            TelemetrySink::spawn(self.destination.clone(), FLUSH_TIMEOUT)
                .map_err(|error| error.to_string())?,
        );
        self.telemetry = Some(Arc::clone(&telemetry));
        let plan = LaunchPlan {
            config: self.config.clone(),
            streams: StreamPair::new(reader, writer),
            process: ProcessControl {
                interrupts: self.interrupts.clone(),
                token: self.token.clone(),
            },
            services: ServiceDeps {
                registry: fixture_registry(),
                telemetry,
                reporter: Arc::clone(&self.reporter) as Arc<dyn LifecycleReporter>,
                recorder: Arc::clone(&self.recorder) as Arc<dyn Recorder>,
            },
        };
        self.handle = Some(thread::spawn(move || run_server_with(plan)));
        Ok(())
    }

    /// Sends one line to the server's input.
    pub fn send(&self, line: &str) -> StepResult {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| "input already closed".to_owned())?;
        input
            .send(format!("{line}\n").into_bytes())
            .map_err(|error| error.to_string())
    }

    /// Closes the server's input stream.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Delivers an interruption once the listener is installed.
    pub fn interrupt(&self) -> StepResult {
        wait_until(|| self.interrupts.is_installed(), "interrupt listener installation")?;
        if self.interrupts.interrupt() {
            Ok(())
        } else {
            Err("interrupt listener not installed".to_owned())
        }
    }

    /// Waits for the running banner.
    pub fn wait_until_listening(&self) -> StepResult {
        wait_until(
            || self.reporter.events().contains(&LifecycleEvent::Listening),
            "the message loop to start",
        )
    }

    /// Waits until `count` response lines have been written.
    pub fn wait_for_responses(&self, count: usize) -> StepResult {
        wait_until(|| self.output.lines().len() >= count, "responses")
    }

    /// Decodes the `index`th response line, counting from one.
    pub fn response(&self, index: usize) -> Result<Value, String> {
        let lines = self.output.lines();
        let line = index
            .checked_sub(1)
            .and_then(|position| lines.get(position))
            .ok_or_else(|| format!("no response {index} in {lines:?}"))?;
        serde_json::from_str(line).map_err(|error| error.to_string())
    }

    /// Whether the supervisor is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the supervisor to return and stores its result.
    pub fn wait_for_exit(&mut self) -> StepResult {
        if self.result.is_some() {
            return Ok(());
        }
        let handle = self
            .handle
            .take()
            .ok_or_else(|| "supervisor not started".to_owned())?;
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                return Err("supervisor did not terminate".to_owned());
            }
            thread::sleep(POLL_INTERVAL);
        }
        let result = handle
            .join()
            .map_err(|_| "supervisor thread panicked".to_owned())?;
        self.result = Some(result);
        Ok(())
    }

    /// The supervisor's result, once it has exited.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    /// The sink handed to the supervisor.
    pub fn telemetry(&self) -> Option<&TelemetrySink> {
        self.telemetry.as_deref()
    }
}

fn wait_until(mut condition: impl FnMut() -> bool, what: &str) -> StepResult {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while !condition() {
        if Instant::now() >= deadline {
            return Err(format!("timed out waiting for {what}"));
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

/// Fresh world for each scenario.
#[must_use]
pub fn world() -> RefCell<LifecycleWorld> {
    RefCell::new(LifecycleWorld::new())
}
