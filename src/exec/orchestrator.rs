/// Top-level sequencing of the debug command
///
/// resolve target -> signal -> stacks -> heap profile -> CPU profile start ->
/// trace start -> logging change -> optional delay -> finalize sessions.
use crate::config::request::DebugRequest;
use crate::config::types::{DebugError, Result};
use crate::container::registry::ContainerRegistry;
use crate::container::resolver::{LivenessProbe, SandboxHandle, TargetResolver};
use crate::control::{ControlConnector, SandboxControl};
use crate::exec::session::{capture_heap, ProfileSession, SessionStack, TimedCapture};
use crate::kernel::signal::SignalSender;
use crate::logging::LoggingChangeSet;
use log::{debug, info};
use std::time::Duration;

/// What a completed debug run did
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugReport {
    pub sandbox: SandboxHandle,
    pub signal_sent: Option<i32>,
    pub stacks: Option<String>,
    pub heap_profile_written: bool,
    pub timed_sessions: usize,
    pub logging_changed: Option<LoggingChangeSet>,
    /// Time spent blocked waiting for timed captures
    pub delayed: Option<Duration>,
}

impl DebugReport {
    fn new(sandbox: SandboxHandle) -> Self {
        Self {
            sandbox,
            signal_sent: None,
            stacks: None,
            heap_profile_written: false,
            timed_sessions: 0,
            logging_changed: None,
            delayed: None,
        }
    }
}

pub struct DebugOrchestrator<'a> {
    registry: &'a dyn ContainerRegistry,
    probe: &'a dyn LivenessProbe,
    signaller: &'a dyn SignalSender,
    connector: &'a dyn ControlConnector,
    pause: Box<dyn FnMut(Duration) + 'a>,
}

impl<'a> DebugOrchestrator<'a> {
    pub fn new(
        registry: &'a dyn ContainerRegistry,
        probe: &'a dyn LivenessProbe,
        signaller: &'a dyn SignalSender,
        connector: &'a dyn ControlConnector,
    ) -> Self {
        Self {
            registry,
            probe,
            signaller,
            connector,
            pause: Box::new(std::thread::sleep),
        }
    }

    /// Replace the blocking wait used between starting and stopping timed captures.
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + 'a) -> Self {
        self.pause = Box::new(pause);
        self
    }

    /// Run every requested action against the target sandbox.
    ///
    /// Logging inputs are validated before the target is touched. Once a timed
    /// capture has started it is always stopped and its output closed, whatever
    /// happens afterwards. A stop failure surfaces as [`DebugError::Fatal`] and
    /// takes precedence over any other error.
    pub fn execute(&mut self, request: &DebugRequest) -> Result<DebugReport> {
        let logging = LoggingChangeSet::build(
            request.strace.as_deref(),
            request.log_level.as_deref(),
            request.log_packets.as_deref(),
        )?;

        let handle = TargetResolver::new(self.registry, self.probe).resolve(&request.target)?;
        let control = self.connector.connect(&handle);

        let mut report = DebugReport::new(handle);
        let mut sessions = SessionStack::new();

        let outcome = self.run_actions(
            request,
            control.as_ref(),
            logging,
            &mut sessions,
            &mut report,
        );
        report.timed_sessions = sessions.len();

        if outcome.is_ok() && !sessions.is_empty() {
            info!("Waiting {:?} before stopping captures", request.profile_delay);
            (self.pause)(request.profile_delay);
            report.delayed = Some(request.profile_delay);
        }

        sessions.finalize(control.as_ref())?;
        outcome.map(|()| report)
    }

    fn run_actions(
        &self,
        request: &DebugRequest,
        control: &dyn SandboxControl,
        logging: Option<LoggingChangeSet>,
        sessions: &mut SessionStack,
        report: &mut DebugReport,
    ) -> Result<()> {
        let sandbox_id = report.sandbox.sandbox_id.clone();
        let pid = report.sandbox.pid;

        if let Some(signal) = request.effective_signal() {
            self.signaller
                .send(pid, signal)
                .map_err(|source| DebugError::Signal {
                    signal,
                    pid,
                    source,
                })?;
            report.signal_sent = Some(signal);
        }

        if request.stacks {
            info!("Retrieving sandbox stacks");
            let stacks = control.stacks().map_err(|source| DebugError::Action {
                operation: "retrieving stacks",
                sandbox: sandbox_id.clone(),
                source,
            })?;
            info!("     *** Stack dump ***\n{}", stacks);
            report.stacks = Some(stacks);
        }

        if let Some(path) = &request.heap_profile {
            capture_heap(control, &sandbox_id, path)?;
            report.heap_profile_written = true;
        }

        if let Some(path) = &request.cpu_profile {
            sessions.push(ProfileSession::start(TimedCapture::Cpu, control, &sandbox_id, path)?);
            info!(
                "CPU profile started for {} sec, writing to {:?}",
                request.profile_delay.as_secs(),
                path.display().to_string()
            );
        }

        if let Some(path) = &request.trace {
            sessions.push(ProfileSession::start(TimedCapture::Trace, control, &sandbox_id, path)?);
            info!(
                "Tracing started for {} sec, writing to {:?}",
                request.profile_delay.as_secs(),
                path.display().to_string()
            );
        }

        if let Some(change) = logging {
            control
                .change_logging(&change)
                .map_err(|source| DebugError::Action {
                    operation: "changing logging",
                    sandbox: sandbox_id.clone(),
                    source,
                })?;
            info!("Logging options changed");
            report.logging_changed = Some(change);
        }

        debug!("All requested actions issued to sandbox {:?}", sandbox_id);
        Ok(())
    }
}
