/// Output destinations and timed capture sessions
///
/// A destination is opened right before first use and closed exactly once when
/// dropped. Timed sessions are stacked as they start and finalized in reverse
/// order: stop first, since the sandbox may still be writing, then close.
use crate::config::types::{CaptureKind, ControlError, DebugError, FatalError, Result};
use crate::control::SandboxControl;
use log::{debug, error, info};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Freshly created (truncated) output file
#[derive(Debug)]
pub struct OutputDestination {
    path: PathBuf,
    file: File,
}

impl OutputDestination {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| DebugError::Output {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opened output {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Release the destination. Consuming `self` makes a second close impossible.
    pub fn close(self) {
        debug!("Closing output {}", self.path.display());
        drop(self.file);
    }
}

/// One-shot heap snapshot: open, capture, close.
pub fn capture_heap(control: &dyn SandboxControl, sandbox: &str, path: &Path) -> Result<()> {
    let dest = OutputDestination::create(path)?;
    let outcome = control
        .heap_profile(dest.file())
        .map_err(|source| DebugError::Action {
            operation: "heap profile",
            sandbox: sandbox.to_string(),
            source,
        });
    dest.close();
    outcome?;

    info!("Heap profile written to {:?}", path.display().to_string());
    Ok(())
}

/// Captures that run from a start request until a stop request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimedCapture {
    Cpu,
    Trace,
}

impl TimedCapture {
    pub fn kind(self) -> CaptureKind {
        match self {
            TimedCapture::Cpu => CaptureKind::Cpu,
            TimedCapture::Trace => CaptureKind::Trace,
        }
    }

    fn start_operation(self) -> &'static str {
        match self {
            TimedCapture::Cpu => "start CPU profile",
            TimedCapture::Trace => "start trace",
        }
    }

    fn start(
        self,
        control: &dyn SandboxControl,
        out: &File,
    ) -> std::result::Result<(), ControlError> {
        match self {
            TimedCapture::Cpu => control.start_cpu_profile(out),
            TimedCapture::Trace => control.start_trace(out),
        }
    }

    fn stop(self, control: &dyn SandboxControl) -> std::result::Result<(), ControlError> {
        match self {
            TimedCapture::Cpu => control.stop_cpu_profile(),
            TimedCapture::Trace => control.stop_trace(),
        }
    }
}

/// A started timed capture owning its destination
#[derive(Debug)]
pub struct ProfileSession {
    capture: TimedCapture,
    sandbox: String,
    dest: OutputDestination,
}

impl ProfileSession {
    /// Open `path` and issue the start request. On failure the destination is
    /// released before returning.
    pub fn start(
        capture: TimedCapture,
        control: &dyn SandboxControl,
        sandbox: &str,
        path: &Path,
    ) -> Result<Self> {
        let dest = OutputDestination::create(path)?;
        if let Err(source) = capture.start(control, dest.file()) {
            dest.close();
            return Err(DebugError::Action {
                operation: capture.start_operation(),
                sandbox: sandbox.to_string(),
                source,
            });
        }

        Ok(Self {
            capture,
            sandbox: sandbox.to_string(),
            dest,
        })
    }

    /// Stop the capture, then close the destination. The destination is closed
    /// even when stop fails.
    pub fn finish(self, control: &dyn SandboxControl) -> std::result::Result<(), FatalError> {
        let stopped = self.capture.stop(control);
        let path = self.dest.path().display().to_string();
        self.dest.close();

        match stopped {
            Ok(()) => {
                match self.capture {
                    TimedCapture::Cpu => info!("CPU profile written to {:?}", path),
                    TimedCapture::Trace => info!("Trace written to {:?}", path),
                }
                Ok(())
            }
            Err(source) => Err(FatalError {
                kind: self.capture.kind(),
                sandbox: self.sandbox,
                source,
            }),
        }
    }
}

/// Active timed sessions, finalized in reverse start order
#[derive(Debug, Default)]
pub struct SessionStack {
    sessions: Vec<ProfileSession>,
}

impl SessionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, session: ProfileSession) {
        self.sessions.push(session);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True until a timed capture has started
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Finish every session. All sessions are attempted; the first stop failure is returned.
    pub fn finalize(mut self, control: &dyn SandboxControl) -> std::result::Result<(), FatalError> {
        let mut first_fatal = None;

        while let Some(session) = self.sessions.pop() {
            if let Err(fatal) = session.finish(control) {
                error!("{}", fatal);
                first_fatal.get_or_insert(fatal);
            }
        }

        match first_fatal {
            Some(fatal) => Err(fatal),
            None => Ok(()),
        }
    }
}
