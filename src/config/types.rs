/// Core types and error taxonomy for sandboxctl
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Process exit status reported by the `debug` command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    Success,
    Failure,
    UsageError,
    /// Stop-phase failure; the process is terminated without ordinary reporting
    Fatal,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::UsageError => 2,
            ExitStatus::Fatal => 128,
        }
    }
}

/// Timed capture kinds that hold a session open across the profile delay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureKind {
    Cpu,
    Trace,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureKind::Cpu => write!(f, "CPU profile"),
            CaptureKind::Trace => write!(f, "execution trace"),
        }
    }
}

/// Errors raised by the on-disk container registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding container state {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("container {0:?} does not exist")]
    Missing(String),
}

/// Failure to turn a container ID or sandbox PID into a live sandbox
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("loading container {id:?}: {source}")]
    LoadFailed {
        id: String,
        #[source]
        source: RegistryError,
    },

    #[error("listing containers: {0}")]
    ListFailed(#[source] RegistryError),

    #[error("container with PID {pid} not found")]
    NotFound { pid: i32 },

    #[error("container {container:?} sandbox is not running")]
    NotRunning { container: String },
}

/// Rejected logging reconfiguration input
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),

    #[error("invalid value for log_packets {0:?}")]
    InvalidBoolean(String),
}

/// Failures talking to the sandbox control endpoint
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("connecting to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("control channel I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("passing descriptor to sandbox: {0}")]
    FdPassing(#[from] nix::Error),

    #[error("control message encoding: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("sandbox reported: {0}")]
    Remote(String),

    #[error("{0} request sent with the wrong output descriptor")]
    DescriptorMismatch(&'static str),

    #[error("unexpected response to {0}")]
    UnexpectedResponse(&'static str),
}

/// Stop-phase failure of a timed capture; never reported as an ordinary error
#[derive(Error, Debug)]
#[error("stopping {kind} for sandbox {sandbox:?}: {source}")]
pub struct FatalError {
    pub kind: CaptureKind,
    pub sandbox: String,
    #[source]
    pub source: ControlError,
}

/// Umbrella error for the debug command
#[derive(Error, Debug)]
pub enum DebugError {
    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to send signal {signal} to process {pid}: {source}")]
    Signal {
        signal: i32,
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("opening output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} on sandbox {sandbox:?}: {source}")]
    Action {
        operation: &'static str,
        sandbox: String,
        #[source]
        source: ControlError,
    },

    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),
}

impl DebugError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            DebugError::Usage(_) => ExitStatus::UsageError,
            DebugError::Fatal(_) => ExitStatus::Fatal,
            _ => ExitStatus::Failure,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DebugError::Fatal(_))
    }
}

/// Result type alias for sandboxctl operations
pub type Result<T> = std::result::Result<T, DebugError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::UsageError.code(), 2);
        assert_eq!(ExitStatus::Fatal.code(), 128);
    }

    #[test]
    fn test_error_exit_status_mapping() {
        let usage = DebugError::Usage("expected one container id".to_string());
        assert_eq!(usage.exit_status(), ExitStatus::UsageError);

        let missing = DebugError::from(ResolutionError::NotFound { pid: 42 });
        assert_eq!(missing.exit_status(), ExitStatus::Failure);
        assert_eq!(missing.to_string(), "container with PID 42 not found");

        let fatal = DebugError::from(FatalError {
            kind: CaptureKind::Cpu,
            sandbox: "sb".to_string(),
            source: ControlError::Remote("profiler gone".to_string()),
        });
        assert!(fatal.is_fatal());
        assert_eq!(fatal.exit_status(), ExitStatus::Fatal);
    }

    #[test]
    fn test_validation_messages_carry_input() {
        let err = ValidationError::InvalidLogLevel("bogus".to_string());
        assert_eq!(err.to_string(), "invalid log level \"bogus\"");
    }
}
