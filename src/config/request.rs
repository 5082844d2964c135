//! Immutable description of one `debug` invocation.

use crate::config::types::{DebugError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default wait between starting and stopping timed captures
pub const DEFAULT_PROFILE_DELAY_SECS: u64 = 5;

/// How the target sandbox is selected
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Container(String),
    Pid(i32),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Container(id) => write!(f, "container {:?}", id),
            Target::Pid(pid) => write!(f, "sandbox PID {}", pid),
        }
    }
}

/// Fully parsed set of requested diagnostic actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugRequest {
    pub target: Target,
    pub stacks: bool,
    /// Values <= 0 mean no signal is sent
    pub signal: Option<i32>,
    pub heap_profile: Option<PathBuf>,
    pub cpu_profile: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub profile_delay: Duration,
    pub strace: Option<String>,
    pub log_level: Option<String>,
    pub log_packets: Option<String>,
}

impl DebugRequest {
    /// Build a request for the given target with no actions.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            stacks: false,
            signal: None,
            heap_profile: None,
            cpu_profile: None,
            trace: None,
            profile_delay: Duration::from_secs(DEFAULT_PROFILE_DELAY_SECS),
            strace: None,
            log_level: None,
            log_packets: None,
        }
    }

    /// Pick the selection mode from a PID flag and the positional arguments.
    ///
    /// A PID of 0 means "select by container ID", which then requires exactly one
    /// positional argument. Any other PID forbids positional arguments.
    pub fn select_target(pid: i32, positional: &[String]) -> Result<Target> {
        if pid == 0 {
            match positional {
                [id] => Ok(Target::Container(id.clone())),
                _ => Err(DebugError::Usage(format!(
                    "expected exactly one container id, got {}",
                    positional.len()
                ))),
            }
        } else if positional.is_empty() {
            Ok(Target::Pid(pid))
        } else {
            Err(DebugError::Usage(format!(
                "container id must not be given together with --pid ({} positional arguments)",
                positional.len()
            )))
        }
    }

    /// Non-positive signals are treated as "no signal requested".
    pub fn effective_signal(&self) -> Option<i32> {
        self.signal.filter(|signal| *signal > 0)
    }

    /// Whether any of the logging reconfiguration inputs were supplied
    pub fn wants_logging_change(&self) -> bool {
        [&self.strace, &self.log_level, &self.log_packets]
            .iter()
            .any(|spec| spec.as_deref().is_some_and(|s| !s.is_empty()))
    }
}
