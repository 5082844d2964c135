//! Control wire messages.
//!
//! Each request is one JSON document terminated by a newline. Requests that
//! carry an output destination pass its descriptor with `SCM_RIGHTS` on the
//! same write.

use crate::logging::LoggingChangeSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    Stacks,
    HeapProfile,
    StartCpuProfile,
    StopCpuProfile,
    StartTrace,
    StopTrace,
    ChangeLogging(LoggingChangeSet),
}

impl ControlRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ControlRequest::Stacks => "stacks",
            ControlRequest::HeapProfile => "heap profile",
            ControlRequest::StartCpuProfile => "start CPU profile",
            ControlRequest::StopCpuProfile => "stop CPU profile",
            ControlRequest::StartTrace => "start trace",
            ControlRequest::StopTrace => "stop trace",
            ControlRequest::ChangeLogging(_) => "change logging",
        }
    }

    /// Whether the request must be accompanied by an output descriptor
    pub fn takes_fd(&self) -> bool {
        matches!(
            self,
            ControlRequest::HeapProfile
                | ControlRequest::StartCpuProfile
                | ControlRequest::StartTrace
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlResponse {
    Ok,
    Stacks(String),
    Error(String),
}
