//! Sandbox control channel
//!
//! The remote operations a running sandbox exposes to the debug command:
//! stack dumps, heap and CPU profiles, execution traces and logging changes.
//! Payload contents are opaque here; only the request lifecycle is managed.

pub mod client;
pub mod protocol;

use crate::config::types::ControlError;
use crate::container::resolver::SandboxHandle;
use crate::logging::LoggingChangeSet;
use std::fs::File;

pub use client::UnixControlClient;
pub use protocol::{ControlRequest, ControlResponse};

/// Remote diagnostic operations of one sandbox
pub trait SandboxControl {
    fn stacks(&self) -> Result<String, ControlError>;

    /// Write a heap snapshot to `out` and return once it is complete
    fn heap_profile(&self, out: &File) -> Result<(), ControlError>;

    fn start_cpu_profile(&self, out: &File) -> Result<(), ControlError>;

    fn stop_cpu_profile(&self) -> Result<(), ControlError>;

    fn start_trace(&self, out: &File) -> Result<(), ControlError>;

    fn stop_trace(&self) -> Result<(), ControlError>;

    fn change_logging(&self, change: &LoggingChangeSet) -> Result<(), ControlError>;
}

/// Opens a control channel for a resolved sandbox
pub trait ControlConnector {
    fn connect(&self, handle: &SandboxHandle) -> Box<dyn SandboxControl>;
}

/// Connects through the sandbox's recorded control socket
#[derive(Clone, Copy, Debug, Default)]
pub struct UnixConnector;

impl ControlConnector for UnixConnector {
    fn connect(&self, handle: &SandboxHandle) -> Box<dyn SandboxControl> {
        Box::new(UnixControlClient::new(&handle.control_socket))
    }
}
