/// Resolution of a debug target to a running sandbox
use crate::config::request::Target;
use crate::config::types::ResolutionError;
use crate::container::registry::{ContainerRegistry, ContainerState, SandboxState};
use log::{debug, info};
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::path::PathBuf;

/// Decides whether a recorded sandbox process is still running
pub trait LivenessProbe {
    fn is_running(&self, sandbox: &SandboxState) -> bool;
}

/// Probes with a null signal; EPERM still proves the process exists
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcProbe;

impl LivenessProbe for ProcProbe {
    fn is_running(&self, sandbox: &SandboxState) -> bool {
        if sandbox.pid <= 0 {
            return false;
        }
        match kill(Pid::from_raw(sandbox.pid), None) {
            Ok(()) => true,
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// Resolved reference to a live sandbox
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandboxHandle {
    pub container_id: String,
    pub sandbox_id: String,
    pub pid: i32,
    pub control_socket: PathBuf,
}

pub struct TargetResolver<'a> {
    registry: &'a dyn ContainerRegistry,
    probe: &'a dyn LivenessProbe,
}

impl<'a> TargetResolver<'a> {
    pub fn new(registry: &'a dyn ContainerRegistry, probe: &'a dyn LivenessProbe) -> Self {
        Self { registry, probe }
    }

    /// Locate the target container and require its sandbox to be running.
    pub fn resolve(&self, target: &Target) -> Result<SandboxHandle, ResolutionError> {
        let container = match target {
            Target::Container(id) => self.load(id)?,
            Target::Pid(pid) => self.find_by_pid(*pid)?,
        };

        let sandbox = match &container.sandbox {
            Some(sandbox) if self.probe.is_running(sandbox) => sandbox,
            _ => {
                return Err(ResolutionError::NotRunning {
                    container: container.id.clone(),
                })
            }
        };

        info!("Found sandbox {:?}, PID: {}", sandbox.id, sandbox.pid);
        Ok(SandboxHandle {
            container_id: container.id.clone(),
            sandbox_id: sandbox.id.clone(),
            pid: sandbox.pid,
            control_socket: sandbox.control_socket.clone(),
        })
    }

    fn load(&self, id: &str) -> Result<ContainerState, ResolutionError> {
        self.registry
            .load(id)
            .map_err(|source| ResolutionError::LoadFailed {
                id: id.to_string(),
                source,
            })
    }

    /// First container whose sandbox PID matches wins. Any load failure aborts the scan.
    fn find_by_pid(&self, pid: i32) -> Result<ContainerState, ResolutionError> {
        let ids = self.registry.list().map_err(ResolutionError::ListFailed)?;

        for id in &ids {
            let candidate = self.load(id)?;
            if candidate.sandbox_pid() == pid {
                debug!("Container {:?} owns sandbox PID {}", id, pid);
                return Ok(candidate);
            }
        }

        Err(ResolutionError::NotFound { pid })
    }
}
