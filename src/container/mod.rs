//! Container registry and target resolution
//!
//! Locates the live sandbox behind a container ID or sandbox PID.

pub mod registry;
pub mod resolver;

pub use registry::{ContainerRegistry, ContainerState, FsRegistry, SandboxState};
pub use resolver::{LivenessProbe, ProcProbe, SandboxHandle, TargetResolver};
