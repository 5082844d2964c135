//! Diagnostic session control
//!
//! Sequences debug actions against a resolved sandbox and owns the lifecycle
//! of timed capture sessions.

pub mod orchestrator;
pub mod session;

pub use orchestrator::{DebugOrchestrator, DebugReport};
pub use session::{OutputDestination, ProfileSession, SessionStack, TimedCapture};
