//! sandboxctl: diagnostic control for running sandboxed containers
//!
//! Locates a live sandbox by container ID or sandbox PID and drives its
//! debug surface: signal delivery, stack dumps, heap/CPU profiles, execution
//! traces and live logging reconfiguration.
//!
//! # Architecture
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: Error taxonomy and exit statuses
//! - [`config::request`]: Immutable debug request and target selection
//! - [`config::settings`]: Root directory and log filter resolution
//!
//! ## Target Resolution ([`container`])
//! - [`container::registry`]: Container state on disk
//! - [`container::resolver`]: Container ID / PID scan to a running sandbox
//!
//! ## Sandbox Control ([`control`])
//! - [`control::protocol`]: Control wire messages
//! - [`control::client`]: Unix-socket client with descriptor passing
//!
//! ## Session Control ([`exec`])
//! - [`exec::session`]: Output destinations and timed capture sessions
//! - [`exec::orchestrator`]: Action sequencing, delay and finalization
//!
//! ## Logging Changes ([`logging`])
//! - [`logging::change`]: Strace, log level and packet logging parsing
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::signal`]: Signal delivery

// Configuration & request model
pub mod config;

// Target resolution
pub mod container;

// Sandbox control channel
pub mod control;

// Session control
pub mod exec;

// Kernel primitives
pub mod kernel;

// Logging reconfiguration
pub mod logging;

// CLI entrypoint wiring for the sandboxctl binary.
pub mod cli;

pub use config::request::{DebugRequest, Target};
pub use config::types::*;
pub use exec::orchestrator::{DebugOrchestrator, DebugReport};
