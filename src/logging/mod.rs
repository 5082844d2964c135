//! Live logging reconfiguration
//!
//! Parses the strace, log-level and packet-logging inputs into one change set.

pub mod change;

pub use change::{LogLevel, LoggingChangeSet, StraceMode};
