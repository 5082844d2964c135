//! Configuration and request model
//!
//! Error taxonomy, runtime settings, and the immutable debug request.

pub mod request;
pub mod settings;
pub mod types;
