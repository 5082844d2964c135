//! Thin wrappers around kernel primitives.

pub mod signal;
