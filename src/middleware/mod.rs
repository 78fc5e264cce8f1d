//! Middleware layer.
//!
//! Cross-cutting request concerns that wrap every dispatch. Currently only
//! structured request tracing.

pub mod trace;
