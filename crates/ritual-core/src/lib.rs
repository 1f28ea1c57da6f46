//! Shared runtime setup for the ritual daemon and its front-ends.

pub mod tracing;

pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

/// Crates whose log targets the default filter enables.
pub const CRATE_TARGETS: &[&str] = &[
    "ritual_core",
    "ritual_protocol",
    "ritual_server",
    "ritual_client",
];
