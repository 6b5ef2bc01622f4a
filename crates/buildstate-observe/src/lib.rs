//! Observability setup shared by the build state binaries.

pub mod tracing_setup;
