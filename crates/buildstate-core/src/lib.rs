//! Build state registry for live tool construction.
//!
//! Tracks every in-flight or recently finished artifact build, indexed by
//! tutoring session, with age-based eviction of finished entries. Depends
//! only on `buildstate-types` -- no storage or network I/O.

pub mod config;
pub mod maintenance;
pub mod registry;

pub use registry::BuildRegistry;
