//! Shared domain types for the tool build state registry.
//!
//! This crate contains the types exchanged between the conversation
//! orchestrator, the registry, and the ops surface: build entries, their
//! lifecycle status, kind-specific content, statistics, and configuration.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod build;
pub mod config;
pub mod content;
pub mod error;
pub mod stats;
