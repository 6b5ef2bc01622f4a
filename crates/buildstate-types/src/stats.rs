//! Aggregate registry statistics for the ops surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::build::{BuildKind, BuildStatus};

/// Point-in-time counts over every stored build entry.
///
/// `by_kind` and `by_status` each partition `total_entries`: their values
/// always sum back to it. `by_status` carries every status, zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_entries: usize,
    /// Entries still initializing or building.
    pub active_entries: usize,
    /// Sessions with at least one stored entry, regardless of status.
    pub distinct_sessions: usize,
    pub by_kind: BTreeMap<BuildKind, usize>,
    pub by_status: BTreeMap<BuildStatus, usize>,
}

impl RegistryStats {
    /// Count for one status (zero if absent).
    pub fn status_count(&self, status: BuildStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Count for one kind (zero if absent).
    pub fn kind_count(&self, kind: &BuildKind) -> usize {
        self.by_kind.get(kind).copied().unwrap_or(0)
    }
}
