//! Session-scoped queries, aggregate statistics, and age-based eviction.
//!
//! Every operation here runs under a single lock acquisition, so it sees a
//! point-in-time view of the store and the session index together.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use buildstate_types::build::{BuildEntry, BuildStatus};
use buildstate_types::stats::RegistryStats;

use super::BuildRegistry;

impl BuildRegistry {
    /// Every build created under `session_id`, in creation order.
    ///
    /// Unknown sessions yield an empty list.
    pub fn list_by_session(&self, session_id: &str) -> Vec<BuildEntry> {
        let state = self.read();
        state
            .sessions
            .builds(session_id)
            .iter()
            .filter_map(|id| state.entries.get(id))
            .cloned()
            .collect()
    }

    /// Builds under `session_id` that are still initializing or building.
    pub fn list_active_by_session(&self, session_id: &str) -> Vec<BuildEntry> {
        let state = self.read();
        state
            .sessions
            .builds(session_id)
            .iter()
            .filter_map(|id| state.entries.get(id))
            .filter(|entry| entry.status.is_active())
            .cloned()
            .collect()
    }

    /// Evict finished builds untouched for longer than `max_age`.
    ///
    /// Builds still initializing or building are never evicted, whatever
    /// their age. Returns the number of builds removed.
    pub fn sweep(&self, max_age: Duration) -> usize {
        self.sweep_as_of(Utc::now(), max_age)
    }

    /// Same as [`sweep`](Self::sweep), measuring age against `now`.
    pub fn sweep_as_of(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);

        let mut state = self.write();
        let expired: Vec<(String, String)> = state
            .entries
            .values()
            .filter(|entry| {
                entry.status.is_terminal() && now.signed_duration_since(entry.updated_at) > max_age
            })
            .map(|entry| (entry.id.clone(), entry.session_id.clone()))
            .collect();

        for (id, session_id) in &expired {
            state.entries.remove(id);
            state.sessions.remove(session_id, id);
        }

        let removed = expired.len();
        if removed > 0 {
            info!(
                removed,
                remaining = state.entries.len(),
                sessions = state.sessions.len(),
                "swept finished builds"
            );
        } else {
            debug!(remaining = state.entries.len(), "sweep found nothing to evict");
        }
        removed
    }

    /// Aggregate counts over every stored build.
    pub fn stats(&self) -> RegistryStats {
        let state = self.read();

        let mut by_status: BTreeMap<BuildStatus, usize> =
            BuildStatus::ALL.into_iter().map(|status| (status, 0)).collect();
        let mut by_kind = BTreeMap::new();

        for entry in state.entries.values() {
            *by_status.entry(entry.status).or_insert(0) += 1;
            *by_kind.entry(entry.kind.clone()).or_insert(0) += 1;
        }

        let active_entries = by_status[&BuildStatus::Initializing] + by_status[&BuildStatus::Building];

        RegistryStats {
            total_entries: state.entries.len(),
            active_entries,
            distinct_sessions: state.sessions.len(),
            by_kind,
            by_status,
        }
    }

    /// Discard all builds and index state.
    ///
    /// For test isolation and administrative tooling only; never call this
    /// from a request-handling path.
    pub fn reset(&self) {
        let mut state = self.write();
        state.entries.clear();
        state.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use buildstate_types::build::{BuildKind, BuildUpdate, NewBuild};

    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn create(registry: &BuildRegistry, id: &str, kind: BuildKind, session: &str) -> BuildEntry {
        registry.create(NewBuild::new(id, kind, session, "archimede", id))
    }

    #[test]
    fn test_list_by_session_returns_only_that_session_in_order() {
        let registry = BuildRegistry::new();
        create(&registry, "tool-s1-1", BuildKind::MindMap, "session-multi");
        create(&registry, "tool-s2", BuildKind::Flashcards, "session-other");
        create(&registry, "tool-s1-2", BuildKind::Quiz, "session-multi");

        let ids: Vec<String> = registry
            .list_by_session("session-multi")
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec!["tool-s1-1", "tool-s1-2"]);
    }

    #[test]
    fn test_list_by_session_unknown_is_empty() {
        let registry = BuildRegistry::new();
        assert!(registry.list_by_session("unknown-session").is_empty());
        assert!(registry.list_active_by_session("unknown-session").is_empty());
    }

    #[test]
    fn test_list_by_session_includes_finished_builds() {
        let registry = BuildRegistry::new();
        create(&registry, "a", BuildKind::Quiz, "s1");
        create(&registry, "b", BuildKind::Quiz, "s1");
        registry.fail("a", "boom");
        registry.cancel("b");
        assert_eq!(registry.list_by_session("s1").len(), 2);
    }

    #[test]
    fn test_list_active_filters_terminal() {
        let registry = BuildRegistry::new();
        create(&registry, "tool-active-1", BuildKind::MindMap, "session-active");
        create(&registry, "tool-active-2", BuildKind::Quiz, "session-active");
        create(&registry, "tool-active-3", BuildKind::Diagram, "session-active");

        registry.update("tool-active-1", BuildUpdate::progress(50));
        registry.complete("tool-active-2", None);

        let active: Vec<String> = registry
            .list_active_by_session("session-active")
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(active, vec!["tool-active-1", "tool-active-3"]);
    }

    #[test]
    fn test_sweep_removes_old_finished_builds() {
        let registry = BuildRegistry::new();
        create(&registry, "cleanup-1", BuildKind::MindMap, "session-cleanup");
        let completed = registry.complete("cleanup-1", None).unwrap();

        let later = completed.updated_at + TimeDelta::milliseconds(3_700_000);
        let removed = registry.sweep_as_of(later, Duration::from_millis(3_600_000));

        assert_eq!(removed, 1);
        assert!(registry.get("cleanup-1").is_none());
        assert!(registry.list_by_session("session-cleanup").is_empty());
        assert_eq!(registry.stats().distinct_sessions, 0);
    }

    #[test]
    fn test_sweep_keeps_recent_finished_builds() {
        let registry = BuildRegistry::new();
        create(&registry, "recent", BuildKind::Quiz, "s1");
        let completed = registry.complete("recent", None).unwrap();

        let later = completed.updated_at + TimeDelta::minutes(30);
        assert_eq!(registry.sweep_as_of(later, HOUR), 0);
        assert!(registry.get("recent").is_some());
    }

    #[test]
    fn test_sweep_age_boundary_is_exclusive() {
        let registry = BuildRegistry::new();
        create(&registry, "edge", BuildKind::Quiz, "s1");
        let done = registry.cancel("edge").unwrap();

        let exactly = done.updated_at + TimeDelta::hours(1);
        assert_eq!(registry.sweep_as_of(exactly, HOUR), 0);
        let past = exactly + TimeDelta::milliseconds(1);
        assert_eq!(registry.sweep_as_of(past, HOUR), 1);
    }

    #[test]
    fn test_sweep_never_removes_active_builds() {
        let registry = BuildRegistry::new();
        create(&registry, "cleanup-active", BuildKind::MindMap, "s1");
        create(&registry, "building", BuildKind::Quiz, "s1");
        registry.update("building", BuildUpdate::progress(10));

        let far_future = Utc::now() + TimeDelta::days(365);
        assert_eq!(registry.sweep_as_of(far_future, Duration::ZERO), 0);
        assert_eq!(registry.sweep(Duration::ZERO), 0);
        assert!(registry.get("cleanup-active").is_some());
        assert!(registry.get("building").is_some());
    }

    #[test]
    fn test_sweep_keeps_session_with_remaining_builds() {
        let registry = BuildRegistry::new();
        create(&registry, "old", BuildKind::Quiz, "s1");
        create(&registry, "live", BuildKind::Quiz, "s1");
        let done = registry.complete("old", None).unwrap();

        let later = done.updated_at + TimeDelta::hours(2);
        assert_eq!(registry.sweep_as_of(later, HOUR), 1);

        let remaining = registry.list_by_session("s1");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "live");
        assert_eq!(registry.stats().distinct_sessions, 1);
    }

    #[test]
    fn test_swept_id_behaves_as_never_existing() {
        let registry = BuildRegistry::new();
        create(&registry, "gone", BuildKind::Quiz, "s1");
        let done = registry.complete("gone", None).unwrap();
        registry.sweep_as_of(done.updated_at + TimeDelta::hours(2), HOUR);

        assert!(registry.update("gone", BuildUpdate::chunk("late")).is_none());
        assert!(registry.complete("gone", None).is_none());
        assert!(registry.fail("gone", "late").is_none());
        assert!(registry.cancel("gone").is_none());
    }

    #[test]
    fn test_stats_partitions_sum_to_total() {
        let registry = BuildRegistry::new();
        create(&registry, "stat-1", BuildKind::MindMap, "session-stats");
        create(&registry, "stat-2", BuildKind::MindMap, "session-stats");
        create(&registry, "stat-3", BuildKind::Quiz, "session-stats-2");
        create(&registry, "stat-4", BuildKind::Timeline, "session-stats-2");
        registry.complete("stat-2", None);
        registry.update("stat-3", BuildUpdate::progress(20));
        registry.fail("stat-4", "model error");

        let stats = registry.stats();
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.active_entries, 2);
        assert_eq!(stats.distinct_sessions, 2);
        assert_eq!(stats.kind_count(&BuildKind::MindMap), 2);
        assert_eq!(stats.kind_count(&BuildKind::Quiz), 1);
        assert_eq!(stats.kind_count(&BuildKind::Timeline), 1);
        assert_eq!(stats.status_count(BuildStatus::Initializing), 1);
        assert_eq!(stats.status_count(BuildStatus::Building), 1);
        assert_eq!(stats.status_count(BuildStatus::Completed), 1);
        assert_eq!(stats.status_count(BuildStatus::Error), 1);
        assert_eq!(stats.status_count(BuildStatus::Cancelled), 0);

        assert_eq!(stats.by_status.values().sum::<usize>(), stats.total_entries);
        assert_eq!(stats.by_kind.values().sum::<usize>(), stats.total_entries);
    }

    #[test]
    fn test_stats_merge_kind_tags_that_differ_only_in_spelling() {
        let registry = BuildRegistry::new();
        create(&registry, "k-1", BuildKind::Quiz, "s1");
        create(&registry, "k-2", BuildKind::from_tag("quiz"), "s1");
        create(&registry, "k-3", BuildKind::from_tag(" QUIZ "), "s1");
        create(&registry, "k-4", BuildKind::from_tag("Hologram"), "s1");
        create(&registry, "k-5", BuildKind::from_tag("hologram"), "s1");

        let stats = registry.stats();
        assert_eq!(stats.by_kind.len(), 2);
        assert_eq!(stats.kind_count(&BuildKind::Quiz), 3);
        assert_eq!(stats.kind_count(&BuildKind::from_tag("hologram")), 2);

        let json = serde_json::to_value(&stats).unwrap();
        let by_kind = json["byKind"].as_object().unwrap();
        assert_eq!(by_kind.len(), 2);
        assert_eq!(by_kind["quiz"], 3);
        let summed: u64 = by_kind.values().map(|v| v.as_u64().unwrap()).sum();
        assert_eq!(summed, json["totalEntries"].as_u64().unwrap());

        assert_eq!(
            registry.get("k-2").unwrap().content,
            registry.get("k-1").unwrap().content
        );
    }

    #[test]
    fn test_stats_on_empty_registry_zero_fills_statuses() {
        let stats = BuildRegistry::new().stats();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.by_status.len(), BuildStatus::ALL.len());
        assert!(stats.by_status.values().all(|count| *count == 0));
        assert!(stats.by_kind.is_empty());
    }

    #[test]
    fn test_distinct_sessions_counts_finished_sessions() {
        let registry = BuildRegistry::new();
        create(&registry, "a", BuildKind::Quiz, "s1");
        create(&registry, "b", BuildKind::Quiz, "s2");
        registry.complete("a", None);
        registry.cancel("b");
        assert_eq!(registry.stats().distinct_sessions, 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let registry = BuildRegistry::new();
        create(&registry, "a", BuildKind::Quiz, "s1");
        create(&registry, "b", BuildKind::Quiz, "s2");

        registry.reset();

        assert!(registry.is_empty());
        assert!(registry.list_by_session("s1").is_empty());
        assert_eq!(registry.stats(), RegistryStats {
            by_status: BuildStatus::ALL.into_iter().map(|status| (status, 0)).collect(),
            ..RegistryStats::default()
        });
    }
}
