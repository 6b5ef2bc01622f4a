//! Build entry store and lifecycle state machine.
//!
//! `BuildRegistry` holds every tracked build plus a session index behind a
//! single `RwLock`, so multi-entry reads (session listings, stats, sweeps)
//! always observe a consistent snapshot. Point operations are short,
//! non-blocking critical sections; nothing here awaits or performs I/O.
//!
//! Lookups and mutations on a missing id return `None` -- a late stream
//! fragment for an already-swept build is a routine outcome, not a fault.

pub mod content;
mod index;
mod session;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, warn};

use buildstate_types::build::{BuildEntry, BuildStatus, BuildUpdate, NewBuild};
use buildstate_types::content::BuildContent;
use buildstate_types::error::RegistryError;

use self::content::{default_content, ContentExt};
use self::index::SessionIndex;

/// Everything guarded by the registry lock.
#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<String, BuildEntry>,
    sessions: SessionIndex,
}

/// Process-scoped registry of live and recently finished builds.
///
/// Cloning produces a shared handle to the same underlying state.
#[derive(Clone, Default)]
pub struct BuildRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

fn clamp_progress(progress: i64) -> u8 {
    progress.clamp(0, 100) as u8
}

/// Advance `updated_at`, never moving it backwards.
fn touch(entry: &mut BuildEntry) {
    let now = Utc::now();
    if now > entry.updated_at {
        entry.updated_at = now;
    }
}

impl BuildRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the state consistent, so a panic in
    // another holder does not invalidate it.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new build in the `initializing` state with kind-specific
    /// default content.
    ///
    /// An existing entry with the same id is replaced, and its id is removed
    /// from its previous session before being indexed again.
    pub fn create(&self, new: NewBuild) -> BuildEntry {
        let now = Utc::now();
        let entry = BuildEntry {
            content: default_content(&new.kind),
            id: new.id,
            kind: new.kind,
            session_id: new.session_id,
            persona_id: new.persona_id,
            title: new.title,
            subject: new.subject,
            status: BuildStatus::Initializing,
            progress: 0,
            chunks_received: 0,
            raw_chunks: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.write();
        if let Some(previous) = state.entries.insert(entry.id.clone(), entry.clone()) {
            warn!(
                build_id = %previous.id,
                previous_session = %previous.session_id,
                previous_status = %previous.status,
                "build id already registered, replacing entry"
            );
            state.sessions.remove(&previous.session_id, &previous.id);
        }
        state.sessions.insert(&entry.session_id, &entry.id);

        debug!(
            build_id = %entry.id,
            session_id = %entry.session_id,
            kind = %entry.kind,
            "build created"
        );
        entry
    }

    /// Apply a streamed update to an in-flight build.
    ///
    /// Finished builds are left untouched and returned as-is, so stale
    /// fragments cannot resurrect them. The first progress update moves an
    /// `initializing` build to `building`.
    pub fn update(&self, id: &str, update: BuildUpdate) -> Option<BuildEntry> {
        let mut state = self.write();
        let entry = state.entries.get_mut(id)?;

        if entry.status.is_terminal() {
            debug!(build_id = %id, status = %entry.status, "ignoring update for finished build");
            return Some(entry.clone());
        }

        if let Some(progress) = update.progress {
            entry.progress = clamp_progress(progress);
            if entry.status == BuildStatus::Initializing {
                entry.status = BuildStatus::Building;
            }
        }

        if let Some(chunk) = update.chunk {
            entry.raw_chunks.push(chunk);
            entry.chunks_received += 1;
        }

        if let Some(patch) = update.content {
            let patch_format = patch.format_name();
            if !entry.content.apply_patch(patch) {
                warn!(
                    build_id = %id,
                    content_format = entry.content.format_name(),
                    patch_format,
                    "content patch does not match build content, skipping"
                );
            }
        }

        touch(entry);
        Some(entry.clone())
    }

    /// Mark a build completed at 100% progress.
    ///
    /// When `final_content` is given it replaces the accumulated content
    /// wholesale instead of being merged.
    pub fn complete(&self, id: &str, final_content: Option<BuildContent>) -> Option<BuildEntry> {
        self.finish(id, BuildStatus::Completed, |entry| {
            entry.progress = 100;
            if let Some(content) = final_content {
                entry.content = content;
            }
        })
    }

    /// Mark a build failed, storing `error_message` verbatim.
    pub fn fail(&self, id: &str, error_message: impl Into<String>) -> Option<BuildEntry> {
        let error_message = error_message.into();
        self.finish(id, BuildStatus::Error, |entry| {
            entry.error_message = Some(error_message);
        })
    }

    /// Mark a build cancelled.
    pub fn cancel(&self, id: &str) -> Option<BuildEntry> {
        self.finish(id, BuildStatus::Cancelled, |_| {})
    }

    /// Shared terminal transition. The first terminal call wins; later ones
    /// return the entry unchanged.
    fn finish(
        &self,
        id: &str,
        status: BuildStatus,
        apply: impl FnOnce(&mut BuildEntry),
    ) -> Option<BuildEntry> {
        let mut state = self.write();
        let entry = state.entries.get_mut(id)?;

        if entry.status.is_terminal() {
            debug!(
                build_id = %id,
                status = %entry.status,
                requested = %status,
                "build already finished"
            );
            return Some(entry.clone());
        }

        entry.status = status;
        apply(entry);
        touch(entry);

        debug!(
            build_id = %id,
            session_id = %entry.session_id,
            status = %status,
            chunks = entry.chunks_received,
            "build finished"
        );
        Some(entry.clone())
    }

    /// Look up a build by id.
    pub fn get(&self, id: &str) -> Option<BuildEntry> {
        self.read().entries.get(id).cloned()
    }

    /// Look up a build by id, treating absence as an error.
    pub fn require(&self, id: &str) -> Result<BuildEntry, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Number of stored builds.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }
}

impl std::fmt::Debug for BuildRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("BuildRegistry")
            .field("entries", &state.entries.len())
            .field("sessions", &state.sessions.len())
            .finish()
    }
}
