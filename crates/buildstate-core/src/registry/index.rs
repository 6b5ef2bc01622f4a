//! Secondary index from tutoring session to the builds created under it.

use std::collections::HashMap;

/// Session id -> build ids, in creation order.
///
/// Sessions with no remaining builds are dropped, so `len()` is the number
/// of sessions currently represented in the store.
#[derive(Debug, Default)]
pub(crate) struct SessionIndex {
    sessions: HashMap<String, Vec<String>>,
}

impl SessionIndex {
    pub(crate) fn insert(&mut self, session_id: &str, build_id: &str) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push(build_id.to_string());
    }

    /// Remove `build_id` from `session_id`, dropping the session if it empties.
    pub(crate) fn remove(&mut self, session_id: &str, build_id: &str) {
        let Some(ids) = self.sessions.get_mut(session_id) else {
            return;
        };
        ids.retain(|id| id != build_id);
        if ids.is_empty() {
            self.sessions.remove(session_id);
        }
    }

    pub(crate) fn builds(&self, session_id: &str) -> &[String] {
        self.sessions
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn clear(&mut self) {
        self.sessions.clear();
    }
}
