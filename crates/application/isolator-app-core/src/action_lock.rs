use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use isolator_core::{ActionKind, ProfileName};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub name: ProfileName,
    pub kind: ActionKind,
}

/// Per-profile-name mutual exclusion for in-flight lifecycle calls.
///
/// Only the session controller acquires and releases; everyone else reads.
#[derive(Clone, Default)]
pub struct ActionLock {
    pending: Arc<Mutex<HashMap<ProfileName, ActionKind>>>,
}

impl ActionLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending_map(&self) -> MutexGuard<'_, HashMap<ProfileName, ActionKind>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `name` as busy. Returns false if it already has a pending action.
    pub(crate) fn try_acquire(&self, name: &str, kind: ActionKind) -> bool {
        let mut pending = self.pending_map();
        if let Some(current) = pending.get(name) {
            debug!("{name} is busy with {current:?}; refusing {kind:?}");
            return false;
        }
        pending.insert(name.to_string(), kind);
        true
    }

    pub(crate) fn release(&self, name: &str) {
        self.pending_map().remove(name);
    }

    /// Acquire `name` for the lifetime of the returned guard.
    pub(crate) fn guard(&self, name: &str, kind: ActionKind) -> Option<ActionGuard> {
        self.try_acquire(name, kind).then(|| ActionGuard {
            lock: self.clone(),
            name: name.to_string(),
        })
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending_map().contains_key(name)
    }

    pub fn pending_kind(&self, name: &str) -> Option<ActionKind> {
        self.pending_map().get(name).copied()
    }

    /// Snapshot of all in-flight actions, ordered by name.
    pub fn pending(&self) -> Vec<PendingAction> {
        let mut actions: Vec<PendingAction> = self
            .pending_map()
            .iter()
            .map(|(name, kind)| PendingAction {
                name: name.clone(),
                kind: *kind,
            })
            .collect();
        actions.sort_by(|a, b| a.name.cmp(&b.name));
        actions
    }

    pub fn is_idle(&self) -> bool {
        self.pending_map().is_empty()
    }
}

/// Releases its name when dropped, whichever way the action ends.
pub(crate) struct ActionGuard {
    lock: ActionLock,
    name: String,
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.lock.release(&self.name);
    }
}
