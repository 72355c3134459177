use std::sync::Arc;

use isolator_core::Profile;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSnapshot {
    /// Server response order.
    pub profiles: Vec<Profile>,
    /// Sequence number of the fetch this list came from; 0 until the first success.
    pub fetch_seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplyOutcome {
    Replaced,
    Unchanged,
    Stale,
}

/// Local mirror of the backend's profile list.
///
/// Only ever holds a complete list returned by the backend. Written by the
/// polling scheduler; readers get whole snapshots.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<watch::Sender<ProfileSnapshot>>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProfileSnapshot::default());
        Self {
            inner: Arc::new(tx),
        }
    }

    /// Replace the list with the result of fetch `seq`.
    ///
    /// Results of fetches older than the one last applied are discarded, so
    /// a slow response can never roll the mirror back.
    pub(crate) fn apply(&self, seq: u64, profiles: Vec<Profile>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::Stale;
        self.inner.send_if_modified(|snapshot| {
            if seq <= snapshot.fetch_seq {
                return false;
            }
            let first_load = snapshot.fetch_seq == 0;
            snapshot.fetch_seq = seq;
            if !first_load && snapshot.profiles == profiles {
                outcome = ApplyOutcome::Unchanged;
                return false;
            }
            snapshot.profiles = profiles;
            outcome = ApplyOutcome::Replaced;
            true
        });
        outcome
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        self.inner.borrow().clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.inner.borrow().profiles.clone()
    }

    pub fn find(&self, name: &str) -> Option<Profile> {
        self.inner
            .borrow()
            .profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    /// True once any fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().fetch_seq > 0
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileSnapshot> {
        self.inner.subscribe()
    }
}
