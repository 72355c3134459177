use isolator_core::{ActionKind, Profile, ProfileName, ProfileStatus};

use crate::action_lock::ActionLock;
use crate::app_core::ProfileSnapshot;
use crate::confirm::ConfirmationRequest;
use crate::domain::Notification;

fn format_size_mb(size_mb: f64) -> String {
    if size_mb.fract() == 0.0 {
        format!("{size_mb:.0} MB")
    } else {
        format!("{size_mb:.2} MB")
    }
}

/// The lifecycle button a profile card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Start,
    Stop,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Start => "Start",
            CardAction::Stop => "Stop",
        }
    }

    pub fn for_status(status: ProfileStatus) -> Self {
        if status.is_running() {
            CardAction::Stop
        } else {
            CardAction::Start
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCardVm {
    pub name: ProfileName,
    pub status: ProfileStatus,
    pub status_label: &'static str,
    pub size_label: String,
    pub has_desktop_entry: bool,
    pub primary_action: CardAction,
    /// Action currently in flight for this profile, if any.
    pub busy: Option<ActionKind>,
}

impl ProfileCardVm {
    pub fn new(profile: &Profile, busy: Option<ActionKind>) -> Self {
        Self {
            name: profile.name.clone(),
            status: profile.status,
            status_label: profile.status.label(),
            size_label: format_size_mb(profile.size_mb),
            has_desktop_entry: profile.has_desktop_entry,
            primary_action: CardAction::for_status(profile.status),
            busy,
        }
    }

    pub fn offers(&self, action: CardAction) -> bool {
        self.primary_action == action
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardVm {
    pub cards: Vec<ProfileCardVm>,
    /// False until the first successful poll.
    pub loaded: bool,
    /// Some lifecycle action is in flight.
    pub loading: bool,
    pub notifications: Vec<Notification>,
    pub confirmation: Option<ConfirmationRequest>,
}

impl DashboardVm {
    pub fn build(
        snapshot: &ProfileSnapshot,
        lock: &ActionLock,
        notifications: Vec<Notification>,
        confirmation: Option<ConfirmationRequest>,
    ) -> Self {
        let pending = lock.pending();
        let busy = |name: &str| {
            pending
                .iter()
                .find(|action| action.name == name)
                .map(|action| action.kind)
        };

        Self {
            cards: snapshot
                .profiles
                .iter()
                .map(|p| ProfileCardVm::new(p, busy(&p.name)))
                .collect(),
            loaded: snapshot.fetch_seq > 0,
            loading: !pending.is_empty(),
            notifications,
            confirmation,
        }
    }

    /// Nothing to show: the backend has no profiles.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, name: &str) -> Option<&ProfileCardVm> {
        self.cards.iter().find(|c| c.name == name)
    }
}
