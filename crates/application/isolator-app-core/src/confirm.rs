use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{oneshot, watch};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
}

/// How the operator answered the prompt. An outside click is a dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirm,
    Cancel,
    Dismiss,
}

impl Resolution {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Resolution::Confirm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("another confirmation is already pending")]
pub struct GateBusy;

struct Slot {
    ticket: u64,
    reply: oneshot::Sender<bool>,
}

struct Inner {
    slot: Mutex<Option<Slot>>,
    current: watch::Sender<Option<ConfirmationRequest>>,
    next_ticket: AtomicU64,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Single-slot asynchronous yes/no gate.
///
/// The render layer keeps one handler bound to [`ConfirmationGate::subscribe`]
/// and answers through [`ConfirmationGate::resolve`]; requesters never attach
/// handlers of their own.
#[derive(Clone)]
pub struct ConfirmationGate {
    inner: Arc<Inner>,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationGate {
    pub fn new() -> Self {
        let (current, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(None),
                current,
                next_ticket: AtomicU64::new(0),
            }),
        }
    }

    /// Publish a prompt and wait for the answer.
    ///
    /// Fails with [`GateBusy`] while another prompt is outstanding. Dropping
    /// the returned future withdraws the prompt.
    pub async fn request(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<bool, GateBusy> {
        let (reply, answer) = oneshot::channel();
        let ticket = {
            let mut slot = self.inner.slot();
            if slot.is_some() {
                return Err(GateBusy);
            }
            let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
            *slot = Some(Slot { ticket, reply });
            self.inner.current.send_replace(Some(ConfirmationRequest {
                title: title.into(),
                message: message.into(),
            }));
            ticket
        };

        let _withdraw = Withdraw {
            inner: &self.inner,
            ticket,
        };
        // A dropped sender means the gate was torn down: treat as cancel.
        Ok(answer.await.unwrap_or(false))
    }

    /// Deliver an answer to the outstanding prompt. Returns false when idle.
    pub fn resolve(&self, resolution: Resolution) -> bool {
        let taken = {
            let mut slot = self.inner.slot();
            let taken = slot.take();
            if taken.is_some() {
                self.inner.current.send_replace(None);
            }
            taken
        };

        match taken {
            Some(slot) => {
                debug!("confirmation #{} resolved: {resolution:?}", slot.ticket);
                let _ = slot.reply.send(resolution.is_confirmed());
                true
            }
            None => false,
        }
    }

    pub fn confirm(&self) -> bool {
        self.resolve(Resolution::Confirm)
    }

    pub fn cancel(&self) -> bool {
        self.resolve(Resolution::Cancel)
    }

    pub fn dismiss(&self) -> bool {
        self.resolve(Resolution::Dismiss)
    }

    pub fn current(&self) -> Option<ConfirmationRequest> {
        self.inner.current.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.slot().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ConfirmationRequest>> {
        self.inner.current.subscribe()
    }
}

/// Clears the slot if the requester stops waiting before an answer arrives.
struct Withdraw<'a> {
    inner: &'a Inner,
    ticket: u64,
}

impl Drop for Withdraw<'_> {
    fn drop(&mut self) {
        let mut slot = self.inner.slot();
        if slot.as_ref().is_some_and(|s| s.ticket == self.ticket) {
            *slot = None;
            self.inner.current.send_replace(None);
            debug!("confirmation #{} withdrawn", self.ticket);
        }
    }
}
