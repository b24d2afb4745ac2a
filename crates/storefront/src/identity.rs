//! Authenticated-identity change signal.
//!
//! Auth writes the current user (or `None` after sign-out) here; cart
//! managers subscribe and re-resolve their owner whenever it changes.

use std::sync::Arc;

use tokio::sync::watch;

use fitment_forge_core::UserId;

/// Broadcasts the currently authenticated user.
#[derive(Clone, Debug)]
pub struct IdentitySignal {
    tx: Arc<watch::Sender<Option<UserId>>>,
}

impl IdentitySignal {
    /// Create a signal with an initial identity.
    #[must_use]
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// The identity as of now.
    #[must_use]
    pub fn current(&self) -> Option<UserId> {
        *self.tx.borrow()
    }

    /// Subscribe to identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }

    /// Publish a new identity. Subscribers are only woken if it changed.
    pub fn set(&self, user: Option<UserId>) {
        self.tx.send_if_modified(|current| {
            if *current == user {
                false
            } else {
                *current = user;
                true
            }
        });
    }
}

impl Default for IdentitySignal {
    fn default() -> Self {
        Self::new(None)
    }
}
