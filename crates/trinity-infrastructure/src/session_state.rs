//! Shared session broadcast used by auth gateways.

use tokio::sync::watch;
use trinity_core::session::{Session, SessionWatch};
use trinity_core::store::Subscription;

/// Holds the signed-in session and notifies observers of every change.
#[derive(Debug)]
pub(crate) struct SessionBroadcaster {
    sender: watch::Sender<Option<Session>>,
}

impl SessionBroadcaster {
    pub(crate) fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> SessionWatch {
        Subscription::new(self.sender.subscribe())
    }

    pub(crate) fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub(crate) fn publish(&self, session: Option<Session>) {
        self.sender.send_replace(session);
    }
}
