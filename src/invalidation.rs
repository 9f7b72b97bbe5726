//! Signals that tell listeners which views have gone stale after a write.

use tokio::sync::broadcast;

use crate::identity::UserId;

/// How many signals a slow subscriber may fall behind before it starts missing them.
const CHANNEL_CAPACITY: usize = 64;

/// A notice that the views at `paths` are stale for `user_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Invalidation {
    /// The endpoints whose responses have changed.
    pub paths: &'static [&'static str],
    /// The user whose data changed.
    pub user_id: UserId,
}

/// The sending half of the invalidation broadcast, shared through the app state.
#[derive(Debug, Clone)]
pub struct ViewInvalidation {
    sender: broadcast::Sender<Invalidation>,
}

impl ViewInvalidation {
    /// Create a broadcast with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self { sender }
    }

    /// Listen for invalidation signals sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }

    /// Tell subscribers that the views at `paths` are stale for `user_id`.
    ///
    /// Sending never fails from the caller's point of view, having no subscribers is normal.
    pub fn notify(&self, paths: &'static [&'static str], user_id: &UserId) {
        let invalidation = Invalidation {
            paths,
            user_id: user_id.clone(),
        };

        match self.sender.send(invalidation) {
            Ok(receiver_count) => {
                tracing::debug!("Invalidated {paths:?} for {receiver_count} subscriber(s)")
            }
            Err(_) => tracing::debug!("Invalidated {paths:?} with no subscribers"),
        }
    }
}

impl Default for ViewInvalidation {
    fn default() -> Self {
        Self::new()
    }
}
