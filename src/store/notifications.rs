//! Notification Module
//!
//! Fan-out of cache events to subscribers.

use std::fmt;

use serde::Serialize;

use crate::identifier::StableDocumentIdentifier;

// == Cache Event ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheEvent {
    Added,
    Updated,
    Removed,
    Invalidated,
}

impl CacheEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEvent::Added => "added",
            CacheEvent::Updated => "updated",
            CacheEvent::Removed => "removed",
            CacheEvent::Invalidated => "invalidated",
        }
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Callback = Box<dyn Fn(&StableDocumentIdentifier, CacheEvent) + Send + Sync>;

/// Handle returned by [`NotificationManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

// == Notification Manager ==
#[derive(Default)]
pub struct NotificationManager {
    subscribers: Vec<(Subscription, Callback)>,
    next_id: u64,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&StableDocumentIdentifier, CacheEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push((subscription, Box::new(callback)));
        subscription
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        self.subscribers.len() != before
    }

    /// Delivers `event` to every subscriber in subscription order.
    ///
    /// Returns true if anyone was listening.
    pub fn notify(&self, identifier: &StableDocumentIdentifier, event: CacheEvent) -> bool {
        for (_, callback) in &self.subscribers {
            callback(identifier, event);
        }
        !self.subscribers.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for NotificationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationManager")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
