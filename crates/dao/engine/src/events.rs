//! Broadcast of governance notifications.

use std::collections::HashMap;

use dao_types::GovernanceEvent;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Fan-out of [`GovernanceEvent`]s to any number of subscribers.
///
/// Publishing never blocks and never fails; with no subscribers the event is
/// simply counted. Slow subscribers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<GovernanceEvent>,
    counts: HashMap<&'static str, u64>,
}

impl EventBus {
    /// A zero `capacity` is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            counts: HashMap::new(),
        }
    }

    pub fn publish(&mut self, event: GovernanceEvent) {
        *self.counts.entry(event.kind()).or_insert(0) += 1;
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GovernanceEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events published so far, by kind (`"proposal_created"`, `"vote_cast"`, ...).
    pub fn counts(&self) -> &HashMap<&'static str, u64> {
        &self.counts
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
