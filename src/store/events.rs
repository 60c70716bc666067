//! Snapshot-changed notifications.
//!
//! Every store mutation publishes an event on a broadcast bus. Consumers
//! re-read the full snapshot on receipt, so delivery only has to be
//! best-effort: a lagged receiver is told to resync rather than replaying
//! the events it missed.

use tokio::sync::broadcast;

use crate::domain::UserId;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEventKind {
    ExpensesChanged,
    BudgetsChanged,
    /// Receiver fell behind; reload everything.
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub user: UserId,
    pub kind: StoreEventKind,
}

/// Fan-out channel for store change events.
#[derive(Debug, Clone)]
pub struct SnapshotBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl SnapshotBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event; having no subscribers is not an error.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self, user: &UserId) -> StoreSubscription {
        StoreSubscription {
            user: user.clone(),
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SnapshotBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A live subscription to one user's change events.
///
/// Events for other users are filtered out. Dropping the subscription
/// releases it; nothing is retained past that point.
pub struct StoreSubscription {
    user: UserId,
    rx: broadcast::Receiver<StoreEvent>,
}

impl StoreSubscription {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Waits for the next event for this subscription's user. Returns
    /// `None` once the bus has shut down.
    pub async fn changed(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.user == self.user => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    return Some(StoreEvent {
                        user: self.user.clone(),
                        kind: StoreEventKind::Resync,
                    })
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`changed`](Self::changed); `None` when no
    /// event is pending.
    pub fn try_changed(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.user == self.user => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    return Some(StoreEvent {
                        user: self.user.clone(),
                        kind: StoreEventKind::Resync,
                    })
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_sees_only_its_own_user() {
        let bus = SnapshotBus::default();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let mut sub = bus.subscribe(&alice);

        bus.publish(StoreEvent {
            user: bob.clone(),
            kind: StoreEventKind::ExpensesChanged,
        });
        bus.publish(StoreEvent {
            user: alice.clone(),
            kind: StoreEventKind::BudgetsChanged,
        });

        let event = sub.try_changed().expect("event for alice");
        assert_eq!(event.kind, StoreEventKind::BudgetsChanged);
        assert!(sub.try_changed().is_none());
    }

    #[test]
    fn lagged_subscription_is_told_to_resync() {
        let bus = SnapshotBus::new(2);
        let user = UserId::new("alice");
        let mut sub = bus.subscribe(&user);

        for _ in 0..8 {
            bus.publish(StoreEvent {
                user: user.clone(),
                kind: StoreEventKind::ExpensesChanged,
            });
        }

        let event = sub.try_changed().expect("resync event");
        assert_eq!(event.kind, StoreEventKind::Resync);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = SnapshotBus::default();
        bus.publish(StoreEvent {
            user: UserId::new("nobody"),
            kind: StoreEventKind::ExpensesChanged,
        });
    }
}
