//! Outbound event fan-out.
//!
//! Every subscriber owns an unbounded queue. Publishing clones each event
//! into every queue in order, so a subscriber that stops reading only grows
//! its own backlog and a dropped subscriber is pruned on the next publish.

use crate::event::OutboundEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Identifier assigned to a subscription.
pub type SubscriberId = u64;

/// Set of live subscriber queues.
#[derive(Debug, Default)]
pub struct EventFanout {
    next_id: SubscriberId,
    subscribers: Vec<(SubscriberId, mpsc::UnboundedSender<OutboundEvent>)>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription. It receives only events published after
    /// this call.
    pub fn subscribe(&mut self) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, tx));
        debug!(subscriber_id = id, "Subscriber added");
        EventSubscription { id, event_rx: rx }
    }

    /// Deliver events, in order, to every live subscriber.
    pub fn publish(&mut self, events: &[OutboundEvent]) {
        if events.is_empty() {
            return;
        }

        self.subscribers.retain(|(id, tx)| {
            let open = events.iter().all(|event| tx.send(event.clone()).is_ok());
            if !open {
                debug!(subscriber_id = *id, "Subscriber dropped");
            }
            open
        });
    }

    /// Number of subscribers still registered.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of a subscription.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct EventSubscription {
    id: SubscriberId,
    event_rx: mpsc::UnboundedReceiver<OutboundEvent>,
}

impl EventSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the bridge has been dropped and the backlog is
    /// drained.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        self.event_rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Take every queued event without waiting.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_changed() -> OutboundEvent {
        OutboundEvent::ScannerListChanged {
            scanners: Vec::new(),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let mut fanout = EventFanout::new();
        fanout.publish(&[list_changed()]);
        assert_eq!(fanout.subscriber_count(), 0);
    }

    #[test]
    fn test_every_subscriber_gets_every_event() {
        let mut fanout = EventFanout::new();
        let mut a = fanout.subscribe();
        let mut b = fanout.subscribe();
        assert_ne!(a.id(), b.id());

        fanout.publish(&[list_changed(), list_changed()]);

        assert_eq!(a.drain().len(), 2);
        assert_eq!(b.drain().len(), 2);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut fanout = EventFanout::new();
        let dropped = fanout.subscribe();
        let mut kept = fanout.subscribe();
        drop(dropped);

        fanout.publish(&[list_changed()]);

        assert_eq!(fanout.subscriber_count(), 1);
        assert_eq!(kept.drain(), vec![list_changed()]);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let mut fanout = EventFanout::new();
        fanout.publish(&[list_changed()]);
        let mut late = fanout.subscribe();
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_ends_when_fanout_dropped() {
        let mut fanout = EventFanout::new();
        let mut sub = fanout.subscribe();
        fanout.publish(&[list_changed()]);
        drop(fanout);

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }
}
