//! Live-reload publishing

use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use theme_protocol::ThemeUpdate;

/// Sink for `theme:options:update` events.
pub trait UpdatePublisher: Send + Sync {
    fn publish(&self, update: &ThemeUpdate);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl UpdatePublisher for NullPublisher {
    fn publish(&self, _update: &ThemeUpdate) {}
}

/// Fans updates out to every live subscriber.
///
/// A subscriber whose receiver was dropped is forgotten on the next publish.
#[derive(Debug, Default)]
pub struct ChannelPublisher {
    subscribers: Mutex<Vec<Sender<ThemeUpdate>>>,
}

impl ChannelPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ThemeUpdate> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl UpdatePublisher for ChannelPublisher {
    fn publish(&self, update: &ThemeUpdate) {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(update.clone()).is_ok());

        tracing::debug!(
            event = update.event_name(),
            delivered = subscribers.len(),
            dropped = before - subscribers.len(),
            "published theme update"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fan_out() {
        let publisher = ChannelPublisher::new();
        let a = publisher.subscribe();
        let b = publisher.subscribe();

        publisher.publish(&ThemeUpdate::new(json!({"x": 1}), json!({})));

        assert_eq!(a.try_recv().unwrap().options, json!({"x": 1}));
        assert_eq!(b.try_recv().unwrap().options, json!({"x": 1}));
    }

    #[test]
    fn test_disconnected_subscribers_dropped() {
        let publisher = ChannelPublisher::new();
        let kept = publisher.subscribe();
        drop(publisher.subscribe());

        publisher.publish(&ThemeUpdate::new(json!({}), json!({"t": 1})));

        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap().tokens, json!({"t": 1}));
    }
}
