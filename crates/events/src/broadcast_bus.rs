//! In-process bus on top of `tokio::sync::broadcast`.

use tokio::sync::broadcast;

use crate::bus::{EventBus, Subscription};

pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct BroadcastEventBus<M> {
    sender: broadcast::Sender<M>,
}

impl<M: Clone + Send + 'static> BroadcastEventBus<M> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<M: Clone + Send + 'static> Default for BroadcastEventBus<M> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<M> EventBus<M> for BroadcastEventBus<M>
where
    M: Clone + Send + Sync + 'static,
{
    fn publish(&self, message: M) -> usize {
        // Err only means nobody is listening right now.
        self.sender.send(message).unwrap_or(0)
    }

    fn subscribe(&self) -> Subscription<M> {
        Subscription::new(self.sender.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio_stream::StreamExt;

    use jobboard_core::{JobId, UserId};

    use crate::{DomainEvent, EventEnvelope};

    fn promoted() -> DomainEvent {
        DomainEvent::JobPromoted {
            job_id: JobId::new(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let bus: BroadcastEventBus<EventEnvelope> = BroadcastEventBus::default();
        assert_eq!(bus.publish(EventEnvelope::broadcast(Utc::now(), promoted())), 0);
    }

    #[tokio::test]
    async fn recipient_stream_sees_own_and_broadcast_only() {
        let bus: BroadcastEventBus<EventEnvelope> = BroadcastEventBus::default();
        let me = UserId::new();
        let someone_else = UserId::new();
        let mut stream = Box::pin(bus.subscribe().into_recipient_stream(me));

        bus.publish(EventEnvelope::to_user(someone_else, Utc::now(), promoted()));
        bus.publish(EventEnvelope::to_user(me, Utc::now(), promoted()));
        bus.publish(EventEnvelope::broadcast(Utc::now(), promoted()));

        let first = stream.next().await.unwrap();
        assert_eq!(first.channel(), crate::Channel::User(me));
        let second = stream.next().await.unwrap();
        assert_eq!(second.channel(), crate::Channel::Broadcast);
    }

    #[tokio::test]
    async fn lagging_subscriber_drops_and_continues() {
        let bus: BroadcastEventBus<u32> = BroadcastEventBus::new(2);
        let mut sub = bus.subscribe();
        for n in 0..5 {
            bus.publish(n);
        }
        // Only the last `capacity` messages survive.
        assert_eq!(sub.recv().await, Some(3));
        assert_eq!(sub.recv().await, Some(4));
        assert_eq!(sub.try_recv(), None);
    }
}
