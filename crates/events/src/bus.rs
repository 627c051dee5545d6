//! Event publishing/subscription abstraction.
//!
//! - **At-most-once**: no persistence, no redelivery.
//! - **Lossy under backpressure**: a subscriber that lags behind the channel
//!   capacity skips the overflowed events and keeps going.
//! - **Never blocks the publisher**: `publish` is synchronous and cheap, so
//!   it can be called from request handlers after the write has committed.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use jobboard_core::UserId;

use crate::EventEnvelope;

/// A live subscription to a bus.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: broadcast::Receiver<M>,
}

impl<M: Clone + Send + 'static> Subscription<M> {
    pub fn new(receiver: broadcast::Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<M> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "realtime subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking receive; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<M> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Convert into a stream, silently skipping lag gaps.
    pub fn into_stream(self) -> impl Stream<Item = M> + Send + 'static {
        BroadcastStream::new(self.receiver).filter_map(|msg| msg.ok())
    }
}

impl<E: Clone + Send + 'static> Subscription<EventEnvelope<E>> {
    /// Stream of envelopes visible to `user`: its own channel plus broadcasts.
    pub fn into_recipient_stream(
        self,
        user: UserId,
    ) -> impl Stream<Item = EventEnvelope<E>> + Send + 'static {
        self.into_stream()
            .filter(move |envelope| envelope.channel().reaches(user))
    }
}

/// Publish/subscribe contract for realtime fan-out.
pub trait EventBus<M>: Send + Sync {
    /// Fire-and-forget publish. Returns how many subscribers were live; zero
    /// is not an error.
    fn publish(&self, message: M) -> usize;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for std::sync::Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    fn publish(&self, message: M) -> usize {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
