use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jobboard_core::UserId;

use crate::DomainEvent;

/// Who an envelope is addressed to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Channel {
    /// Every connected client.
    Broadcast,
    /// One recipient, keyed by user id.
    User(UserId),
}

impl Channel {
    /// The channel key as a string (`"broadcast"` or the recipient's id).
    pub fn key(&self) -> String {
        match self {
            Channel::Broadcast => "broadcast".to_string(),
            Channel::User(id) => id.to_string(),
        }
    }

    /// Whether `user` should receive envelopes sent on this channel.
    pub fn reaches(&self, user: UserId) -> bool {
        match self {
            Channel::Broadcast => true,
            Channel::User(id) => *id == user,
        }
    }
}

/// Envelope for a published event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E = DomainEvent> {
    event_id: Uuid,
    channel: Channel,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(channel: Channel, occurred_at: DateTime<Utc>, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            channel,
            occurred_at,
            payload,
        }
    }

    pub fn to_user(user: UserId, occurred_at: DateTime<Utc>, payload: E) -> Self {
        Self::new(Channel::User(user), occurred_at, payload)
    }

    pub fn broadcast(occurred_at: DateTime<Utc>, payload: E) -> Self {
        Self::new(Channel::Broadcast, occurred_at, payload)
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
