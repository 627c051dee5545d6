//! Stored notifications (the durable counterpart of realtime events).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{Entity, NotificationId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: Option<String>,
    /// Monotonic: only ever goes from `false` to `true`.
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> NotificationId {
        self.id
    }
}

impl Notification {
    pub fn new(user_id: UserId, title: impl Into<String>, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title: title.into(),
            message: Some(message.into()),
            read: false,
            created_at: now,
        }
    }

    /// Returns `false` when it was already read (nothing changed).
    pub fn mark_read(&mut self) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_flag_is_monotonic() {
        let mut n = Notification::new(UserId::new(), "t", "m", Utc::now());
        assert!(n.mark_read());
        assert!(!n.mark_read());
        assert!(n.read);
    }
}
