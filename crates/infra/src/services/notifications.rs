use std::sync::Arc;

use jobboard_auth::{Action, Principal, authorize};
use jobboard_core::{DomainError, NotificationId};

use super::ServiceResult;
use crate::notification::Notification;
use crate::store::NotificationStore;

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationStore>) -> Self {
        Self { notifications }
    }

    pub async fn list(&self, principal: &Principal) -> ServiceResult<Vec<Notification>> {
        Ok(self.notifications.list_for_user(principal.user_id).await?)
    }

    /// Marking an already-read notification succeeds without a write.
    pub async fn mark_read(&self, principal: &Principal, id: NotificationId) -> ServiceResult<Notification> {
        let mut notification = self
            .notifications
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("notification"))?;
        authorize(
            principal,
            &Action::ReadNotification {
                recipient: notification.user_id,
            },
        )?;
        if notification.mark_read() {
            self.notifications.update(notification.clone()).await?;
        }
        Ok(notification)
    }
}
