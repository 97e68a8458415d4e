//! Notification creation, listing, and delivery acknowledgement.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lostfound_core::error::AppError;
use lostfound_core::types::{Identity, NotificationId};
use lostfound_database::store::{LedgerStore, LedgerTx};
use lostfound_entity::notification::{NewNotification, Notification};

/// Creates and serves find-lead notifications.
///
/// The router never deduplicates: each call to [`notify`](Self::notify)
/// produces a new notification, whatever the item.
#[derive(Debug, Clone)]
pub struct NotificationRouter {
    store: Arc<dyn LedgerStore>,
}

impl NotificationRouter {
    /// Creates a new notification router.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Lead text shown to the reporter.
    pub fn compose_message(found_details: &str, location: &str, contact: &str) -> String {
        format!("{found_details}\nLocation: {location}\nContact: {contact}")
    }

    /// Record a new notification inside the caller's transaction.
    pub async fn notify(
        &self,
        tx: &mut dyn LedgerTx,
        new: NewNotification,
        at: DateTime<Utc>,
    ) -> Result<Notification, AppError> {
        let notification = tx.insert_notification(new, at).await?;

        info!(
            notification_id = %notification.id,
            item_id = %notification.item_id,
            recipient = %notification.recipient,
            finder = %notification.finder,
            "Notification created"
        );
        Ok(notification)
    }

    /// Notifications addressed to `recipient`, newest first.
    pub async fn list_notifications(
        &self,
        recipient: &Identity,
    ) -> Result<Vec<Notification>, AppError> {
        self.store.list_notifications_for(recipient).await
    }

    /// Fetch one notification.
    pub async fn get_notification(&self, id: NotificationId) -> Result<Notification, AppError> {
        self.store
            .find_notification(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    /// Number of undelivered notifications for `recipient`.
    pub async fn unread_count(&self, recipient: &Identity) -> Result<u64, AppError> {
        self.store.count_undelivered(recipient).await
    }

    /// Flag a notification as delivered. Repeating the call is a no-op.
    pub async fn mark_delivered(&self, id: NotificationId) -> Result<(), AppError> {
        let mut tx = self.store.begin().await?;
        if !tx.mark_delivered(id).await? {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        tx.commit().await?;

        debug!(notification_id = %id, "Notification marked delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_core::error::ErrorKind;
    use lostfound_core::types::ItemId;
    use lostfound_database::store::MemoryLedgerStore;

    fn lead(recipient: &str) -> NewNotification {
        NewNotification {
            item_id: ItemId::new(1),
            finder: Identity::new("bob"),
            recipient: Identity::new(recipient),
            message: NotificationRouter::compose_message("by the bench", "Park", "bob@x"),
            finder_contact: "bob@x".into(),
        }
    }

    async fn router_with(leads: &[&str]) -> NotificationRouter {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let router = NotificationRouter::new(Arc::clone(&store));
        let mut tx = store.begin().await.unwrap();
        for recipient in leads {
            router
                .notify(tx.as_mut(), lead(recipient), Utc::now())
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();
        router
    }

    #[test]
    fn test_compose_message() {
        assert_eq!(
            NotificationRouter::compose_message("near bench", "Park", "bob@x"),
            "near bench\nLocation: Park\nContact: bob@x"
        );
    }

    #[tokio::test]
    async fn test_notify_does_not_deduplicate() {
        let router = router_with(&["alice", "alice"]).await;
        let list = router.list_notifications(&Identity::new("ALICE")).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_ne!(list[0].id, list[1].id);
        assert!(list.iter().all(|n| !n.delivered));
    }

    #[tokio::test]
    async fn test_list_filters_by_recipient() {
        let router = router_with(&["alice", "carol"]).await;
        let list = router.list_notifications(&Identity::new("carol")).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].recipient, Identity::new("carol"));
    }

    #[tokio::test]
    async fn test_mark_delivered_is_idempotent() {
        let router = router_with(&["alice"]).await;
        let alice = Identity::new("alice");
        let id = router.list_notifications(&alice).await.unwrap()[0].id;
        assert_eq!(router.unread_count(&alice).await.unwrap(), 1);

        router.mark_delivered(id).await.unwrap();
        router.mark_delivered(id).await.unwrap();
        assert_eq!(router.unread_count(&alice).await.unwrap(), 0);
        assert!(router.get_notification(id).await.unwrap().delivered);
    }

    #[tokio::test]
    async fn test_mark_delivered_unknown_id() {
        let router = router_with(&[]).await;
        let err = router
            .mark_delivered(NotificationId::new(42))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
