//! Item lifecycle commands and queries.
//!
//! Each command runs as one store transaction. The item row is locked
//! first, so the state check and the transition it guards cannot be
//! separated by a concurrent command on the same item. Escrow and
//! notification writes join that same transaction, and events are
//! published only after it commits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use lostfound_core::error::AppError;
use lostfound_core::events::{ItemEvent, NotificationEvent};
use lostfound_core::types::{Identity, ItemId};
use lostfound_database::store::{ItemSnapshot, LedgerStore, LedgerTx};
use lostfound_entity::escrow::Payout;
use lostfound_entity::item::{Item, ItemState, NewItem};
use lostfound_entity::notification::{NewNotification, Notification};

use crate::access::AccessControl;
use crate::context::RequestContext;
use crate::escrow::EscrowLedger;
use crate::events::EventBus;
use crate::notification::NotificationRouter;

use super::request::{MarkFoundRequest, ReportItemRequest};

/// The Item Store.
#[derive(Debug, Clone)]
pub struct ItemService {
    store: Arc<dyn LedgerStore>,
    escrow: Arc<EscrowLedger>,
    router: Arc<NotificationRouter>,
    events: EventBus,
}

impl ItemService {
    /// Creates a new item service.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        escrow: Arc<EscrowLedger>,
        router: Arc<NotificationRouter>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            escrow,
            router,
            events,
        }
    }

    /// Report a lost item and take its reward into escrow.
    pub async fn report_item(
        &self,
        ctx: &RequestContext,
        req: ReportItemRequest,
    ) -> Result<ItemId, AppError> {
        let result = self.try_report_item(ctx, req).await;
        log_outcome("report_item", None, ctx, &result);
        result
    }

    async fn try_report_item(
        &self,
        ctx: &RequestContext,
        req: ReportItemRequest,
    ) -> Result<ItemId, AppError> {
        let reporter = ctx.caller()?.clone();
        req.validate()?;

        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        let item = tx
            .insert_item(
                NewItem {
                    reporter: reporter.clone(),
                    name: req.name,
                    description: req.description,
                    location: req.location,
                    contact: req.contact,
                    reward: req.reward,
                },
                now,
            )
            .await?;
        self.escrow
            .escrow(tx.as_mut(), item.id, item.reward, now)
            .await?;
        tx.commit().await?;

        info!(
            item_id = %item.id,
            reporter = %reporter,
            reward = %item.reward,
            "Item reported"
        );

        self.events.publish(
            Some(reporter.clone()),
            ItemEvent::Reported {
                item_id: item.id,
                reporter,
                reward: item.reward,
            },
        );

        Ok(item.id)
    }

    /// Submit a found-claim. The caller becomes the item's finder and
    /// the reporter receives a lead.
    pub async fn mark_found(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        req: MarkFoundRequest,
    ) -> Result<Notification, AppError> {
        let result = self.try_mark_found(ctx, item_id, req).await;
        log_outcome("mark_found", Some(item_id), ctx, &result);
        result
    }

    async fn try_mark_found(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        req: MarkFoundRequest,
    ) -> Result<Notification, AppError> {
        let finder = ctx.caller()?.clone();
        req.validate()?;

        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        let mut item = lock(tx.as_mut(), item_id).await?;

        if !AccessControl::is_claimable_by(&item, &finder) {
            return Err(AppError::invalid_state(format!(
                "Item {item_id} is {} and can no longer be claimed",
                item.state
            )));
        }

        item.state = ItemState::Found;
        item.finder = Some(finder.clone());
        item.found_location = Some(req.location.clone());
        item.found_at = Some(now);
        tx.update_item(&item).await?;

        let notification = self
            .router
            .notify(
                tx.as_mut(),
                NewNotification {
                    item_id,
                    finder: finder.clone(),
                    recipient: item.reporter.clone(),
                    message: NotificationRouter::compose_message(
                        &req.found_details,
                        &req.location,
                        &req.contact,
                    ),
                    finder_contact: req.contact,
                },
                now,
            )
            .await?;
        tx.commit().await?;

        info!(item_id = %item_id, finder = %finder, "Item marked found");

        self.events.publish(
            Some(finder.clone()),
            ItemEvent::Found {
                item_id,
                finder: finder.clone(),
                location: req.location,
            },
        );
        self.events.publish(
            Some(finder),
            NotificationEvent::Created {
                notification_id: notification.id,
                recipient: notification.recipient.clone(),
                item_id,
            },
        );

        Ok(notification)
    }

    /// Confirm the found-claim and release the escrowed reward to the
    /// finder. Only the reporter may do this, and only once.
    pub async fn verify_and_release(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
    ) -> Result<Payout, AppError> {
        let result = self.try_verify_and_release(ctx, item_id).await;
        log_outcome("verify_and_release", Some(item_id), ctx, &result);
        result
    }

    async fn try_verify_and_release(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
    ) -> Result<Payout, AppError> {
        let caller = ctx.caller()?.clone();

        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        let mut item = lock(tx.as_mut(), item_id).await?;

        if !item.state.can_transition_to(ItemState::RewardClaimed) {
            return Err(AppError::invalid_state(format!(
                "Item {item_id} is {}, expected found",
                item.state
            )));
        }
        AccessControl::ensure_verifier(&item, &caller)?;

        let finder = item.finder.clone().ok_or_else(|| {
            AppError::internal(format!("Item {item_id} is found but has no finder"))
        })?;

        let payout = self
            .escrow
            .release(tx.as_mut(), item_id, &finder, now)
            .await?;

        item.state = ItemState::RewardClaimed;
        tx.update_item(&item).await?;
        tx.commit().await?;

        info!(
            item_id = %item_id,
            finder = %finder,
            amount = %payout.amount,
            "Reward claimed"
        );

        self.events.publish(
            Some(caller),
            ItemEvent::RewardReleased {
                item_id,
                finder,
                amount: payout.amount,
            },
        );

        Ok(payout)
    }

    /// Fetch one item.
    pub async fn get_item(&self, item_id: ItemId) -> Result<Item, AppError> {
        self.store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))
    }

    /// Fetch one item together with its current escrow balance.
    pub async fn get_item_snapshot(&self, item_id: ItemId) -> Result<ItemSnapshot, AppError> {
        self.store
            .find_item_snapshot(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))
    }

    /// All items, newest first.
    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        self.store.list_items().await
    }

    /// Items reported by `reporter`, newest first.
    pub async fn list_items_by_reporter(&self, reporter: &Identity) -> Result<Vec<Item>, AppError> {
        self.store.list_items_by_reporter(reporter).await
    }

    /// Items found by `finder`, newest first.
    pub async fn list_items_by_finder(&self, finder: &Identity) -> Result<Vec<Item>, AppError> {
        self.store.list_items_by_finder(finder).await
    }

    /// Number of items ever reported.
    pub async fn count_items(&self) -> Result<u64, AppError> {
        self.store.count_items().await
    }
}

async fn lock(tx: &mut dyn LedgerTx, item_id: ItemId) -> Result<Item, AppError> {
    tx.lock_item(item_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))
}

fn log_outcome<T>(
    operation: &'static str,
    item_id: Option<ItemId>,
    ctx: &RequestContext,
    result: &Result<T, AppError>,
) {
    let Err(err) = result else {
        return;
    };
    let item_id = item_id.map(|id| id.get());
    if err.is_domain_rejection() {
        warn!(
            operation,
            item_id,
            caller = %ctx.caller,
            kind = %err.kind,
            "Operation rejected: {}",
            err.message
        );
    } else {
        error!(
            operation,
            item_id,
            caller = %ctx.caller,
            kind = %err.kind,
            error = %err,
            "Operation failed"
        );
    }
}
