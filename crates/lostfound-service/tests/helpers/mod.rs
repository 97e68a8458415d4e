//! Shared helpers for the service integration tests.

#![allow(dead_code)]

use lostfound_core::error::AppError;
use lostfound_core::types::{Amount, ItemId};
use lostfound_entity::escrow::Payout;
use lostfound_entity::notification::Notification;
use lostfound_service::{LostAndFound, MarkFoundRequest, ReportItemRequest, RequestContext};

/// Services over a fresh in-memory store.
pub struct TestApp {
    pub app: LostAndFound,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            app: LostAndFound::in_memory(),
        }
    }

    /// Report a wallet as `reporter` with the given reward.
    pub async fn report(&self, reporter: &str, reward: i64) -> Result<ItemId, AppError> {
        self.app
            .items
            .report_item(&RequestContext::new(reporter), wallet(reward))
            .await
    }

    /// Claim `item_id` as `finder`.
    pub async fn claim(&self, finder: &str, item_id: ItemId) -> Result<Notification, AppError> {
        self.app
            .items
            .mark_found(&RequestContext::new(finder), item_id, found_by(finder))
            .await
    }

    /// Verify `item_id` as `caller`.
    pub async fn verify(&self, caller: &str, item_id: ItemId) -> Result<Payout, AppError> {
        self.app
            .items
            .verify_and_release(&RequestContext::new(caller), item_id)
            .await
    }

    pub async fn total_escrowed(&self) -> Amount {
        self.app.escrow.total_held().await.expect("total escrowed")
    }
}

pub fn wallet(reward: i64) -> ReportItemRequest {
    ReportItemRequest {
        name: "Wallet".into(),
        description: "black leather".into(),
        location: "Park".into(),
        contact: "alice@x".into(),
        reward: Amount::new(reward),
    }
}

pub fn found_by(finder: &str) -> MarkFoundRequest {
    MarkFoundRequest {
        found_details: "found near bench".into(),
        location: "Park".into(),
        contact: format!("{finder}@x"),
    }
}
