//! PostgreSQL ledger store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use lostfound_core::config::StoreBackend;
use lostfound_core::error::{AppError, ErrorKind};
use lostfound_core::result::AppResult;
use lostfound_core::types::{Amount, Identity, ItemId, NotificationId};
use lostfound_entity::escrow::{EscrowAccount, Payout};
use lostfound_entity::item::{Item, NewItem};
use lostfound_entity::notification::{NewNotification, Notification};

use super::{ItemSnapshot, LedgerStore, LedgerTx};

/// Advisory lock key serialising transactions that read the escrow total.
const ESCROW_TOTAL_LOCK: i64 = 0x4c46_4553_4352_4f57;

/// Store backed by the tables in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn find_item(&self, id: ItemId) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))
    }

    async fn find_item_snapshot(&self, id: ItemId) -> AppResult<Option<ItemSnapshot>> {
        sqlx::query_as::<_, ItemSnapshot>(
            "SELECT i.*, COALESCE(e.balance, 0) AS escrow_balance \
             FROM items i LEFT JOIN escrow_accounts e ON e.item_id = i.id \
             WHERE i.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read item snapshot", e))
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list items", e))
    }

    async fn list_items_by_reporter(&self, reporter: &Identity) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE reporter = $1 ORDER BY id DESC")
            .bind(reporter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list items by reporter", e)
            })
    }

    async fn list_items_by_finder(&self, finder: &Identity) -> AppResult<Vec<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE finder = $1 ORDER BY id DESC")
            .bind(finder)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list items by finder", e)
            })
    }

    async fn count_items(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count items", e))?;
        Ok(count as u64)
    }

    async fn find_escrow(&self, item_id: ItemId) -> AppResult<Option<EscrowAccount>> {
        sqlx::query_as::<_, EscrowAccount>("SELECT * FROM escrow_accounts WHERE item_id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find escrow", e))
    }

    async fn total_escrowed(&self) -> AppResult<Amount> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(balance), 0)::BIGINT FROM escrow_accounts WHERE released_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map(Amount::new)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sum escrow", e))
    }

    async fn find_payout(&self, item_id: ItemId) -> AppResult<Option<Payout>> {
        sqlx::query_as::<_, Payout>("SELECT * FROM payouts WHERE item_id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find payout", e))
    }

    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find notification", e)
            })
    }

    async fn list_notifications_for(&self, recipient: &Identity) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient = $1 ORDER BY id DESC",
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    async fn count_undelivered(&self, recipient: &Identity) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND delivered = FALSE",
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count undelivered", e))?;
        Ok(count as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}

/// An open sqlx transaction. Rolled back by sqlx when dropped uncommitted.
struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_item(&mut self, id: ItemId) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock item", e))
    }

    async fn insert_item(&mut self, new: NewItem, created_at: DateTime<Utc>) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "INSERT INTO items (reporter, name, description, location, contact, reward, state, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'open', $7) RETURNING *",
        )
        .bind(&new.reporter)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.contact)
        .bind(new.reward)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert item", e))
    }

    async fn update_item(&mut self, item: &Item) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE items SET state = $2, finder = $3, found_location = $4, found_at = $5 \
             WHERE id = $1",
        )
        .bind(item.id)
        .bind(item.state)
        .bind(&item.finder)
        .bind(&item.found_location)
        .bind(item.found_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update item", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Item {} not found", item.id)));
        }
        Ok(())
    }

    async fn open_escrow(&mut self, account: EscrowAccount) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO escrow_accounts (item_id, balance, opened_at) VALUES ($1, $2, $3) \
             ON CONFLICT (item_id) DO NOTHING",
        )
        .bind(account.item_id)
        .bind(account.balance)
        .bind(account.opened_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open escrow", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::invalid_state(format!(
                "Escrow for item {} is already open",
                account.item_id
            )));
        }
        Ok(())
    }

    async fn take_escrow(
        &mut self,
        item_id: ItemId,
        released_at: DateTime<Utc>,
    ) -> AppResult<Option<Amount>> {
        sqlx::query_scalar::<_, Amount>(
            "WITH held AS ( \
                SELECT item_id, balance FROM escrow_accounts \
                WHERE item_id = $1 AND released_at IS NULL AND balance > 0 \
                FOR UPDATE \
             ) \
             UPDATE escrow_accounts e SET balance = 0, released_at = $2 \
             FROM held WHERE e.item_id = held.item_id \
             RETURNING held.balance",
        )
        .bind(item_id)
        .bind(released_at)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release escrow", e))
    }

    async fn total_escrowed(&mut self) -> AppResult<Amount> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ESCROW_TOTAL_LOCK)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock escrow total", e))?;

        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(balance), 0)::BIGINT FROM escrow_accounts WHERE released_at IS NULL",
        )
        .fetch_one(&mut *self.tx)
        .await
        .map(Amount::new)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sum escrow", e))
    }

    async fn record_payout(&mut self, payout: Payout) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO payouts (item_id, recipient, amount, released_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(payout.item_id)
        .bind(&payout.recipient)
        .bind(payout.amount)
        .bind(payout.released_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record payout", e))?;
        Ok(())
    }

    async fn insert_notification(
        &mut self,
        new: NewNotification,
        created_at: DateTime<Utc>,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (item_id, finder, recipient, message, finder_contact, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(new.item_id)
        .bind(&new.finder)
        .bind(&new.recipient)
        .bind(&new.message)
        .bind(&new.finder_contact)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn mark_delivered(&mut self, id: NotificationId) -> AppResult<bool> {
        let result = sqlx::query("UPDATE notifications SET delivered = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark delivered", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
    }
}
