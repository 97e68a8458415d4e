//! Escrow ledger inspection.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lostfound_core::error::{AppError, ErrorKind};
use lostfound_core::types::ItemId;
use lostfound_entity::escrow::Payout;
use lostfound_service::LostAndFound;

use crate::output::{self, OutputFormat};

/// Arguments for `escrow`
#[derive(Debug, Args)]
pub struct EscrowArgs {
    /// Item id; omit for the ledger total
    pub item: Option<ItemId>,
}

/// Release record row
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct PayoutRow {
    item: i64,
    recipient: String,
    amount: i64,
    released_at: String,
}

impl From<&Payout> for PayoutRow {
    fn from(p: &Payout) -> Self {
        Self {
            item: p.item_id.get(),
            recipient: p.recipient.to_string(),
            amount: p.amount.units(),
            released_at: p.released_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LedgerEntry {
    item: i64,
    balance: i64,
    payout: Option<PayoutRow>,
}

#[derive(Debug, Serialize)]
struct LedgerTotals {
    items: u64,
    held: i64,
}

/// Execute `escrow`
pub async fn execute(
    app: &LostAndFound,
    args: &EscrowArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let Some(item_id) = args.item else {
        let totals = LedgerTotals {
            items: app.items.count_items().await?,
            held: app.escrow.total_held().await?.units(),
        };
        return print_json_or(&totals, format, || {
            output::print_kv("Items reported", &totals.items.to_string());
            output::print_kv("Total escrowed", &totals.held.to_string());
        });
    };

    let balance = app.escrow.balance(item_id).await?;
    let payout = match app.escrow.payout(item_id).await {
        Ok(p) => Some(PayoutRow::from(&p)),
        Err(e) if e.kind == ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    let entry = LedgerEntry {
        item: item_id.get(),
        balance: balance.units(),
        payout,
    };

    print_json_or(&entry, format, || {
        output::print_kv("Item", &entry.item.to_string());
        output::print_kv("Escrowed", &entry.balance.to_string());
        match &entry.payout {
            Some(p) => {
                output::print_kv("Released to", &p.recipient);
                output::print_kv("Released amount", &p.amount.to_string());
                output::print_kv("Released at", &p.released_at);
            }
            None => output::print_kv("Released", "no"),
        }
    })
}

fn print_json_or<T: Serialize>(
    value: &T,
    format: OutputFormat,
    table: impl FnOnce(),
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(),
    }
    Ok(())
}
