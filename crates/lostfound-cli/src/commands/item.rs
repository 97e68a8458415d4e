//! Item commands: report, claim, verify, and inspect.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lostfound_core::error::AppError;
use lostfound_core::types::{Amount, Identity, ItemId};
use lostfound_entity::item::Item;
use lostfound_service::{LostAndFound, MarkFoundRequest, ReportItemRequest, RequestContext};

use crate::output::{self, OutputFormat};

/// Arguments for `report`
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Reporter identity
    #[arg(long = "as")]
    pub caller: String,
    /// Item name
    #[arg(long)]
    pub name: String,
    /// Description
    #[arg(long, default_value = "")]
    pub description: String,
    /// Where it was lost
    #[arg(long)]
    pub location: String,
    /// How to reach the reporter
    #[arg(long)]
    pub contact: String,
    /// Reward in the smallest currency unit
    #[arg(long, allow_hyphen_values = true)]
    pub reward: i64,
}

/// Arguments for `found`
#[derive(Debug, Args)]
pub struct FoundArgs {
    /// Item id
    pub item: ItemId,
    /// Finder identity
    #[arg(long = "as")]
    pub caller: String,
    /// What the finder has to say
    #[arg(long)]
    pub details: String,
    /// Where the item is now
    #[arg(long)]
    pub location: String,
    /// How to reach the finder
    #[arg(long)]
    pub contact: String,
}

/// Arguments for `verify`
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Item id
    pub item: ItemId,
    /// Caller identity; must be the reporter
    #[arg(long = "as")]
    pub caller: String,
}

/// Arguments for `item`
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Item id
    pub item: ItemId,
}

/// Arguments for `items`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only items reported by this identity
    #[arg(long, conflicts_with = "finder")]
    pub reporter: Option<String>,
    /// Only items found by this identity
    #[arg(long)]
    pub finder: Option<String>,
}

/// Item display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    id: i64,
    name: String,
    state: String,
    reporter: String,
    finder: String,
    reward: i64,
    location: String,
    created_at: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.get(),
            name: item.name.clone(),
            state: item.state.to_string(),
            reporter: item.reporter.to_string(),
            finder: item
                .finder
                .as_ref()
                .map(Identity::to_string)
                .unwrap_or_else(|| "-".to_string()),
            reward: item.reward.units(),
            location: item.location.clone(),
            created_at: item.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Item with its escrow balance
#[derive(Debug, Serialize, Tabled)]
struct SnapshotRow {
    #[tabled(inline)]
    #[serde(flatten)]
    item: ItemRow,
    escrowed: i64,
}

/// Execute `report`
pub async fn report(
    app: &LostAndFound,
    args: &ReportArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = RequestContext::new(args.caller.as_str());
    let id = app
        .items
        .report_item(
            &ctx,
            ReportItemRequest {
                name: args.name.clone(),
                description: args.description.clone(),
                location: args.location.clone(),
                contact: args.contact.clone(),
                reward: Amount::new(args.reward),
            },
        )
        .await?;

    output::print_success(&format!("Reported item {id}"), format);
    let item = app.items.get_item(id).await?;
    output::print_one(&ItemRow::from(&item), format);
    Ok(())
}

/// Execute `found`
pub async fn found(
    app: &LostAndFound,
    args: &FoundArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = RequestContext::new(args.caller.as_str());
    let notification = app
        .items
        .mark_found(
            &ctx,
            args.item,
            MarkFoundRequest {
                found_details: args.details.clone(),
                location: args.location.clone(),
                contact: args.contact.clone(),
            },
        )
        .await?;

    output::print_success(
        &format!(
            "Item {} marked found; notification {} sent to {}",
            args.item, notification.id, notification.recipient
        ),
        format,
    );
    let item = app.items.get_item(args.item).await?;
    output::print_one(&ItemRow::from(&item), format);
    Ok(())
}

/// Execute `verify`
pub async fn verify(
    app: &LostAndFound,
    args: &VerifyArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = RequestContext::new(args.caller.as_str());
    let payout = app.items.verify_and_release(&ctx, args.item).await?;

    output::print_success(
        &format!(
            "Released {} to {} for item {}",
            payout.amount, payout.recipient, payout.item_id
        ),
        format,
    );
    output::print_one(&super::escrow::PayoutRow::from(&payout), format);
    Ok(())
}

/// Execute `item`
pub async fn show(
    app: &LostAndFound,
    args: &ShowArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let snapshot = app.items.get_item_snapshot(args.item).await?;
    let row = SnapshotRow {
        item: ItemRow::from(&snapshot.item),
        escrowed: snapshot.escrow_balance.units(),
    };
    output::print_one(&row, format);
    Ok(())
}

/// Execute `items`
pub async fn list(
    app: &LostAndFound,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let items = match (&args.reporter, &args.finder) {
        (Some(reporter), _) => {
            app.items
                .list_items_by_reporter(&Identity::new(reporter))
                .await?
        }
        (None, Some(finder)) => app.items.list_items_by_finder(&Identity::new(finder)).await?,
        (None, None) => app.items.list_items().await?,
    };

    let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
