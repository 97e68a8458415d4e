//! Races on a single item and ledger conservation under load.

mod helpers;

use futures::future::join_all;

use lostfound_core::error::ErrorKind;
use lostfound_core::types::{Amount, Identity, ItemId};
use lostfound_entity::item::ItemState;
use lostfound_service::RequestContext;

use helpers::{TestApp, found_by, wallet};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_claims_have_one_winner() {
    let t = TestApp::new();
    let id = t.report("alice", 50).await.unwrap();

    let tasks = (0..16).map(|n| {
        let app = t.app.clone();
        tokio::spawn(async move {
            let finder = format!("finder{n}");
            app.items
                .mark_found(&RequestContext::new(finder.as_str()), id, found_by(&finder))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::InvalidState)
    );

    let item = t.app.items.get_item(id).await.unwrap();
    assert_eq!(item.state, ItemState::Found);
    assert_eq!(item.finder, Some(winners[0].finder.clone()));

    let leads = t
        .app
        .notifications
        .list_notifications(&Identity::new("alice"))
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_releases_pay_once() {
    let t = TestApp::new();
    let id = t.report("alice", 75).await.unwrap();
    t.claim("bob", id).await.unwrap();

    let tasks = (0..16).map(|_| {
        let app = t.app.clone();
        tokio::spawn(async move {
            app.items
                .verify_and_release(&RequestContext::new("alice"), id)
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let paid: Amount = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|payout| payout.amount)
        .sum();
    assert_eq!(paid, Amount::new(75));
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::InvalidState)
    );
    assert_eq!(t.app.escrow.balance(id).await.unwrap(), Amount::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_escrow_conserved_across_items() {
    let t = TestApp::new();
    let count = 20i64;

    let reports = (1..=count).map(|n| {
        let app = t.app.clone();
        tokio::spawn(async move {
            app.items
                .report_item(&RequestContext::new(format!("reporter{n}")), wallet(n))
                .await
        })
    });
    let ids: Vec<ItemId> = join_all(reports)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("report"))
        .collect();
    assert_eq!(t.app.items.count_items().await.unwrap(), count as u64);
    assert_eq!(t.total_escrowed().await, Amount::new(count * (count + 1) / 2));

    // Claim and release every other item concurrently.
    let released = ids.iter().copied().filter(|id| id.get() % 2 == 0).map(|id| {
        let app = t.app.clone();
        tokio::spawn(async move {
            let item = app.items.get_item(id).await?;
            app.items
                .mark_found(&RequestContext::new("bob"), id, found_by("bob"))
                .await?;
            app.items
                .verify_and_release(&RequestContext::new(item.reporter.as_str()), id)
                .await
        })
    });
    let payouts: Amount = join_all(released)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("release").amount)
        .sum();

    let held = t.total_escrowed().await;
    let snapshots = join_all(ids.iter().map(|id| t.app.items.get_item_snapshot(*id))).await;
    let reward_total: Amount = snapshots
        .iter()
        .map(|s| s.as_ref().expect("snapshot").item.reward)
        .sum();
    assert_eq!(held.units() + payouts.units(), reward_total.units());

    for snapshot in snapshots {
        let snapshot = snapshot.unwrap();
        let expected = if snapshot.item.state.holds_escrow() {
            snapshot.item.reward
        } else {
            Amount::ZERO
        };
        assert_eq!(snapshot.escrow_balance, expected);
    }
}
