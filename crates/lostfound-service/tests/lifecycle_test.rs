//! Integration tests for the item lifecycle and its error taxonomy.

mod helpers;

use lostfound_core::error::ErrorKind;
use lostfound_core::types::{Amount, Identity, ItemId, NotificationId};
use lostfound_entity::item::ItemState;
use lostfound_service::RequestContext;

use helpers::TestApp;

#[tokio::test]
async fn test_wallet_scenario() {
    let t = TestApp::new();

    let id = t.report("alice", 100).await.unwrap();
    assert_eq!(id, ItemId::new(1));
    assert_eq!(t.app.escrow.balance(id).await.unwrap(), Amount::new(100));
    assert_eq!(t.app.items.get_item(id).await.unwrap().state, ItemState::Open);

    t.claim("bob", id).await.unwrap();
    let item = t.app.items.get_item(id).await.unwrap();
    assert_eq!(item.state, ItemState::Found);
    assert_eq!(item.finder, Some(Identity::new("bob")));

    let leads = t
        .app
        .notifications
        .list_notifications(&Identity::new("alice"))
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].item_id, id);
    assert_eq!(leads[0].finder, Identity::new("bob"));

    // The finder cannot release their own reward.
    let err = t.verify("bob", id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(t.app.escrow.balance(id).await.unwrap(), Amount::new(100));

    let payout = t.verify("alice", id).await.unwrap();
    assert_eq!(payout.recipient, Identity::new("bob"));
    assert_eq!(payout.amount, Amount::new(100));
    assert_eq!(t.app.escrow.balance(id).await.unwrap(), Amount::ZERO);
    assert_eq!(
        t.app.items.get_item(id).await.unwrap().state,
        ItemState::RewardClaimed
    );
    assert_eq!(t.app.escrow.payout(id).await.unwrap(), payout);

    let err = t.verify("alice", id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(t.total_escrowed().await, Amount::ZERO);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let t = TestApp::new();
    let missing = ItemId::new(999);

    assert_eq!(t.claim("bob", missing).await.unwrap_err().kind, ErrorKind::NotFound);
    assert_eq!(t.verify("alice", missing).await.unwrap_err().kind, ErrorKind::NotFound);
    assert_eq!(
        t.app.items.get_item(missing).await.unwrap_err().kind,
        ErrorKind::NotFound
    );
    assert_eq!(
        t.app
            .access
            .can_verify(missing, &Identity::new("alice"))
            .await
            .unwrap_err()
            .kind,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_non_positive_reward_creates_nothing() {
    let t = TestApp::new();

    for reward in [0, -1] {
        let err = t.report("alice", reward).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
    assert_eq!(t.app.items.count_items().await.unwrap(), 0);
    assert_eq!(t.total_escrowed().await, Amount::ZERO);

    // Rejected reports do not consume ids.
    assert_eq!(t.report("alice", 5).await.unwrap(), ItemId::new(1));
}

#[tokio::test]
async fn test_oversized_reward_keeps_total_readable() {
    let t = TestApp::new();

    let err = t.report("alice", i64::MAX).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(t.app.items.count_items().await.unwrap(), 0);

    t.report("alice", Amount::MAX_REWARD.units()).await.unwrap();
    t.report("bob", 1).await.unwrap();
    assert_eq!(
        t.app.escrow.total_held().await.unwrap(),
        Amount::new(Amount::MAX_REWARD.units() + 1)
    );
}

#[tokio::test]
async fn test_mark_found_only_while_open() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();
    t.claim("bob", id).await.unwrap();

    for caller in ["carol", "bob", "alice"] {
        let err = t.claim(caller, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }
    assert_eq!(
        t.app.items.get_item(id).await.unwrap().finder,
        Some(Identity::new("bob"))
    );

    t.verify("alice", id).await.unwrap();
    let err = t.claim("carol", id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let unread = t
        .app
        .notifications
        .unread_count(&Identity::new("alice"))
        .await
        .unwrap();
    assert_eq!(unread, 1);
}

#[tokio::test]
async fn test_state_checked_before_caller() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();

    // Not yet found: a stranger gets InvalidState, not Unauthorized.
    let err = t.verify("mallory", id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_identity_comparison_ignores_case() {
    let t = TestApp::new();
    let id = t.report("Alice", 10).await.unwrap();
    t.claim("BOB", id).await.unwrap();

    let mine = t
        .app
        .items
        .list_items_by_reporter(&Identity::new("ALICE"))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);

    let found = t
        .app
        .items
        .list_items_by_finder(&Identity::new("bob"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    assert!(t.app.access.can_verify(id, &Identity::new("alice")).await.unwrap());
    t.verify("aLiCe", id).await.unwrap();
}

#[tokio::test]
async fn test_access_queries() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();
    let bob = Identity::new("bob");
    let alice = Identity::new("alice");

    assert!(t.app.access.can_mark_found(id, &bob).await.unwrap());
    assert!(t.app.access.can_mark_found(id, &alice).await.unwrap());
    assert!(!t.app.access.can_verify(id, &bob).await.unwrap());

    t.claim("bob", id).await.unwrap();
    assert!(!t.app.access.can_mark_found(id, &bob).await.unwrap());
    assert!(t.app.access.can_verify(id, &alice).await.unwrap());
}

#[tokio::test]
async fn test_list_items_newest_first() {
    let t = TestApp::new();
    for reporter in ["alice", "bob", "alice"] {
        t.report(reporter, 1).await.unwrap();
    }

    let ids: Vec<i64> = t
        .app
        .items
        .list_items()
        .await
        .unwrap()
        .iter()
        .map(|item| item.id.get())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let alice: Vec<i64> = t
        .app
        .items
        .list_items_by_reporter(&Identity::new("alice"))
        .await
        .unwrap()
        .iter()
        .map(|item| item.id.get())
        .collect();
    assert_eq!(alice, vec![3, 1]);
    assert_eq!(t.app.items.count_items().await.unwrap(), 3);
}

#[tokio::test]
async fn test_notification_delivery() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();
    let lead = t.claim("bob", id).await.unwrap();

    t.app.notifications.mark_delivered(lead.id).await.unwrap();
    t.app.notifications.mark_delivered(lead.id).await.unwrap();
    assert_eq!(
        t.app
            .notifications
            .unread_count(&Identity::new("alice"))
            .await
            .unwrap(),
        0
    );

    let err = t
        .app
        .notifications
        .mark_delivered(NotificationId::new(77))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_claim_input_mutates_nothing() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();

    let mut req = helpers::found_by("bob");
    req.found_details = "x".repeat(2001);
    let err = t
        .app
        .items
        .mark_found(&RequestContext::new("bob"), id, req)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(t.app.items.get_item(id).await.unwrap().state, ItemState::Open);
}
