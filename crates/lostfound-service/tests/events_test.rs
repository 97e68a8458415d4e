//! Observers see committed transitions only, in order.

mod helpers;

use tokio::sync::broadcast::error::TryRecvError;

use lostfound_core::events::{EventPayload, ItemEvent, NotificationEvent};
use lostfound_core::types::{Amount, Identity};

use helpers::TestApp;

#[tokio::test]
async fn test_lifecycle_emits_events_in_order() {
    let t = TestApp::new();
    let mut rx = t.app.subscribe();

    let id = t.report("alice", 100).await.unwrap();
    t.claim("bob", id).await.unwrap();
    t.verify("alice", id).await.unwrap();

    let names: Vec<&str> = (0..4).map(|_| rx.try_recv().unwrap().name()).collect();
    assert_eq!(
        names,
        vec!["ItemReported", "ItemFound", "NotificationCreated", "RewardReleased"]
    );
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_event_payloads() {
    let t = TestApp::new();
    let mut rx = t.app.subscribe();

    let id = t.report("alice", 100).await.unwrap();
    let lead = t.claim("bob", id).await.unwrap();

    let reported = rx.recv().await.unwrap();
    assert_eq!(reported.actor, Some(Identity::new("alice")));
    assert_eq!(
        reported.payload,
        EventPayload::Item(ItemEvent::Reported {
            item_id: id,
            reporter: Identity::new("alice"),
            reward: Amount::new(100),
        })
    );

    let found = rx.recv().await.unwrap();
    assert_eq!(
        found.payload,
        EventPayload::Item(ItemEvent::Found {
            item_id: id,
            finder: Identity::new("bob"),
            location: "Park".into(),
        })
    );

    let created = rx.recv().await.unwrap();
    assert_eq!(
        created.payload,
        EventPayload::Notification(NotificationEvent::Created {
            notification_id: lead.id,
            recipient: Identity::new("alice"),
            item_id: id,
        })
    );
}

#[tokio::test]
async fn test_rejections_emit_nothing() {
    let t = TestApp::new();
    let id = t.report("alice", 10).await.unwrap();
    let mut rx = t.app.subscribe();

    t.report("alice", 0).await.unwrap_err();
    t.verify("alice", id).await.unwrap_err();
    t.claim("bob", id).await.unwrap();
    t.claim("carol", id).await.unwrap_err();
    t.verify("bob", id).await.unwrap_err();

    let names: Vec<&str> = (0..2).map(|_| rx.try_recv().unwrap().name()).collect();
    assert_eq!(names, vec!["ItemFound", "NotificationCreated"]);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_no_subscriber_does_not_block() {
    let t = TestApp::new();
    assert_eq!(t.app.events.subscriber_count(), 0);
    let id = t.report("alice", 10).await.unwrap();
    t.claim("bob", id).await.unwrap();
    t.verify("alice", id).await.unwrap();
}
