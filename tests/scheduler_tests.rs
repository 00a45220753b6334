mod common;

use std::sync::Arc;
use std::time::Duration;

use common::RecordingGateway;
use lottery_bot::lottery::scheduler::{DeletionScheduler, JOIN_MESSAGE_TTL};
use teloxide::types::{ChatId, MessageId};

#[tokio::test(start_paused = true)]
async fn test_deletion_fires_after_delay() {
    let gateway = Arc::new(RecordingGateway::new());
    let scheduler = DeletionScheduler::new(gateway.clone());

    let deletion = scheduler.schedule(ChatId(-1), MessageId(10), JOIN_MESSAGE_TTL);
    assert_eq!(scheduler.pending().len(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(gateway.deleted().is_empty());
    assert!(!deletion.is_done());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(gateway.deleted(), vec![(ChatId(-1), MessageId(10))]);
    assert!(deletion.is_done());
    assert!(scheduler.pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_deletion_never_fires() {
    let gateway = Arc::new(RecordingGateway::new());
    let scheduler = DeletionScheduler::new(gateway.clone());

    let deletion = scheduler.schedule(ChatId(-1), MessageId(10), Duration::from_secs(30));
    deletion.cancel();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(gateway.deleted().is_empty());
    assert!(deletion.is_done());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_drops_pending_deletions() {
    let gateway = Arc::new(RecordingGateway::new());
    let scheduler = DeletionScheduler::new(gateway.clone());

    scheduler.schedule(ChatId(-1), MessageId(1), Duration::from_secs(5));
    scheduler.schedule(ChatId(-1), MessageId(2), Duration::from_secs(600));
    scheduler.schedule(ChatId(-2), MessageId(3), Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.deleted(), vec![(ChatId(-1), MessageId(1))]);

    assert_eq!(scheduler.cancel_all(), 2);
    tokio::time::sleep(Duration::from_secs(700)).await;
    assert_eq!(gateway.deleted().len(), 1);
}
