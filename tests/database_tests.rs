mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::setup_test_db;
use lottery_bot::database::models::*;
use lottery_bot::database::repository::{LotteryRepository, ParticipantRepository, StoreError};
use lottery_bot::lottery::settings::LotterySetting;
use tokio_test::{assert_err, assert_ok};

fn new_lottery(chat_id: i64) -> NewLottery {
    NewLottery {
        chat_id,
        message_id: 10,
        creator_id: 42,
        title: "Test Lottery".to_string(),
    }
}

#[tokio::test]
async fn test_lottery_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let lottery = db.create_lottery(new_lottery(-100)).await?;
    assert_eq!(lottery.chat_id, -100);
    assert_eq!(lottery.message_id, 10);
    assert_eq!(lottery.status, LotteryStatus::Paused);
    assert_eq!(lottery.winner_people, DEFAULT_WINNER_PEOPLE);
    assert!(lottery.finished_at.is_none());

    let found = db.find_lottery(lottery.id).await?.expect("lottery");
    assert_eq!(found.title, "Test Lottery");
    assert_eq!(db.find_active_by_chat(-100).await?.map(|l| l.id), Some(lottery.id));
    assert_eq!(db.find_active_by_creator(42).await?.map(|l| l.id), Some(lottery.id));
    assert!(db.find_running_by_chat(-100).await?.is_none());
    assert!(db.find_lottery(9999).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_second_unfinished_lottery_conflicts() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let first = db.create_lottery(new_lottery(-100)).await?;
    let second = db.create_lottery(new_lottery(-100)).await;
    assert!(matches!(second, Err(StoreError::Conflict)));

    // Other chats are unaffected
    assert_ok!(db.create_lottery(new_lottery(-200)).await);

    // Once finished, the chat may start a new one
    db.update_status(first.id, LotteryStatus::Finished).await?;
    assert_ok!(db.create_lottery(new_lottery(-100)).await);

    Ok(())
}

#[tokio::test]
async fn test_status_transitions() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let lottery = db.create_lottery(new_lottery(-100)).await?;

    db.update_status(lottery.id, LotteryStatus::Running).await?;
    let running = db.find_running_by_chat(-100).await?.expect("running lottery");
    assert_eq!(running.status, LotteryStatus::Running);

    db.update_status(lottery.id, LotteryStatus::Finished).await?;
    let finished = db.find_lottery(lottery.id).await?.expect("lottery");
    assert_eq!(finished.status, LotteryStatus::Finished);
    assert!(finished.finished_at.is_some());
    assert!(db.find_active_by_chat(-100).await?.is_none());
    assert!(db.find_active_by_creator(42).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_apply_settings() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let lottery = db.create_lottery(new_lottery(-100)).await?;

    for args in ["drawn_people 5", "winner_people 40%", "same_prize false", "prize A B"] {
        db.apply_setting(lottery.id, &LotterySetting::parse(args)?).await?;
    }
    db.update_message_id(lottery.id, 77).await?;

    let updated = db.find_lottery(lottery.id).await?.expect("lottery");
    assert_eq!(updated.drawn_people, 5);
    assert_eq!(updated.winner_people, "40%");
    assert!(!updated.same_prize);
    assert_eq!(updated.prize_list(), vec!["A".to_string(), "B".to_string()]);
    assert_eq!(updated.message_id, 77);

    Ok(())
}

#[tokio::test]
async fn test_participant_uniqueness() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let lottery = db.create_lottery(new_lottery(-100)).await?;

    assert_ok!(db.add_participant(lottery.id, 1, "alice").await);
    let duplicate = db.add_participant(lottery.id, 1, "alice").await;
    assert!(matches!(duplicate, Err(StoreError::Conflict)));

    // A renamed account counts as a different entry
    assert_ok!(db.add_participant(lottery.id, 1, "alice_renamed").await);
    assert_ok!(db.add_participant(lottery.id, 2, "bob").await);

    let participants = db.list_participants(lottery.id).await?;
    let names: Vec<_> = participants.iter().map(|p| p.user_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "alice_renamed", "bob"]);

    Ok(())
}

#[tokio::test]
async fn test_finish_with_prizes_records_winners_once() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let lottery = db.create_lottery(new_lottery(-100)).await?;
    let alice = db.add_participant(lottery.id, 1, "alice").await?;
    let bob = db.add_participant(lottery.id, 2, "bob").await?;

    assert!(db.find_latest_win(1).await?.is_none());
    db.finish_with_prizes(lottery.id, &[(alice.id, "Mug".to_string())]).await?;

    let finished = db.find_lottery(lottery.id).await?.expect("lottery");
    assert_eq!(finished.status, LotteryStatus::Finished);
    assert!(finished.finished_at.is_some());

    // A second pass never overwrites a prize already handed out
    db.finish_with_prizes(lottery.id, &[(alice.id, "Shirt".to_string())]).await?;

    let win = db.find_latest_win(1).await?.expect("win");
    assert_eq!(win.prize.as_deref(), Some("Mug"));
    assert_eq!(win.lottery_id, lottery.id);
    assert!(db.find_latest_win(2).await?.is_none());
    assert_eq!(bob.prize, None);

    Ok(())
}

#[tokio::test]
async fn test_finish_with_prizes_ignores_other_lotteries() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let first = db.create_lottery(new_lottery(-100)).await?;
    let second = db.create_lottery(new_lottery(-200)).await?;
    let outsider = db.add_participant(second.id, 1, "alice").await?;

    db.finish_with_prizes(first.id, &[(outsider.id, "Mug".to_string())]).await?;

    assert!(db.find_latest_win(1).await?.is_none());
    let untouched = db.find_lottery(second.id).await?.expect("lottery");
    assert_eq!(untouched.status, LotteryStatus::Paused);

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_participants() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let lottery = db.create_lottery(new_lottery(-100)).await?;
    db.add_participant(lottery.id, 1, "alice").await?;
    db.add_participant(lottery.id, 2, "bob").await?;

    db.delete_lottery(lottery.id).await?;

    assert!(db.find_lottery(lottery.id).await?.is_none());
    assert!(db.list_participants(lottery.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_purge_only_removes_old_finished_lotteries() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let old = db.create_lottery(new_lottery(-100)).await?;
    db.add_participant(old.id, 1, "alice").await?;
    db.update_status(old.id, LotteryStatus::Finished).await?;
    let active = db.create_lottery(new_lottery(-200)).await?;

    let past = (Utc::now() - Duration::days(1)).to_rfc3339();
    assert_eq!(db.purge_finished_before(&past).await?, 0);

    let future = (Utc::now() + Duration::days(1)).to_rfc3339();
    assert_eq!(db.purge_finished_before(&future).await?, 1);

    assert!(db.find_lottery(old.id).await?.is_none());
    assert!(db.list_participants(old.id).await?.is_empty());
    assert!(db.find_lottery(active.id).await?.is_some());
    assert_eq!(db.count_active_lotteries().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_participant_requires_existing_lottery() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    assert_err!(db.add_participant(12345, 1, "ghost").await);

    Ok(())
}
