//! Behaviour every store back end must share

use chrono::{TimeZone, Utc};
use fleet_core::models::{BotStatus, CommitOutcome, DeliveryState};
use fleet_infrastructure::FleetStores;
use fleet_testing_utils::{assert_assignment_invariants, BotBuilder, DeliveryBuilder, TestEnv};

pub async fn delivery_crud_and_queries(stores: &FleetStores) {
    let creator = TestEnv::unique_id("creator");
    let day = Utc.with_ymd_and_hms(2031, 3, 14, 0, 0, 0).unwrap();

    let early = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .by_creator(&creator)
        .created_at(day + chrono::Duration::hours(1))
        .build();
    let late = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .by_creator(&creator)
        .created_at(day + chrono::Duration::hours(23))
        .build();
    let next_day = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .created_at(day + chrono::Duration::days(1))
        .build();

    for delivery in [&late, &next_day, &early] {
        stores.deliveries.create(delivery).await.unwrap();
    }

    let loaded = stores.deliveries.get_by_id(&early.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, early.id);
    assert_eq!(loaded.state, DeliveryState::Pending);
    assert_eq!(loaded.pickup, early.pickup);
    assert_eq!(loaded.creation_timestamp, early.creation_timestamp);
    assert!(stores.deliveries.get_by_id("nope").await.unwrap().is_none());

    let by_creator = stores.deliveries.list_by_creator(&creator).await.unwrap();
    let ids: Vec<&str> = by_creator.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec![early.id.as_str(), late.id.as_str()]);

    // 半开区间：次日零点的配送单不属于当天
    let in_day = stores
        .deliveries
        .list_created_between(day, day + chrono::Duration::days(1))
        .await
        .unwrap();
    let ids: Vec<&str> = in_day.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec![early.id.as_str(), late.id.as_str()]);

    assert!(stores.deliveries.create(&early).await.is_err());
}

pub async fn conditional_writes(stores: &FleetStores) {
    let zone = TestEnv::unique_id("zone");
    let bot = BotBuilder::new()
        .with_id(&TestEnv::unique_id("b"))
        .in_zone(&zone)
        .build();
    let (busy, holder) = BotBuilder::new()
        .with_id(&TestEnv::unique_id("b"))
        .in_zone(&zone)
        .build_held(&TestEnv::unique_id("d"));
    stores.bots.create(&bot).await.unwrap();
    stores.bots.create(&busy).await.unwrap();
    stores.deliveries.create(&holder).await.unwrap();

    assert_eq!(stores.bots.list_by_zone(&zone).await.unwrap().len(), 2);
    let available = stores.bots.get_available_bots(&zone).await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, bot.id);

    assert!(stores.bots.claim(&bot.id).await.unwrap());
    assert!(!stores.bots.claim(&bot.id).await.unwrap());
    stores.bots.release(&bot.id).await.unwrap();
    let reloaded = stores.bots.get_by_id(&bot.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, BotStatus::Available);

    let delivery = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .in_zone(&zone)
        .build();
    stores.deliveries.create(&delivery).await.unwrap();
    assert!(stores
        .deliveries
        .mark_assigned(&delivery.id, &bot.id)
        .await
        .unwrap());
    assert!(!stores
        .deliveries
        .mark_assigned(&delivery.id, &busy.id)
        .await
        .unwrap());
    let reloaded = stores.deliveries.get_by_id(&delivery.id).await.unwrap().unwrap();
    assert_eq!(reloaded.assigned_bot_id.as_deref(), Some(bot.id.as_str()));
}

pub async fn joint_commit(stores: &FleetStores) {
    let zone = TestEnv::unique_id("zone");
    let bot = BotBuilder::new()
        .with_id(&TestEnv::unique_id("b"))
        .in_zone(&zone)
        .build();
    let (busy, holder) = BotBuilder::new()
        .with_id(&TestEnv::unique_id("b"))
        .in_zone(&zone)
        .build_held(&TestEnv::unique_id("d"));
    let first = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .in_zone(&zone)
        .build();
    let second = DeliveryBuilder::new()
        .with_id(&TestEnv::unique_id("d"))
        .in_zone(&zone)
        .build();
    stores.bots.create(&bot).await.unwrap();
    stores.bots.create(&busy).await.unwrap();
    stores.deliveries.create(&holder).await.unwrap();
    stores.deliveries.create(&first).await.unwrap();
    stores.deliveries.create(&second).await.unwrap();

    assert_eq!(
        stores
            .assignments
            .commit_assignment(&first.id, &busy.id)
            .await
            .unwrap(),
        CommitOutcome::BotConflict
    );
    assert_eq!(
        stores
            .assignments
            .commit_assignment(&first.id, &bot.id)
            .await
            .unwrap(),
        CommitOutcome::Committed
    );
    assert_eq!(
        stores
            .assignments
            .commit_assignment(&second.id, &bot.id)
            .await
            .unwrap(),
        CommitOutcome::BotConflict
    );

    let first = stores.deliveries.get_by_id(&first.id).await.unwrap().unwrap();
    let second = stores.deliveries.get_by_id(&second.id).await.unwrap().unwrap();
    let bot = stores.bots.get_by_id(&bot.id).await.unwrap().unwrap();
    assert_eq!(first.state, DeliveryState::Assigned);
    assert_eq!(first.assigned_bot_id.as_deref(), Some(bot.id.as_str()));
    assert!(second.is_pending());
    assert_eq!(bot.status, BotStatus::Busy);

    // 配送单已分配时，即使换一个可用机器人也不应修改该机器人
    let spare = BotBuilder::new()
        .with_id(&TestEnv::unique_id("b"))
        .in_zone(&zone)
        .build();
    stores.bots.create(&spare).await.unwrap();
    assert_eq!(
        stores
            .assignments
            .commit_assignment(&first.id, &spare.id)
            .await
            .unwrap(),
        CommitOutcome::DeliveryConflict
    );
    let spare = stores.bots.get_by_id(&spare.id).await.unwrap().unwrap();
    assert_eq!(spare.status, BotStatus::Available);

    let mut deliveries = Vec::new();
    for id in [&first.id, &second.id, &holder.id] {
        deliveries.push(stores.deliveries.get_by_id(id).await.unwrap().unwrap());
    }
    let bots = stores.bots.list_by_zone(&zone).await.unwrap();
    assert_assignment_invariants(&deliveries, &bots);
}
