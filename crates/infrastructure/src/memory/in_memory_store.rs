use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use fleet_core::{
    models::{Bot, BotStatus, CommitOutcome, Delivery, DeliveryState},
    traits::{AssignmentStore, BotRepository, DeliveryRepository},
    FleetError, FleetResult,
};

#[derive(Debug, Default)]
struct FleetState {
    deliveries: HashMap<String, Delivery>,
    bots: HashMap<String, Bot>,
}

/// 内存记录存储
///
/// 配送单与机器人放在同一把读写锁下，联合提交在写锁内完成，
/// 任何读者都不会看到只更新了一半的分配。
#[derive(Debug, Default)]
pub struct InMemoryFleetStore {
    state: RwLock<FleetState>,
}

impl InMemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// 当前全部配送单与机器人的快照，按ID排序
    pub async fn snapshot(&self) -> (Vec<Delivery>, Vec<Bot>) {
        let state = self.state.read().await;
        let mut deliveries: Vec<Delivery> = state.deliveries.values().cloned().collect();
        let mut bots: Vec<Bot> = state.bots.values().cloned().collect();
        deliveries.sort_by(|a, b| a.id.cmp(&b.id));
        bots.sort_by(|a, b| a.id.cmp(&b.id));
        (deliveries, bots)
    }
}

fn sort_by_creation(deliveries: &mut [Delivery]) {
    deliveries.sort_by(|a, b| {
        a.creation_timestamp
            .cmp(&b.creation_timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl DeliveryRepository for InMemoryFleetStore {
    async fn create(&self, delivery: &Delivery) -> FleetResult<Delivery> {
        let mut state = self.state.write().await;
        if state.deliveries.contains_key(&delivery.id) {
            return Err(FleetError::DatabaseOperation(format!(
                "配送单ID重复: {}",
                delivery.id
            )));
        }
        state
            .deliveries
            .insert(delivery.id.clone(), delivery.clone());
        debug!("创建配送单成功: {}", delivery.id);
        Ok(delivery.clone())
    }

    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Delivery>> {
        Ok(self.state.read().await.deliveries.get(id).cloned())
    }

    async fn list_by_creator(&self, creator_id: &str) -> FleetResult<Vec<Delivery>> {
        let state = self.state.read().await;
        let mut deliveries: Vec<Delivery> = state
            .deliveries
            .values()
            .filter(|d| d.creator_id == creator_id)
            .cloned()
            .collect();
        sort_by_creation(&mut deliveries);
        Ok(deliveries)
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> FleetResult<Vec<Delivery>> {
        let state = self.state.read().await;
        let mut deliveries: Vec<Delivery> = state
            .deliveries
            .values()
            .filter(|d| d.creation_timestamp >= from && d.creation_timestamp < to)
            .cloned()
            .collect();
        sort_by_creation(&mut deliveries);
        Ok(deliveries)
    }

    async fn mark_assigned(&self, delivery_id: &str, bot_id: &str) -> FleetResult<bool> {
        let mut state = self.state.write().await;
        match state.deliveries.get_mut(delivery_id) {
            Some(delivery) if delivery.is_pending() => {
                delivery.state = DeliveryState::Assigned;
                delivery.assigned_bot_id = Some(bot_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BotRepository for InMemoryFleetStore {
    async fn create(&self, bot: &Bot) -> FleetResult<Bot> {
        let mut state = self.state.write().await;
        if state.bots.contains_key(&bot.id) {
            return Err(FleetError::DatabaseOperation(format!(
                "机器人ID重复: {}",
                bot.id
            )));
        }
        state.bots.insert(bot.id.clone(), bot.clone());
        debug!("注册机器人成功: {}", bot.id);
        Ok(bot.clone())
    }

    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Bot>> {
        Ok(self.state.read().await.bots.get(id).cloned())
    }

    async fn list_by_zone(&self, zone_id: &str) -> FleetResult<Vec<Bot>> {
        let state = self.state.read().await;
        let mut bots: Vec<Bot> = state
            .bots
            .values()
            .filter(|b| b.zone_id == zone_id)
            .cloned()
            .collect();
        bots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(bots)
    }

    async fn get_available_bots(&self, zone_id: &str) -> FleetResult<Vec<Bot>> {
        let state = self.state.read().await;
        let mut bots: Vec<Bot> = state
            .bots
            .values()
            .filter(|b| b.is_candidate_for(zone_id))
            .cloned()
            .collect();
        bots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(bots)
    }

    async fn claim(&self, bot_id: &str) -> FleetResult<bool> {
        let mut state = self.state.write().await;
        match state.bots.get_mut(bot_id) {
            Some(bot) if bot.is_available() => {
                bot.status = BotStatus::Busy;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, bot_id: &str) -> FleetResult<()> {
        let mut state = self.state.write().await;
        let bot = state
            .bots
            .get_mut(bot_id)
            .ok_or_else(|| FleetError::BotNotFound {
                id: bot_id.to_string(),
            })?;
        bot.status = BotStatus::Available;
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryFleetStore {
    async fn commit_assignment(
        &self,
        delivery_id: &str,
        bot_id: &str,
    ) -> FleetResult<CommitOutcome> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let delivery = match state.deliveries.get_mut(delivery_id) {
            Some(delivery) if delivery.is_pending() => delivery,
            _ => return Ok(CommitOutcome::DeliveryConflict),
        };
        let bot = match state.bots.get_mut(bot_id) {
            Some(bot) if bot.is_available() => bot,
            _ => return Ok(CommitOutcome::BotConflict),
        };

        bot.status = BotStatus::Busy;
        delivery.state = DeliveryState::Assigned;
        delivery.assigned_bot_id = Some(bot_id.to_string());

        debug!("内存存储提交分配: {} -> {}", delivery_id, bot_id);
        Ok(CommitOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_testing_utils::{assert_assignment_invariants, BotBuilder, DeliveryBuilder};

    #[tokio::test]
    async fn test_commit_updates_both_entities() {
        let store = InMemoryFleetStore::new();
        DeliveryRepository::create(&store, &DeliveryBuilder::new().with_id("d-1").build())
            .await
            .unwrap();
        BotRepository::create(&store, &BotBuilder::new().with_id("b-1").build())
            .await
            .unwrap();

        let outcome = store.commit_assignment("d-1", "b-1").await.unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);

        let delivery = DeliveryRepository::get_by_id(&store, "d-1")
            .await
            .unwrap()
            .unwrap();
        let bot = BotRepository::get_by_id(&store, "b-1").await.unwrap().unwrap();
        assert_eq!(delivery.state, DeliveryState::Assigned);
        assert_eq!(delivery.assigned_bot_id.as_deref(), Some("b-1"));
        assert_eq!(bot.status, BotStatus::Busy);
    }

    #[tokio::test]
    async fn test_commit_reports_which_side_conflicted() {
        let store = InMemoryFleetStore::new();
        DeliveryRepository::create(&store, &DeliveryBuilder::new().with_id("d-1").build())
            .await
            .unwrap();
        DeliveryRepository::create(&store, &DeliveryBuilder::new().with_id("d-2").build())
            .await
            .unwrap();
        BotRepository::create(&store, &BotBuilder::new().with_id("b-1").build())
            .await
            .unwrap();
        let (held, holder) = BotBuilder::new().with_id("b-2").build_held("d-9");
        BotRepository::create(&store, &held).await.unwrap();
        DeliveryRepository::create(&store, &holder).await.unwrap();

        assert_eq!(
            store.commit_assignment("d-1", "b-2").await.unwrap(),
            CommitOutcome::BotConflict
        );
        assert_eq!(
            store.commit_assignment("missing", "b-1").await.unwrap(),
            CommitOutcome::DeliveryConflict
        );
        assert_eq!(
            store.commit_assignment("d-1", "missing").await.unwrap(),
            CommitOutcome::BotConflict
        );

        // 冲突时不修改任何一方
        let (deliveries, bots) = store.snapshot().await;
        assert!(deliveries[..2].iter().all(|d| d.is_pending()));
        assert_eq!(bots[0].status, BotStatus::Available);
        assert_assignment_invariants(&deliveries, &bots);

        store.commit_assignment("d-1", "b-1").await.unwrap();
        assert_eq!(
            store.commit_assignment("d-1", "b-1").await.unwrap(),
            CommitOutcome::DeliveryConflict
        );
        assert_eq!(
            store.commit_assignment("d-2", "b-1").await.unwrap(),
            CommitOutcome::BotConflict
        );

        let (deliveries, bots) = store.snapshot().await;
        assert_assignment_invariants(&deliveries, &bots);
    }

    #[tokio::test]
    async fn test_available_bots_filters_zone_and_status() {
        let store = InMemoryFleetStore::new();
        for bot in [
            BotBuilder::new().with_id("b-3").in_zone("Z1").build(),
            BotBuilder::new().with_id("b-1").in_zone("Z1").build(),
            BotBuilder::new().with_id("b-4").in_zone("Z2").build(),
        ] {
            BotRepository::create(&store, &bot).await.unwrap();
        }
        let (held, holder) = BotBuilder::new().with_id("b-2").in_zone("Z1").build_held("d-1");
        BotRepository::create(&store, &held).await.unwrap();
        DeliveryRepository::create(&store, &holder).await.unwrap();

        let available = store.get_available_bots("Z1").await.unwrap();
        let ids: Vec<&str> = available.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-3"]);

        assert_eq!(store.list_by_zone("Z1").await.unwrap().len(), 3);
        assert!(store.get_available_bots("Z9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let store = InMemoryFleetStore::new();
        let delivery = DeliveryBuilder::new().with_id("d-1").build();
        DeliveryRepository::create(&store, &delivery).await.unwrap();
        let err = DeliveryRepository::create(&store, &delivery)
            .await
            .unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_claim_and_release() {
        let store = InMemoryFleetStore::new();
        BotRepository::create(&store, &BotBuilder::new().with_id("b-1").build())
            .await
            .unwrap();

        assert!(store.claim("b-1").await.unwrap());
        assert!(!store.claim("b-1").await.unwrap());
        store.release("b-1").await.unwrap();
        assert!(store.claim("b-1").await.unwrap());

        assert!(!store.claim("ghost").await.unwrap());
        assert!(matches!(
            store.release("ghost").await,
            Err(FleetError::BotNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mark_assigned_is_conditional() {
        let store = InMemoryFleetStore::new();
        DeliveryRepository::create(&store, &DeliveryBuilder::new().with_id("d-1").build())
            .await
            .unwrap();

        assert!(store.mark_assigned("d-1", "b-1").await.unwrap());
        assert!(!store.mark_assigned("d-1", "b-2").await.unwrap());
        let delivery = DeliveryRepository::get_by_id(&store, "d-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.assigned_bot_id.as_deref(), Some("b-1"));
    }

    #[tokio::test]
    async fn test_list_created_between_is_half_open() {
        let store = InMemoryFleetStore::new();
        let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let next_day = day + chrono::Duration::days(1);

        for (id, at) in [
            ("d-start", day),
            ("d-mid", day + chrono::Duration::hours(12)),
            ("d-next", next_day),
            ("d-before", day - chrono::Duration::seconds(1)),
        ] {
            DeliveryRepository::create(
                &store,
                &DeliveryBuilder::new().with_id(id).created_at(at).build(),
            )
            .await
            .unwrap();
        }

        let found = store.list_created_between(day, next_day).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d-start", "d-mid"]);
    }
}
