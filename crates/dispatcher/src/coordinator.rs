use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use fleet_core::{
    config::DispatcherConfig,
    models::{Assignment, CommitOutcome, Delivery},
    traits::{AssignmentStore, BotRepository, DeliveryRepository},
    FleetError, FleetResult,
};

use crate::compensating_store::CompensatingAssignmentStore;
use crate::keyed_lock::KeyedLock;
use crate::metrics::{record_assignment, AssignmentOutcome};
use crate::selector::MatchSelector;
use crate::zone_index::ZoneIndex;

/// 分配协调器
///
/// `pending → assigned` 与 `available → busy` 两个迁移的唯一入口。
///
/// - 同一配送单的请求在进程内按配送单ID串行执行
/// - 提交是条件写入，由存储在写入时重新校验双方的前置条件，多进程部署下同样成立
/// - 机器人在提交前被抢走时，把它加入排除集合重新选择；重试次数不超过首次候选集合的大小
pub struct AssignmentCoordinator {
    deliveries: Arc<dyn DeliveryRepository>,
    selector: MatchSelector,
    store: Arc<dyn AssignmentStore>,
    delivery_locks: KeyedLock,
    max_commit_attempts: Option<usize>,
}

impl AssignmentCoordinator {
    pub fn new(
        deliveries: Arc<dyn DeliveryRepository>,
        bots: Arc<dyn BotRepository>,
        store: Arc<dyn AssignmentStore>,
    ) -> Self {
        Self {
            deliveries,
            selector: MatchSelector::new(ZoneIndex::new(bots)),
            store,
            delivery_locks: KeyedLock::new(),
            max_commit_attempts: None,
        }
    }

    /// 按配置组装协调器
    ///
    /// `compensating_commit` 打开时忽略传入的联合提交存储，改用两步写入加补偿。
    pub fn from_config(
        config: &DispatcherConfig,
        deliveries: Arc<dyn DeliveryRepository>,
        bots: Arc<dyn BotRepository>,
        store: Arc<dyn AssignmentStore>,
    ) -> Self {
        let store: Arc<dyn AssignmentStore> = if config.compensating_commit {
            info!("使用两步写入加补偿的分配提交");
            Arc::new(CompensatingAssignmentStore::new(
                deliveries.clone(),
                bots.clone(),
            ))
        } else {
            store
        };
        Self::new(deliveries, bots, store).with_max_commit_attempts(config.max_commit_attempts)
    }

    pub fn with_max_commit_attempts(mut self, max_commit_attempts: Option<usize>) -> Self {
        self.max_commit_attempts = max_commit_attempts;
        self
    }

    /// 为配送单分配最近的可用机器人
    #[instrument(skip(self), fields(delivery_id = %delivery_id))]
    pub async fn assign(&self, delivery_id: &str) -> FleetResult<Assignment> {
        let started = Instant::now();
        let mut commit_attempts = 0;

        let result = {
            let _guard = self.delivery_locks.lock(delivery_id).await;
            self.assign_locked(delivery_id, &mut commit_attempts).await
        };

        record_assignment(
            AssignmentOutcome::from(&result),
            commit_attempts,
            started.elapsed().as_secs_f64(),
        );
        if let Err(e) = &result {
            if e.is_store_failure() {
                warn!("分配配送单 {} 时存储出错: {}", delivery_id, e);
            }
        }
        result
    }

    async fn assign_locked(
        &self,
        delivery_id: &str,
        commit_attempts: &mut usize,
    ) -> FleetResult<Assignment> {
        let delivery = self.load_pending(delivery_id).await?;

        let mut exclude: HashSet<String> = HashSet::new();
        let mut attempt_limit: Option<usize> = None;

        loop {
            let selection = match self
                .selector
                .select_nearest(&delivery.pickup, &delivery.zone_id, &exclude)
                .await?
            {
                Some(selection) => selection,
                None => {
                    if exclude.is_empty() {
                        info!(
                            "区域 {} 没有可用机器人，配送单 {} 保持待分配",
                            delivery.zone_id, delivery.id
                        );
                    } else {
                        warn!(
                            "配送单 {} 的候选机器人均已被占用 (冲突 {} 次)",
                            delivery.id,
                            exclude.len()
                        );
                    }
                    return Err(no_bot_available(&delivery));
                }
            };

            let limit = *attempt_limit.get_or_insert_with(|| {
                let candidates = selection.candidate_count;
                self.max_commit_attempts
                    .map_or(candidates, |max| max.min(candidates))
            });
            if *commit_attempts >= limit {
                warn!(
                    "配送单 {} 已尝试提交 {} 次，放弃分配",
                    delivery.id, commit_attempts
                );
                return Err(no_bot_available(&delivery));
            }
            *commit_attempts += 1;

            let bot_id = selection.bot.id.clone();
            match self.store.commit_assignment(&delivery.id, &bot_id).await? {
                CommitOutcome::Committed => {
                    info!(
                        "配送单 {} 已分配给机器人 {} (距离: {:.3}km, 提交次数: {})",
                        delivery.id, bot_id, selection.distance_km, commit_attempts
                    );
                    return Ok(Assignment {
                        delivery_id: delivery.id.clone(),
                        bot_id,
                        distance_km: selection.distance_km,
                        assigned_at: Utc::now(),
                    });
                }
                CommitOutcome::BotConflict => {
                    warn!(
                        "机器人 {} 在提交前已被占用，重新为配送单 {} 选择",
                        bot_id, delivery.id
                    );
                    exclude.insert(bot_id);
                }
                CommitOutcome::DeliveryConflict => {
                    return Err(self.delivery_conflict(&delivery.id, &bot_id).await);
                }
            }
        }
    }

    async fn load_pending(&self, delivery_id: &str) -> FleetResult<Delivery> {
        let delivery = self
            .deliveries
            .get_by_id(delivery_id)
            .await?
            .ok_or_else(|| FleetError::DeliveryNotFound {
                id: delivery_id.to_string(),
            })?;

        if !delivery.is_pending() {
            debug!("配送单 {} 已分配，拒绝重复分配", delivery_id);
            return Err(FleetError::AlreadyAssigned {
                delivery_id: delivery.id,
                bot_id: delivery.assigned_bot_id.unwrap_or_default(),
            });
        }
        Ok(delivery)
    }

    /// 提交报告配送单已不是待分配状态时，重新读取以给出准确的错误
    ///
    /// 重新读取仍是待分配说明存储前后不一致，按存储故障上报。
    async fn delivery_conflict(&self, delivery_id: &str, bot_id: &str) -> FleetError {
        match self.deliveries.get_by_id(delivery_id).await {
            Ok(None) => FleetError::DeliveryNotFound {
                id: delivery_id.to_string(),
            },
            Ok(Some(current)) if !current.is_pending() => FleetError::AlreadyAssigned {
                delivery_id: current.id,
                bot_id: current.assigned_bot_id.unwrap_or_default(),
            },
            Ok(Some(_)) => {
                warn!(
                    "存储拒绝了配送单 {} 与机器人 {} 的提交，但配送单仍为待分配",
                    delivery_id, bot_id
                );
                FleetError::DatabaseOperation(format!(
                    "配送单 {delivery_id} 的提交结果与存储状态不一致"
                ))
            }
            Err(e) => e,
        }
    }
}

fn no_bot_available(delivery: &Delivery) -> FleetError {
    FleetError::NoBotAvailable {
        delivery_id: delivery.id.clone(),
        zone_id: delivery.zone_id.clone(),
    }
}
