use std::sync::Arc;

use tracing::debug;

use fleet_core::{models::Bot, traits::BotRepository, FleetResult};

/// 区域可用机器人视图
///
/// 每次调用都从存储读取新的快照，不做缓存。
#[derive(Clone)]
pub struct ZoneIndex {
    bots: Arc<dyn BotRepository>,
}

impl ZoneIndex {
    pub fn new(bots: Arc<dyn BotRepository>) -> Self {
        Self { bots }
    }

    /// 区域内状态为 `available` 的机器人
    pub async fn available_bots_in(&self, zone_id: &str) -> FleetResult<Vec<Bot>> {
        let bots = self.bots.get_available_bots(zone_id).await?;
        let fetched = bots.len();
        // 存储实现返回了区域外或忙碌的机器人时一律丢弃
        let bots: Vec<Bot> = bots
            .into_iter()
            .filter(|bot| bot.is_candidate_for(zone_id))
            .collect();
        if bots.len() != fetched {
            debug!(
                "区域 {} 的查询结果中有 {} 个机器人不满足条件，已过滤",
                zone_id,
                fetched - bots.len()
            );
        }
        Ok(bots)
    }
}
