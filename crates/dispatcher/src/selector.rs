use std::collections::HashSet;

use tracing::debug;

use fleet_core::{
    geo::{haversine_km, Coordinate, DISTANCE_EPSILON_KM},
    models::Bot,
    FleetResult,
};

use crate::zone_index::ZoneIndex;

/// 选中的机器人及其到取件点的距离
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub bot: Bot,
    pub distance_km: f64,
    /// 本次选择时区域内可用机器人总数（含被排除的）
    pub candidate_count: usize,
}

/// 最近可用机器人选择器
///
/// 与最小距离相差不超过 [`DISTANCE_EPSILON_KM`] 的机器人视为等距，等距时取ID
/// 字典序较小者，因此同一快照下结果与机器人的返回顺序无关。
#[derive(Clone)]
pub struct MatchSelector {
    zone_index: ZoneIndex,
}

impl MatchSelector {
    pub fn new(zone_index: ZoneIndex) -> Self {
        Self { zone_index }
    }

    pub async fn select_nearest(
        &self,
        pickup: &Coordinate,
        zone_id: &str,
        exclude: &HashSet<String>,
    ) -> FleetResult<Option<Selection>> {
        let bots = self.zone_index.available_bots_in(zone_id).await?;
        let candidate_count = bots.len();

        let selection = nearest_candidate(pickup, &bots, exclude).map(|(bot, distance_km)| {
            Selection {
                bot: bot.clone(),
                distance_km,
                candidate_count,
            }
        });

        match &selection {
            Some(selection) => debug!(
                "区域 {} 选择机器人 {} (距离: {:.3}km, 候选: {}, 排除: {})",
                zone_id,
                selection.bot.id,
                selection.distance_km,
                candidate_count,
                exclude.len()
            ),
            None => debug!(
                "区域 {} 没有可选机器人 (候选: {}, 排除: {})",
                zone_id,
                candidate_count,
                exclude.len()
            ),
        }

        Ok(selection)
    }
}

/// 在给定快照中找出离取件点最近、且不在排除集合中的机器人
pub fn nearest_candidate<'a>(
    pickup: &Coordinate,
    bots: &'a [Bot],
    exclude: &HashSet<String>,
) -> Option<(&'a Bot, f64)> {
    let scored: Vec<(&Bot, f64)> = bots
        .iter()
        .filter(|bot| !exclude.contains(&bot.id))
        .map(|bot| (bot, haversine_km(pickup, &bot.location)))
        .collect();
    nearest_of(&scored)
}

/// 先求最小距离，再在最小距离的容差范围内取ID最小者
fn nearest_of<'a>(scored: &[(&'a Bot, f64)]) -> Option<(&'a Bot, f64)> {
    let min_distance = scored
        .iter()
        .map(|(_, distance)| *distance)
        .min_by(f64::total_cmp)?;

    scored
        .iter()
        .filter(|(_, distance)| *distance - min_distance <= DISTANCE_EPSILON_KM)
        .min_by(|(a, _), (b, _)| a.id.cmp(&b.id))
        .copied()
}
