use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次成功的分配结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub delivery_id: String,
    pub bot_id: String,
    pub distance_km: f64,
    pub assigned_at: DateTime<Utc>,
}

/// 条件提交的结果
///
/// 提交只在配送单仍为 `pending` 且机器人仍为 `available` 时生效，
/// 否则报告是哪一方的前置条件失效，由协调器决定后续动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 两个实体已一并更新
    Committed,
    /// 配送单已不是待分配状态（或已不存在）
    DeliveryConflict,
    /// 机器人已不可用（或已不存在）
    BotConflict,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}
