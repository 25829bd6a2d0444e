use serde::{Deserialize, Serialize};

/// 分配协调器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 提交冲突后的最大尝试次数；为空时只受首轮候选集大小限制
    pub max_commit_attempts: Option<usize>,
    /// 存储不支持联合提交时，改用“先占用机器人、再写配送单、失败则回滚”的两步提交
    pub compensating_commit: bool,
}

impl DispatcherConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_commit_attempts == Some(0) {
            return Err(anyhow::anyhow!("最大提交尝试次数必须大于0"));
        }
        Ok(())
    }
}
