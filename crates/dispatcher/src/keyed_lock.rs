use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// 按键互斥的异步锁
///
/// 同一个键的持有者依次执行，不同键之间互不影响。没有持有者也没有等待者的
/// 键会在守卫释放时从表中移除。
#[derive(Default)]
pub struct KeyedLock {
    slots: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// 持有期间独占对应的键
pub struct KeyedGuard {
    key: String,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    slots: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = slot.clone().lock_owned().await;
        KeyedGuard {
            key: key.to_string(),
            slot,
            guard: Some(guard),
            slots: self.slots.clone(),
        }
    }

    /// 当前仍在表中的键数量
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        // 表中一份、本守卫一份；再多说明还有等待者
        if Arc::strong_count(&self.slot) <= 2 {
            if let Some(current) = slots.get(&self.key) {
                if Arc::ptr_eq(current, &self.slot) {
                    slots.remove(&self.key);
                }
            }
        }
    }
}
