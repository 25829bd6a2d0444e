//! Fault-injecting test doubles
//!
//! Each wrapper delegates to a real store and fails selected operations on
//! demand, so tests can drive the error and compensation paths without a
//! misbehaving database.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::models::{Bot, CommitOutcome, Delivery};
use fleet_core::traits::{AssignmentStore, BotRepository, DeliveryRepository};
use fleet_core::{FleetError, FleetResult};

fn injected(operation: &str) -> FleetError {
    FleetError::DatabaseOperation(format!("injected failure: {operation}"))
}

/// DeliveryRepository wrapper with switchable failures
pub struct FaultyDeliveryRepository {
    inner: Arc<dyn DeliveryRepository>,
    fail_reads: AtomicBool,
    fail_mark_assigned: AtomicBool,
    mark_assigned_calls: AtomicUsize,
}

impl FaultyDeliveryRepository {
    pub fn new(inner: Arc<dyn DeliveryRepository>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_mark_assigned: AtomicBool::new(false),
            mark_assigned_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mark_assigned(&self, fail: bool) {
        self.fail_mark_assigned.store(fail, Ordering::SeqCst);
    }

    pub fn mark_assigned_calls(&self) -> usize {
        self.mark_assigned_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryRepository for FaultyDeliveryRepository {
    async fn create(&self, delivery: &Delivery) -> FleetResult<Delivery> {
        self.inner.create(delivery).await
    }

    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Delivery>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("get_by_id"));
        }
        self.inner.get_by_id(id).await
    }

    async fn list_by_creator(&self, creator_id: &str) -> FleetResult<Vec<Delivery>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("list_by_creator"));
        }
        self.inner.list_by_creator(creator_id).await
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> FleetResult<Vec<Delivery>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("list_created_between"));
        }
        self.inner.list_created_between(from, to).await
    }

    async fn mark_assigned(&self, delivery_id: &str, bot_id: &str) -> FleetResult<bool> {
        self.mark_assigned_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark_assigned.load(Ordering::SeqCst) {
            return Err(injected("mark_assigned"));
        }
        self.inner.mark_assigned(delivery_id, bot_id).await
    }
}

/// BotRepository wrapper with switchable failures
pub struct FaultyBotRepository {
    inner: Arc<dyn BotRepository>,
    fail_queries: AtomicBool,
    fail_release: AtomicBool,
    released: Mutex<Vec<String>>,
}

impl FaultyBotRepository {
    pub fn new(inner: Arc<dyn BotRepository>) -> Self {
        Self {
            inner,
            fail_queries: AtomicBool::new(false),
            fail_release: AtomicBool::new(false),
            released: Mutex::new(Vec::new()),
        }
    }

    /// Fail `get_available_bots` and `list_by_zone`
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_release(&self, fail: bool) {
        self.fail_release.store(fail, Ordering::SeqCst);
    }

    /// Bots that were successfully released, in call order
    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotRepository for FaultyBotRepository {
    async fn create(&self, bot: &Bot) -> FleetResult<Bot> {
        self.inner.create(bot).await
    }

    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Bot>> {
        self.inner.get_by_id(id).await
    }

    async fn list_by_zone(&self, zone_id: &str) -> FleetResult<Vec<Bot>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(injected("list_by_zone"));
        }
        self.inner.list_by_zone(zone_id).await
    }

    async fn get_available_bots(&self, zone_id: &str) -> FleetResult<Vec<Bot>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(injected("get_available_bots"));
        }
        self.inner.get_available_bots(zone_id).await
    }

    async fn claim(&self, bot_id: &str) -> FleetResult<bool> {
        self.inner.claim(bot_id).await
    }

    async fn release(&self, bot_id: &str) -> FleetResult<()> {
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(injected("release"));
        }
        self.inner.release(bot_id).await?;
        self.released.lock().unwrap().push(bot_id.to_string());
        Ok(())
    }
}

/// A scripted step for [`ScriptedAssignmentStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedCommit {
    /// Report this outcome without touching the inner store
    Outcome(CommitOutcome),
    /// Return a store error
    Fail,
}

/// AssignmentStore that plays back scripted results before delegating
///
/// Once the script is exhausted every call goes to the inner store. All
/// calls are recorded as `(delivery_id, bot_id)`.
pub struct ScriptedAssignmentStore {
    inner: Arc<dyn AssignmentStore>,
    script: Mutex<VecDeque<ScriptedCommit>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedAssignmentStore {
    pub fn new(inner: Arc<dyn AssignmentStore>) -> Self {
        Self {
            inner,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(inner: Arc<dyn AssignmentStore>, script: Vec<ScriptedCommit>) -> Self {
        let store = Self::new(inner);
        *store.script.lock().unwrap() = script.into();
        store
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AssignmentStore for ScriptedAssignmentStore {
    async fn commit_assignment(
        &self,
        delivery_id: &str,
        bot_id: &str,
    ) -> FleetResult<CommitOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((delivery_id.to_string(), bot_id.to_string()));

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(ScriptedCommit::Outcome(outcome)) => Ok(outcome),
            Some(ScriptedCommit::Fail) => Err(injected("commit_assignment")),
            None => self.inner.commit_assignment(delivery_id, bot_id).await,
        }
    }
}
