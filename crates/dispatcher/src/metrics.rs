//! 分配相关的指标
//!
//! 通过 `metrics` 门面记录，未安装 recorder 时所有调用都是空操作。

use fleet_core::{FleetError, FleetResult};
use ::metrics::{counter, histogram};

pub const ASSIGNMENTS_TOTAL: &str = "fleet_assignments_total";
pub const COMMIT_ATTEMPTS: &str = "fleet_assignment_commit_attempts";
pub const ASSIGNMENT_DURATION: &str = "fleet_assignment_duration_seconds";

/// 一次分配请求的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned,
    NotFound,
    AlreadyAssigned,
    NoBotAvailable,
    StoreFailure,
}

impl AssignmentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOutcome::Assigned => "assigned",
            AssignmentOutcome::NotFound => "not_found",
            AssignmentOutcome::AlreadyAssigned => "already_assigned",
            AssignmentOutcome::NoBotAvailable => "no_bot_available",
            AssignmentOutcome::StoreFailure => "store_failure",
        }
    }
}

impl<T> From<&FleetResult<T>> for AssignmentOutcome {
    fn from(result: &FleetResult<T>) -> Self {
        match result {
            Ok(_) => AssignmentOutcome::Assigned,
            Err(FleetError::DeliveryNotFound { .. }) => AssignmentOutcome::NotFound,
            Err(FleetError::AlreadyAssigned { .. }) => AssignmentOutcome::AlreadyAssigned,
            Err(FleetError::NoBotAvailable { .. }) => AssignmentOutcome::NoBotAvailable,
            Err(_) => AssignmentOutcome::StoreFailure,
        }
    }
}

pub fn record_assignment(outcome: AssignmentOutcome, commit_attempts: usize, duration_seconds: f64) {
    counter!(ASSIGNMENTS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(ASSIGNMENT_DURATION).record(duration_seconds);
    if commit_attempts > 0 {
        histogram!(COMMIT_ATTEMPTS).record(commit_attempts as f64);
    }
}
