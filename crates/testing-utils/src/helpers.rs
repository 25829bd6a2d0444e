//! Test helper utilities and common assertions

use std::collections::HashMap;

use fleet_core::models::{Bot, BotStatus, Delivery, DeliveryState};

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Generate unique test ids based on a fresh uuid
    pub fn unique_id(prefix: &str) -> String {
        format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
    }
}

/// Check the store-wide assignment invariants and describe every violation
///
/// - a delivery is `assigned` exactly when it references a bot
/// - no bot is referenced by more than one delivery
/// - every referenced bot exists and is `busy`
/// - every `busy` bot is held by an assigned delivery
pub fn assignment_violations(deliveries: &[Delivery], bots: &[Bot]) -> Vec<String> {
    let mut violations = Vec::new();
    let bots_by_id: HashMap<&str, &Bot> = bots.iter().map(|b| (b.id.as_str(), b)).collect();
    let mut holders: HashMap<&str, &str> = HashMap::new();

    for delivery in deliveries {
        match (&delivery.state, delivery.assigned_bot_id.as_deref()) {
            (DeliveryState::Pending, None) => {}
            (DeliveryState::Assigned, Some(bot_id)) => {
                if let Some(previous) = holders.insert(bot_id, delivery.id.as_str()) {
                    violations.push(format!(
                        "bot {bot_id} assigned to both {previous} and {}",
                        delivery.id
                    ));
                }
                match bots_by_id.get(bot_id) {
                    Some(bot) if bot.status == BotStatus::Busy => {}
                    Some(_) => violations.push(format!(
                        "bot {bot_id} holds delivery {} but is available",
                        delivery.id
                    )),
                    None => violations.push(format!(
                        "delivery {} references missing bot {bot_id}",
                        delivery.id
                    )),
                }
            }
            (state, bot) => violations.push(format!(
                "delivery {} is {state} with assigned bot {bot:?}",
                delivery.id
            )),
        }
    }

    for bot in bots {
        if bot.status == BotStatus::Busy && !holders.contains_key(bot.id.as_str()) {
            violations.push(format!("bot {} is busy but no delivery holds it", bot.id));
        }
    }

    violations
}

/// Panic with every invariant violation found
pub fn assert_assignment_invariants(deliveries: &[Delivery], bots: &[Bot]) {
    let violations = assignment_violations(deliveries, bots);
    assert!(
        violations.is_empty(),
        "assignment invariants violated:\n{}",
        violations.join("\n")
    );
}
