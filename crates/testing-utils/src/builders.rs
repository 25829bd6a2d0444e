//! Test data builders for creating test entities
//!
//! Defaults place everything in zone `Z1` around lower Manhattan so that
//! a delivery and a bot built without overrides can be matched.

use chrono::{DateTime, Utc};
use fleet_core::geo::Coordinate;
use fleet_core::models::{Bot, BotStatus, Delivery, DeliveryState};

/// Builder for creating test Delivery entities
pub struct DeliveryBuilder {
    delivery: Delivery,
}

impl DeliveryBuilder {
    pub fn new() -> Self {
        Self {
            delivery: Delivery {
                id: uuid::Uuid::new_v4().to_string(),
                creation_timestamp: Utc::now(),
                state: DeliveryState::Pending,
                pickup: Coordinate::new(40.7128, -74.0060),
                dropoff: Coordinate::new(40.7306, -73.9352),
                zone_id: "Z1".to_string(),
                creator_id: "test-user".to_string(),
                assigned_bot_id: None,
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.delivery.id = id.to_string();
        self
    }

    pub fn in_zone(mut self, zone_id: &str) -> Self {
        self.delivery.zone_id = zone_id.to_string();
        self
    }

    pub fn with_pickup(mut self, lat: f64, lon: f64) -> Self {
        self.delivery.pickup = Coordinate::new(lat, lon);
        self
    }

    pub fn with_dropoff(mut self, lat: f64, lon: f64) -> Self {
        self.delivery.dropoff = Coordinate::new(lat, lon);
        self
    }

    pub fn by_creator(mut self, creator_id: &str) -> Self {
        self.delivery.creator_id = creator_id.to_string();
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.delivery.creation_timestamp = at;
        self
    }

    /// Already assigned; the referenced bot is not created
    ///
    /// Prefer [`BotBuilder::build_held`] when the bot is seeded too.
    pub fn assigned_to(mut self, bot_id: &str) -> Self {
        self.delivery.state = DeliveryState::Assigned;
        self.delivery.assigned_bot_id = Some(bot_id.to_string());
        self
    }

    pub fn build(self) -> Delivery {
        self.delivery
    }
}

impl Default for DeliveryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Bot entities
pub struct BotBuilder {
    bot: Bot,
}

impl BotBuilder {
    pub fn new() -> Self {
        Self {
            bot: Bot {
                id: uuid::Uuid::new_v4().to_string(),
                status: BotStatus::Available,
                location: Coordinate::new(40.7138, -74.0070),
                zone_id: "Z1".to_string(),
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.bot.id = id.to_string();
        self
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.bot.location = Coordinate::new(lat, lon);
        self
    }

    pub fn in_zone(mut self, zone_id: &str) -> Self {
        self.bot.zone_id = zone_id.to_string();
        self
    }

    /// A busy bot together with the assigned delivery that holds it
    ///
    /// Bots only become busy through an assignment, so seed both records to
    /// keep the store consistent.
    pub fn build_held(mut self, delivery_id: &str) -> (Bot, Delivery) {
        self.bot.status = BotStatus::Busy;
        let delivery = DeliveryBuilder::new()
            .with_id(delivery_id)
            .in_zone(&self.bot.zone_id)
            .with_pickup(self.bot.location.lat, self.bot.location.lon)
            .assigned_to(&self.bot.id)
            .build();
        (self.bot, delivery)
    }

    pub fn build(self) -> Bot {
        self.bot
    }
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
