//! Core data models for the dispatch engine.

use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum payload any airframe in the fleet is rated for.
pub const MAX_PAYLOAD_KG: f64 = 5.0;

/// Current state of a registered drone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    /// Unique, immutable airframe serial number.
    pub serial: String,
    pub model: String,
    /// Battery charge in percent, 0..=100.
    pub battery_level: u8,
    pub state: DroneState,
    pub position: GeoPoint,
    /// Fixed launch/recovery point. Never changes after registration.
    pub home_base: GeoPoint,
    pub capacity_kg: f64,
    /// The one live mission this drone is flying, if any.
    /// `state == Idle` if and only if this is `None`.
    pub active_mission: Option<Uuid>,
}

impl Drone {
    /// A freshly registered drone: idle, fully charged, parked at base.
    pub fn new(
        serial: impl Into<String>,
        model: impl Into<String>,
        capacity_kg: f64,
        home_base: GeoPoint,
    ) -> Self {
        Self {
            serial: serial.into(),
            model: model.into(),
            battery_level: 100,
            state: DroneState::Idle,
            position: home_base,
            home_base,
            capacity_kg,
            active_mission: None,
        }
    }

    /// Whether this drone can be handed a new mission.
    pub fn is_available_for(&self, payload_kg: f64) -> bool {
        self.state == DroneState::Idle
            && self.active_mission.is_none()
            && self.capacity_kg >= payload_kg
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneState {
    /// Parked, no mission, eligible for assignment
    #[default]
    Idle,
    /// Mission created but first tick not flown yet
    Assigned,
    /// Flying toward pickup or delivery
    InFlight,
    /// Delivery done, heading back to home base
    Returning,
    /// Recharging at base, not eligible for assignment
    Charging,
    /// Grounded (battery exhaustion or maintenance)
    Offline,
}

/// One drone's assignment to ferry a single order from pickup to delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub drone_serial: String,
    /// Externally-owned order identifier.
    pub order_id: String,
    pub pickup: GeoPoint,
    pub delivery: GeoPoint,
    pub status: MissionStatus,
    /// Pickup-to-delivery great-circle distance, fixed at creation.
    pub total_distance_km: f64,
    /// Estimate computed once at assignment, never revised afterward.
    /// Live ETAs are derived per tick from remaining distance instead.
    pub estimated_duration_min: u32,
    /// Drone battery when the mission started, for audit and drain math.
    pub battery_at_start: u8,
    /// Battery percent consumed so far, accumulated per tick from the
    /// distance actually flown. The drone's integer level is derived from
    /// this, so sub-percent hops still add up instead of rounding to zero.
    pub battery_used_pct: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    /// Drone assigned, flying toward the pickup point
    Assigned,
    /// Parcel on board, flying toward the delivery point
    InProgress,
    /// Parcel delivered
    Completed,
    /// Aborted, absorbing error state
    Failed,
}

impl MissionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Failed)
    }
}
