//! Event contracts consumed and produced by the engine.
//!
//! Every outbound event carries enough data for a stateless consumer;
//! downstream services must tolerate duplicate status updates and treat
//! completion as idempotent (emission is at-least-once).

use crate::geo::GeoPoint;
use crate::mission::EtaReport;
use crate::models::{DroneState, MissionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery method value that routes an order to this engine.
pub const DRONE_DELIVERY_METHOD: &str = "DRONE";

/// Inbound signal that an order is packed and ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReady {
    pub order_id: String,
    pub merchant_id: String,
    /// Must equal "DRONE" (case-insensitive) or the event is ignored.
    pub delivery_method: String,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub pickup_address: String,
    pub delivery_lat: f64,
    pub delivery_lon: f64,
    pub delivery_address: String,
    pub payload_kg: f64,
}

impl OrderReady {
    pub fn wants_drone(&self) -> bool {
        self.delivery_method.eq_ignore_ascii_case(DRONE_DELIVERY_METHOD)
    }

    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_lat, self.pickup_lon)
    }

    pub fn delivery(&self) -> GeoPoint {
        GeoPoint::new(self.delivery_lat, self.delivery_lon)
    }
}

/// Events published by the engine for order-tracking consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    /// A drone was picked for the order. `drone_serial` is the drone's
    /// identifier throughout the fleet; there is no separate synthetic id.
    DroneAssigned {
        order_id: String,
        drone_serial: String,
        mission_id: Uuid,
        estimated_arrival: DateTime<Utc>,
        estimated_duration_min: u32,
    },
    /// Position/battery snapshot, emitted every tick for every active
    /// mission. As with assignment, `drone_serial` doubles as the drone id.
    DroneStatusUpdate {
        mission_id: Uuid,
        order_id: String,
        drone_serial: String,
        lat: f64,
        lon: f64,
        battery_level: u8,
        mission_status: MissionStatus,
        drone_state: DroneState,
        eta: EtaReport,
    },
    /// Emitted exactly once, at the tick where the mission completes.
    DeliveryCompleted {
        order_id: String,
        mission_id: Uuid,
        drone_serial: String,
        completed_at: DateTime<Utc>,
    },
    /// Compensating hook for orders no drone could take. The downstream
    /// contract is still unsettled; consumers should treat this as advisory.
    AssignmentFailed { order_id: String, reason: String },
}
