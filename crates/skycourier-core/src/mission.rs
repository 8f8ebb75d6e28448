//! Mission lifecycle: the per-tick state machine.
//!
//! `step` is a pure transition function. It takes the current mission and
//! drone records by reference and returns updated copies plus the phase
//! transition (if any) observed this tick, so the whole lifecycle is
//! testable without a store, a clock, or a broker.

use crate::error::MissionStepError;
use crate::geo::{self, GeoPoint};
use crate::models::{Drone, DroneState, Mission, MissionStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation knobs shared by every mission step.
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub tick_interval_secs: f64,
    /// Nominal cruise speed used for both movement and ETA math.
    pub speed_kmh: f64,
    /// Battery percent consumed per kilometer flown.
    pub battery_drain_per_km: f64,
    /// When set, a drone heads home after delivering instead of idling
    /// at the customer's doorstep.
    pub return_to_base: bool,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            tick_interval_secs: 2.0,
            speed_kmh: 60.0,
            battery_drain_per_km: 5.0,
            return_to_base: true,
        }
    }
}

/// Phase transition observed during one tick.
#[derive(Debug)]
pub enum Transition {
    /// Parcel picked up, now heading for the delivery point.
    ReachedPickup,
    /// Parcel delivered, mission terminal.
    Completed,
    /// Mission failed and the drone is grounded.
    Aborted { cause: MissionStepError },
}

/// Result of advancing one mission by one tick.
#[derive(Debug)]
pub struct StepOutcome {
    pub mission: Mission,
    pub drone: Drone,
    pub transition: Option<Transition>,
}

impl Mission {
    /// Create a mission at assignment time.
    ///
    /// Distance and the duration estimate are computed here, once, and are
    /// immutable afterward; live ETAs come from [`eta_report`] instead.
    /// `speed_kmh` must be positive.
    pub fn create(
        drone: &Drone,
        order_id: impl Into<String>,
        pickup: GeoPoint,
        delivery: GeoPoint,
        speed_kmh: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let total_distance_km = geo::distance_km(pickup, delivery);
        let estimated_duration_min = (total_distance_km / speed_kmh * 60.0).ceil() as u32;
        Self {
            id: Uuid::new_v4(),
            drone_serial: drone.serial.clone(),
            order_id: order_id.into(),
            pickup,
            delivery,
            status: MissionStatus::Assigned,
            total_distance_km,
            estimated_duration_min,
            battery_at_start: drone.battery_level,
            battery_used_pct: 0.0,
            started_at: now,
            completed_at: None,
        }
    }

    /// Arrival estimate frozen at assignment, for the assignment event.
    pub fn estimated_arrival(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(self.estimated_duration_min))
    }

    /// Integer battery level implied by the drain accumulated so far.
    fn remaining_battery(&self) -> u8 {
        (f64::from(self.battery_at_start) - self.battery_used_pct)
            .clamp(0.0, 100.0)
            .floor() as u8
    }
}

/// Advance one mission by one simulation tick.
///
/// The drone moves toward the current target (pickup while `Assigned`,
/// delivery while `InProgress`) with a single position update per tick:
/// the tick that lands on the pickup switches phase but does not also
/// advance toward the delivery point. Battery drains in proportion to the
/// distance flown; a pack that hits zero grounds the drone where it ends
/// the tick and flips the mission to `Failed`, unless the same tick also
/// delivered the parcel, in which case completion wins and the drone is
/// grounded after the handoff.
pub fn step(
    mission: &Mission,
    drone: &Drone,
    params: &StepParams,
    now: DateTime<Utc>,
) -> Result<StepOutcome, MissionStepError> {
    if mission.status.is_terminal() {
        return Err(MissionStepError::AlreadyTerminal(mission.id));
    }

    let mut mission = mission.clone();
    let mut drone = drone.clone();
    let mut transition = None;

    let target = match mission.status {
        MissionStatus::Assigned => mission.pickup,
        MissionStatus::InProgress => mission.delivery,
        // unreachable, guarded by the terminal check above
        MissionStatus::Completed | MissionStatus::Failed => {
            return Err(MissionStepError::AlreadyTerminal(mission.id));
        }
    };

    let before = drone.position;
    drone.position = geo::next_position(
        before,
        target,
        params.speed_kmh,
        params.tick_interval_secs,
    );
    drone.state = DroneState::InFlight;

    mission.battery_used_pct +=
        geo::distance_km(before, drone.position) * params.battery_drain_per_km;
    drone.battery_level = mission.remaining_battery();

    if mission.status == MissionStatus::Assigned && drone.position == mission.pickup {
        mission.status = MissionStatus::InProgress;
        transition = Some(Transition::ReachedPickup);
    } else if mission.status == MissionStatus::InProgress && drone.position == mission.delivery {
        mission.status = MissionStatus::Completed;
        mission.completed_at = Some(now);
        drone.active_mission = None;
        drone.state = if drone.battery_level == 0 {
            DroneState::Offline
        } else if params.return_to_base && drone.position != drone.home_base {
            DroneState::Returning
        } else {
            DroneState::Idle
        };
        transition = Some(Transition::Completed);
    }

    if drone.battery_level == 0 && mission.status != MissionStatus::Completed {
        mission.status = MissionStatus::Failed;
        mission.completed_at = Some(now);
        drone.state = DroneState::Offline;
        drone.active_mission = None;
        let cause = MissionStepError::BatteryExhausted {
            serial: drone.serial.clone(),
        };
        transition = Some(Transition::Aborted { cause });
    }

    Ok(StepOutcome {
        mission,
        drone,
        transition,
    })
}

/// Display ETAs, recomputed each tick from remaining distance and nominal
/// speed. Three observers, three horizons: the merchant watches the pickup,
/// the customer the delivery, the operator the return to base.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaReport {
    pub to_pickup_min: f64,
    pub to_delivery_min: f64,
    pub to_base_min: f64,
}

pub fn eta_report(mission: &Mission, drone: &Drone, speed_kmh: f64) -> EtaReport {
    let leg_min = |km: f64| km / speed_kmh * 60.0;

    match mission.status {
        MissionStatus::Assigned => {
            let to_pickup = geo::distance_km(drone.position, mission.pickup);
            let pickup_to_delivery = geo::distance_km(mission.pickup, mission.delivery);
            let delivery_to_base = geo::distance_km(mission.delivery, drone.home_base);
            EtaReport {
                to_pickup_min: leg_min(to_pickup),
                to_delivery_min: leg_min(to_pickup + pickup_to_delivery),
                to_base_min: leg_min(to_pickup + pickup_to_delivery + delivery_to_base),
            }
        }
        MissionStatus::InProgress => {
            let to_delivery = geo::distance_km(drone.position, mission.delivery);
            let delivery_to_base = geo::distance_km(mission.delivery, drone.home_base);
            EtaReport {
                to_pickup_min: 0.0,
                to_delivery_min: leg_min(to_delivery),
                to_base_min: leg_min(to_delivery + delivery_to_base),
            }
        }
        MissionStatus::Completed | MissionStatus::Failed => EtaReport {
            to_pickup_min: 0.0,
            to_delivery_min: 0.0,
            to_base_min: leg_min(geo::distance_km(drone.position, drone.home_base)),
        },
    }
}
