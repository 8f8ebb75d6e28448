//! Simulation scheduler loop.
//!
//! Advances every active mission once per tick on a fixed cadence, emits a
//! status update for each mission ticked, and emits the completion event
//! exactly once at the tick a mission goes terminal.

use crate::publish::MessagePublisher;
use crate::state::FleetState;
use chrono::{DateTime, Utc};
use skycourier_core::{
    eta_report, geo, mission, DroneState, MissionStepError, OutboundEvent, StepParams, Transition,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

pub async fn run_simulation_loop(
    state: Arc<FleetState>,
    publisher: Arc<dyn MessagePublisher>,
    params: StepParams,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(Duration::from_secs_f64(params.tick_interval_secs));
    // a slow tick delays the next firing instead of stacking concurrent
    // ticks against the same mission set
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Simulation loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                tick_once(&state, publisher.as_ref(), &params, Utc::now());
            }
        }
    }
}

/// Advance the whole fleet by one tick. Returns how many missions were
/// stepped. Split out of the loop so tests can drive ticks directly.
pub fn tick_once(
    state: &FleetState,
    publisher: &dyn MessagePublisher,
    params: &StepParams,
    now: DateTime<Utc>,
) -> usize {
    let mut stepped = 0;

    for mission_id in state.active_mission_ids() {
        let Some(current) = state.mission(mission_id) else {
            continue;
        };
        // stored terminal status is the replay guard: a mission that
        // already finished never gets re-stepped or re-announced
        if current.status.is_terminal() {
            continue;
        }
        let Some(drone) = state.drone(&current.drone_serial) else {
            let err = MissionStepError::DroneMissing(mission_id);
            tracing::warn!(mission_id = %mission_id, %err, "skipping mission this tick");
            continue;
        };

        let outcome = match mission::step(&current, &drone, params, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                // one bad mission must never block the rest of the tick
                tracing::warn!(mission_id = %mission_id, %err, "mission step failed");
                continue;
            }
        };

        // persist first: a publish failure must not undo simulation state
        state.apply_step(&outcome);
        stepped += 1;

        let eta = eta_report(&outcome.mission, &outcome.drone, params.speed_kmh);
        emit(
            publisher,
            &OutboundEvent::DroneStatusUpdate {
                mission_id: outcome.mission.id,
                order_id: outcome.mission.order_id.clone(),
                drone_serial: outcome.drone.serial.clone(),
                lat: outcome.drone.position.lat,
                lon: outcome.drone.position.lon,
                battery_level: outcome.drone.battery_level,
                mission_status: outcome.mission.status,
                drone_state: outcome.drone.state,
                eta,
            },
        );

        match outcome.transition {
            Some(Transition::ReachedPickup) => {
                tracing::info!(
                    mission_id = %outcome.mission.id,
                    drone_serial = %outcome.drone.serial,
                    "parcel picked up"
                );
            }
            Some(Transition::Completed) => {
                tracing::info!(
                    mission_id = %outcome.mission.id,
                    order_id = %outcome.mission.order_id,
                    "delivery completed"
                );
                if let Some(completed_at) = outcome.mission.completed_at {
                    emit(
                        publisher,
                        &OutboundEvent::DeliveryCompleted {
                            order_id: outcome.mission.order_id.clone(),
                            mission_id: outcome.mission.id,
                            drone_serial: outcome.drone.serial.clone(),
                            completed_at,
                        },
                    );
                }
            }
            Some(Transition::Aborted { cause }) => {
                tracing::warn!(
                    mission_id = %outcome.mission.id,
                    order_id = %outcome.mission.order_id,
                    %cause,
                    "mission aborted, drone grounded"
                );
            }
            None => {}
        }
    }

    advance_returning_drones(state, params);
    stepped
}

/// Fly post-delivery drones back toward their home base; on arrival they
/// go idle and become eligible for assignment again.
fn advance_returning_drones(state: &FleetState, params: &StepParams) {
    for mut drone in state.drones_by_state(DroneState::Returning) {
        drone.position = geo::next_position(
            drone.position,
            drone.home_base,
            params.speed_kmh,
            params.tick_interval_secs,
        );
        if drone.position == drone.home_base {
            drone.state = DroneState::Idle;
            tracing::debug!(drone_serial = %drone.serial, "drone back at base");
        }
        state.save_drone(drone);
    }
}

fn emit(publisher: &dyn MessagePublisher, event: &OutboundEvent) {
    if let Err(err) = publisher.publish(event) {
        tracing::warn!(%err, "failed to publish tracking event");
    }
}
