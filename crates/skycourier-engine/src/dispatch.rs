//! Dispatch service: turns a ready order into an assigned mission.

use crate::publish::MessagePublisher;
use crate::state::FleetState;
use chrono::Utc;
use skycourier_core::{DispatchError, Mission, OrderReady, OutboundEvent};
use std::sync::Arc;

pub struct Dispatcher {
    state: Arc<FleetState>,
    publisher: Arc<dyn MessagePublisher>,
    speed_kmh: f64,
}

impl Dispatcher {
    pub fn new(state: Arc<FleetState>, publisher: Arc<dyn MessagePublisher>, speed_kmh: f64) -> Self {
        Self {
            state,
            publisher,
            speed_kmh,
        }
    }

    /// Consume an inbound order-ready signal. Orders routed to any other
    /// delivery method are ignored; drone orders go through [`assign`].
    ///
    /// [`assign`]: Dispatcher::assign
    pub fn handle_order_ready(&self, order: &OrderReady) -> Result<Option<Mission>, DispatchError> {
        if !order.wants_drone() {
            tracing::debug!(
                order_id = %order.order_id,
                method = %order.delivery_method,
                "ignoring order for non-drone delivery method"
            );
            return Ok(None);
        }
        self.assign(order).map(Some)
    }

    /// Pick a drone, create the mission, and announce the assignment.
    ///
    /// `NoAvailableDrone` propagates to the caller for compensating action
    /// (fall back to a ground courier, requeue, whatever the order service
    /// decides); the order is never silently dropped. An `AssignmentFailed`
    /// event goes out as well, though its downstream contract is still
    /// unsettled.
    pub fn assign(&self, order: &OrderReady) -> Result<Mission, DispatchError> {
        let now = Utc::now();
        let result = self
            .state
            .assign_nearest(order.payload_kg, order.pickup(), |drone| {
                Mission::create(
                    drone,
                    &order.order_id,
                    order.pickup(),
                    order.delivery(),
                    self.speed_kmh,
                    now,
                )
            });

        match result {
            Ok(mission) => {
                tracing::info!(
                    order_id = %order.order_id,
                    mission_id = %mission.id,
                    drone_serial = %mission.drone_serial,
                    distance_km = mission.total_distance_km,
                    eta_min = mission.estimated_duration_min,
                    "drone assigned"
                );
                self.emit(&OutboundEvent::DroneAssigned {
                    order_id: mission.order_id.clone(),
                    drone_serial: mission.drone_serial.clone(),
                    mission_id: mission.id,
                    estimated_arrival: mission.estimated_arrival(),
                    estimated_duration_min: mission.estimated_duration_min,
                });
                Ok(mission)
            }
            Err(err) => {
                if let DispatchError::NoAvailableDrone { .. } = err {
                    tracing::warn!(order_id = %order.order_id, %err, "assignment failed");
                    self.emit(&OutboundEvent::AssignmentFailed {
                        order_id: order.order_id.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Publish failures are logged and swallowed: the mission (or the
    /// failure hook) already happened, and emission is at-least-once.
    fn emit(&self, event: &OutboundEvent) {
        if let Err(err) = self.publisher.publish(event) {
            tracing::warn!(%err, "failed to publish dispatch event");
        }
    }
}
