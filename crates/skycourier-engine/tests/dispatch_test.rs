//! Dispatch service integration tests: selection policy, assignment
//! atomicity, and the events that come out of both paths.

use skycourier_core::{DispatchError, DroneState, GeoPoint, MissionStatus, OrderReady, OutboundEvent};
use skycourier_engine::{Dispatcher, FleetState, RecordingPublisher};
use std::sync::Arc;

const SPEED_KMH: f64 = 60.0;

fn make_order(order_id: &str, method: &str, pickup: GeoPoint, payload_kg: f64) -> OrderReady {
    OrderReady {
        order_id: order_id.to_string(),
        merchant_id: "merchant-1".to_string(),
        delivery_method: method.to_string(),
        pickup_lat: pickup.lat,
        pickup_lon: pickup.lon,
        pickup_address: "merchant address".to_string(),
        delivery_lat: pickup.lat + 0.05,
        delivery_lon: pickup.lon + 0.05,
        delivery_address: "customer address".to_string(),
        payload_kg,
    }
}

fn setup() -> (Arc<FleetState>, Arc<RecordingPublisher>, Dispatcher) {
    let state = Arc::new(FleetState::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let dispatcher = Dispatcher::new(state.clone(), publisher.clone(), SPEED_KMH);
    (state, publisher, dispatcher)
}

#[test]
fn registration_rejects_duplicates_and_oversized_capacity() {
    let state = FleetState::new();
    let base = GeoPoint::new(10.0, 106.0);

    state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap();

    let err = state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap_err();
    assert!(matches!(err, DispatchError::DuplicateSerial(_)));

    let err = state.register_drone("SKY-002", "heavy", 7.5, base).unwrap_err();
    assert!(matches!(err, DispatchError::CapacityOutOfRange { .. }));
}

#[test]
fn selection_prefers_nearest_idle_drone() {
    let state = FleetState::new();
    let pickup = GeoPoint::new(10.0, 106.0);
    state
        .register_drone("SKY-FAR", "falcon-x", 5.0, GeoPoint::new(10.5, 106.5))
        .unwrap();
    state
        .register_drone("SKY-NEAR", "falcon-x", 5.0, GeoPoint::new(10.01, 106.01))
        .unwrap();

    let drone = state.select_available_drone(1.0, pickup).unwrap();
    assert_eq!(drone.serial, "SKY-NEAR");
}

#[test]
fn selection_breaks_distance_ties_by_lowest_serial() {
    let state = FleetState::new();
    let base = GeoPoint::new(10.0, 106.0);
    state.register_drone("SKY-202", "falcon-x", 5.0, base).unwrap();
    state.register_drone("SKY-101", "falcon-x", 5.0, base).unwrap();

    let drone = state.select_available_drone(1.0, base).unwrap();
    assert_eq!(drone.serial, "SKY-101");
}

#[test]
fn selection_skips_busy_and_undersized_drones() {
    let state = FleetState::new();
    let pickup = GeoPoint::new(10.0, 106.0);
    // closest but too small
    state
        .register_drone("SKY-SMALL", "sparrow", 1.0, pickup)
        .unwrap();
    // further out but big enough
    state
        .register_drone("SKY-BIG", "falcon-x", 5.0, GeoPoint::new(10.1, 106.1))
        .unwrap();

    let drone = state.select_available_drone(3.0, pickup).unwrap();
    assert_eq!(drone.serial, "SKY-BIG");

    // nobody qualifies for this payload
    let err = state.select_available_drone(6.0, pickup).unwrap_err();
    assert!(matches!(err, DispatchError::NoAvailableDrone { .. }));
}

#[test]
fn assign_creates_mission_and_emits_assignment_event() {
    let (state, publisher, dispatcher) = setup();
    let base = GeoPoint::new(10.0, 106.0);
    state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap();

    let order = make_order("ord-1", "DRONE", base, 1.5);
    let mission = dispatcher.handle_order_ready(&order).unwrap().unwrap();

    assert_eq!(mission.status, MissionStatus::Assigned);
    assert_eq!(mission.order_id, "ord-1");
    assert_eq!(mission.drone_serial, "SKY-001");
    assert!(mission.total_distance_km > 0.0);
    assert!(mission.estimated_duration_min > 0);

    let drone = state.drone("SKY-001").unwrap();
    assert_eq!(drone.state, DroneState::Assigned);
    assert_eq!(drone.active_mission, Some(mission.id));

    let events = publisher.take();
    assert_eq!(events.len(), 1);
    match &events[0] {
        OutboundEvent::DroneAssigned {
            order_id,
            drone_serial,
            mission_id,
            estimated_duration_min,
            ..
        } => {
            assert_eq!(order_id, "ord-1");
            assert_eq!(drone_serial, "SKY-001");
            assert_eq!(*mission_id, mission.id);
            assert_eq!(*estimated_duration_min, mission.estimated_duration_min);
        }
        other => panic!("expected DroneAssigned, got {other:?}"),
    }
}

#[test]
fn assignment_failure_propagates_and_emits_hook_event() {
    let (_state, publisher, dispatcher) = setup();

    let order = make_order("ord-1", "DRONE", GeoPoint::new(10.0, 106.0), 1.5);
    let err = dispatcher.handle_order_ready(&order).unwrap_err();
    assert!(matches!(err, DispatchError::NoAvailableDrone { .. }));

    let events = publisher.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        OutboundEvent::AssignmentFailed { order_id, .. } if order_id == "ord-1"
    ));
}

#[test]
fn non_drone_orders_are_ignored() {
    let (state, publisher, dispatcher) = setup();
    let base = GeoPoint::new(10.0, 106.0);
    state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap();

    let order = make_order("ord-1", "MOTORBIKE", base, 1.5);
    let outcome = dispatcher.handle_order_ready(&order).unwrap();

    assert!(outcome.is_none());
    assert!(publisher.take().is_empty());
    assert_eq!(state.drone("SKY-001").unwrap().state, DroneState::Idle);
}

#[test]
fn a_drone_holds_at_most_one_live_mission() {
    let (state, _publisher, dispatcher) = setup();
    let base = GeoPoint::new(10.0, 106.0);
    state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap();

    dispatcher
        .handle_order_ready(&make_order("ord-1", "DRONE", base, 1.0))
        .unwrap();
    let err = dispatcher
        .handle_order_ready(&make_order("ord-2", "DRONE", base, 1.0))
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoAvailableDrone { .. }));
}

#[test]
fn delivery_method_match_is_case_insensitive() {
    let (state, _publisher, dispatcher) = setup();
    let base = GeoPoint::new(10.0, 106.0);
    state.register_drone("SKY-001", "falcon-x", 5.0, base).unwrap();

    let mission = dispatcher
        .handle_order_ready(&make_order("ord-1", "drone", base, 1.0))
        .unwrap();
    assert!(mission.is_some());
}
