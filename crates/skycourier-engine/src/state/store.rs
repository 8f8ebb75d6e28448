//! In-memory fleet and mission store using DashMap.
//!
//! Drones and missions are plain records keyed by id; this store is their
//! single owner. Missions are never deleted, they stay around as tracking
//! history after going terminal.

use dashmap::DashMap;
use skycourier_core::{
    geo, Drone, DroneState, DispatchError, GeoPoint, Mission, MissionStatus, StepOutcome,
    MAX_PAYLOAD_KG,
};
use std::sync::Mutex;
use uuid::Uuid;

pub struct FleetState {
    drones: DashMap<String, Drone>,
    missions: DashMap<Uuid, Mission>,
    /// Serializes select-and-assign so two concurrent dispatches can never
    /// grab the same drone.
    assign_lock: Mutex<()>,
}

impl FleetState {
    pub fn new() -> Self {
        Self {
            drones: DashMap::new(),
            missions: DashMap::new(),
            assign_lock: Mutex::new(()),
        }
    }

    /// Register a new drone: idle, fully charged, parked at its home base.
    pub fn register_drone(
        &self,
        serial: &str,
        model: &str,
        capacity_kg: f64,
        home_base: GeoPoint,
    ) -> Result<Drone, DispatchError> {
        if capacity_kg <= 0.0 || capacity_kg > MAX_PAYLOAD_KG {
            return Err(DispatchError::CapacityOutOfRange {
                capacity_kg,
                max_kg: MAX_PAYLOAD_KG,
            });
        }
        if self.drones.contains_key(serial) {
            return Err(DispatchError::DuplicateSerial(serial.to_string()));
        }
        let drone = Drone::new(serial, model, capacity_kg, home_base);
        self.drones.insert(serial.to_string(), drone.clone());
        Ok(drone)
    }

    /// Ground-crew maintenance action: recharge and return a grounded drone
    /// to service. Refused while the drone still holds a live mission.
    pub fn reset_drone(&self, serial: &str) -> bool {
        match self.drones.get_mut(serial) {
            Some(mut drone) if drone.active_mission.is_none() => {
                drone.battery_level = 100;
                drone.state = DroneState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn drone(&self, serial: &str) -> Option<Drone> {
        self.drones.get(serial).map(|r| r.value().clone())
    }

    pub fn drones_by_state(&self, state: DroneState) -> Vec<Drone> {
        self.drones
            .iter()
            .filter(|r| r.value().state == state)
            .map(|r| r.value().clone())
            .collect()
    }

    pub fn all_drones(&self) -> Vec<Drone> {
        self.drones.iter().map(|r| r.value().clone()).collect()
    }

    pub fn mission(&self, id: Uuid) -> Option<Mission> {
        self.missions.get(&id).map(|r| r.value().clone())
    }

    /// Ids of all missions still in a non-terminal status.
    pub fn active_mission_ids(&self) -> Vec<Uuid> {
        self.missions
            .iter()
            .filter(|r| !r.value().status.is_terminal())
            .map(|r| *r.key())
            .collect()
    }

    pub fn missions_by_status(&self, status: MissionStatus) -> Vec<Mission> {
        self.missions
            .iter()
            .filter(|r| r.value().status == status)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Nearest-idle selection policy: among idle drones with enough
    /// capacity, the one closest to the pickup wins; ties break on the
    /// lowest serial so selection is deterministic.
    pub fn select_available_drone(
        &self,
        payload_kg: f64,
        pickup: GeoPoint,
    ) -> Result<Drone, DispatchError> {
        self.nearest_candidate(payload_kg, pickup)
            .and_then(|serial| self.drone(&serial))
            .ok_or(DispatchError::NoAvailableDrone { payload_kg })
    }

    /// Atomically pick the nearest available drone, build its mission via
    /// `make_mission`, and mark the drone assigned. The whole
    /// read-mutate-store section runs under one lock so concurrent
    /// assignment attempts cannot double-book a drone.
    pub fn assign_nearest(
        &self,
        payload_kg: f64,
        pickup: GeoPoint,
        make_mission: impl FnOnce(&Drone) -> Mission,
    ) -> Result<Mission, DispatchError> {
        let _guard = self.assign_lock.lock().unwrap_or_else(|e| e.into_inner());

        let serial = self
            .nearest_candidate(payload_kg, pickup)
            .ok_or(DispatchError::NoAvailableDrone { payload_kg })?;
        let mut drone = match self.drones.get_mut(&serial) {
            Some(drone) => drone,
            None => return Err(DispatchError::NoAvailableDrone { payload_kg }),
        };

        let mission = make_mission(drone.value());
        drone.state = DroneState::Assigned;
        drone.active_mission = Some(mission.id);
        self.missions.insert(mission.id, mission.clone());
        Ok(mission)
    }

    fn nearest_candidate(&self, payload_kg: f64, pickup: GeoPoint) -> Option<String> {
        let mut best: Option<(f64, String)> = None;
        for entry in self.drones.iter() {
            let drone = entry.value();
            if !drone.is_available_for(payload_kg) {
                continue;
            }
            let dist = geo::distance_km(drone.position, pickup);
            let better = match &best {
                None => true,
                Some((best_dist, best_serial)) => {
                    dist < *best_dist || (dist == *best_dist && drone.serial < *best_serial)
                }
            };
            if better {
                best = Some((dist, drone.serial.clone()));
            }
        }
        best.map(|(_, serial)| serial)
    }

    /// Persist the result of one mission step: mission record and the
    /// owning drone, written through the per-key entry guards.
    pub fn apply_step(&self, outcome: &StepOutcome) {
        self.missions
            .insert(outcome.mission.id, outcome.mission.clone());
        self.drones
            .insert(outcome.drone.serial.clone(), outcome.drone.clone());
    }

    pub fn save_drone(&self, drone: Drone) {
        self.drones.insert(drone.serial.clone(), drone);
    }

    pub fn save_mission(&self, mission: Mission) {
        self.missions.insert(mission.id, mission);
    }
}

impl Default for FleetState {
    fn default() -> Self {
        Self::new()
    }
}
