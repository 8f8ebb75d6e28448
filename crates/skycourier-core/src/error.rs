//! Error taxonomy for dispatch and mission stepping.

use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced synchronously to whoever requested an assignment.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No idle drone meets the capacity criterion. Recoverable: the order
    /// stays with the caller for compensating action (e.g. ground courier).
    #[error("no available drone for a {payload_kg} kg payload")]
    NoAvailableDrone { payload_kg: f64 },

    #[error("drone capacity {capacity_kg} kg exceeds fleet maximum {max_kg} kg")]
    CapacityOutOfRange { capacity_kg: f64, max_kg: f64 },

    #[error("drone serial {0} is already registered")]
    DuplicateSerial(String),
}

/// Failures while advancing a single mission one tick. These are isolated
/// by the scheduler: logged, the mission's tick skipped, loop continues.
#[derive(Debug, Error)]
pub enum MissionStepError {
    /// Battery hit zero mid-flight. Fatal to the mission, not the scheduler.
    #[error("drone {serial} battery exhausted, mission aborted")]
    BatteryExhausted { serial: String },

    #[error("mission {0} references unknown drone")]
    DroneMissing(Uuid),

    #[error("mission {0} is already terminal")]
    AlreadyTerminal(Uuid),
}
