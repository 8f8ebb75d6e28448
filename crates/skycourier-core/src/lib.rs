//! Core logic for the drone dispatch and flight-simulation engine.
//!
//! Everything in this crate is pure and synchronous: geo math, the data
//! model, the mission state machine, and the event contracts. The runtime
//! pieces (store, dispatcher, scheduler loop) live in `skycourier-engine`.

pub mod error;
pub mod events;
pub mod geo;
pub mod mission;
pub mod models;

pub use error::{DispatchError, MissionStepError};
pub use events::{OrderReady, OutboundEvent, DRONE_DELIVERY_METHOD};
pub use geo::{bearing_deg, distance_km, next_position, GeoPoint, EARTH_RADIUS_KM};
pub use mission::{eta_report, step, EtaReport, StepOutcome, StepParams, Transition};
pub use models::{Drone, DroneState, Mission, MissionStatus, MAX_PAYLOAD_KG};
