mod store;

pub use store::FleetState;
