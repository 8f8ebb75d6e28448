//! Runtime half of the skycourier engine: fleet store, dispatch service,
//! publisher port, and the simulation scheduler loop.

pub mod config;
pub mod dispatch;
pub mod loops;
pub mod publish;
pub mod state;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use publish::{MessagePublisher, RecordingPublisher, TracingPublisher};
pub use state::FleetState;
