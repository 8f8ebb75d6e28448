//! Publisher port for outbound tracking events.
//!
//! The simulation core has zero knowledge of any broker: everything goes
//! through this trait. Emission is at-least-once; a publish failure is the
//! caller's to log and must never roll back already-advanced state.

use skycourier_core::OutboundEvent;
use std::sync::Mutex;

pub trait MessagePublisher: Send + Sync {
    fn publish(&self, event: &OutboundEvent) -> anyhow::Result<()>;
}

/// Publisher that writes events to the log, used by the binary.
pub struct TracingPublisher;

impl MessagePublisher for TracingPublisher {
    fn publish(&self, event: &OutboundEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(target: "skycourier::events", %payload, "event published");
        Ok(())
    }
}

/// Publisher that buffers events in memory, used by tests.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<OutboundEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything published so far.
    pub fn take(&self) -> Vec<OutboundEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }

    pub fn snapshot(&self) -> Vec<OutboundEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl MessagePublisher for RecordingPublisher {
    fn publish(&self, event: &OutboundEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }
}
