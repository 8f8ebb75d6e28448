//! Engine configuration from environment.

use skycourier_core::StepParams;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Simulation cadence in seconds.
    pub tick_interval_secs: f64,
    /// Nominal cruise speed applied to the whole fleet.
    pub cruise_speed_kmh: f64,
    /// Battery percent burned per kilometer flown.
    pub battery_drain_per_km: f64,
    /// Send drones home after delivery instead of idling in place.
    pub return_to_base: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            tick_interval_secs: positive_f64("SKYCOURIER_TICK_INTERVAL_SECS", 2.0),
            cruise_speed_kmh: positive_f64("SKYCOURIER_CRUISE_SPEED_KMH", 60.0),
            battery_drain_per_km: positive_f64("SKYCOURIER_BATTERY_DRAIN_PER_KM", 5.0),
            return_to_base: env::var("SKYCOURIER_RETURN_TO_BASE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }

    pub fn step_params(&self) -> StepParams {
        StepParams {
            tick_interval_secs: self.tick_interval_secs,
            speed_kmh: self.cruise_speed_kmh,
            battery_drain_per_km: self.battery_drain_per_km,
            return_to_base: self.return_to_base,
        }
    }
}

fn positive_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::from_env();
        assert!(config.tick_interval_secs > 0.0);
        assert!(config.cruise_speed_kmh > 0.0);
        assert!(config.battery_drain_per_km > 0.0);
    }
}
