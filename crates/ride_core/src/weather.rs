//! Ride condition resolution from an external weather source.
//!
//! Pricing needs two booleans per trip: is it night, and is the weather bad.
//! Both are derived from the provider's latest observation at the fixed
//! reference coordinate and are recomputed for every request, never cached.
//! When the provider is unreachable or its payload cannot be parsed, the
//! resolver falls back to daytime/good-weather conditions and only logs the
//! failure; the pricing path never errors or hangs on the provider.

pub mod client;
pub mod error;
mod parser;
mod response;

pub use client::WttrClient;
pub use error::WeatherError;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use tracing::warn;

/// Night pricing applies from this local hour...
const NIGHT_STARTS_HOUR: u32 = 22;
/// ...until this one.
const NIGHT_ENDS_HOUR: u32 = 6;
/// Temperatures below this count as bad weather even without precipitation.
const COLD_THRESHOLD_C: i32 = 10;

/// Transient night/bad-weather pair used to price a single trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionSnapshot {
    pub is_night: bool,
    pub is_bad_weather: bool,
}

/// One observation at the reference coordinate, in provider-local time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub observed_at: NaiveDateTime,
    pub temperature_c: i32,
    pub precipitation_mm: f64,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_observation(&self) -> Result<WeatherObservation, WeatherError>;
}

/// Derive pricing conditions from the provider's current observation,
/// falling back to the daytime/good-weather default on any provider failure.
pub async fn resolve_conditions(provider: &dyn WeatherProvider) -> ConditionSnapshot {
    match provider.current_observation().await {
        Ok(observation) => conditions_from(&observation),
        Err(err) => {
            warn!(error = %err, "weather lookup failed, pricing with default conditions");
            ConditionSnapshot::default()
        }
    }
}

/// Pure condition derivation: night is 22:00-05:59 provider-local, bad
/// weather is any precipitation or cold.
pub fn conditions_from(observation: &WeatherObservation) -> ConditionSnapshot {
    let hour = observation.observed_at.hour();
    ConditionSnapshot {
        is_night: hour >= NIGHT_STARTS_HOUR || hour < NIGHT_ENDS_HOUR,
        is_bad_weather: observation.precipitation_mm > 0.0
            || observation.temperature_c < COLD_THRESHOLD_C,
    }
}
