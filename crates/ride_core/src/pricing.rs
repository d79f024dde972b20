//! Trip fare calculation from distance and ride conditions.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::weather::{resolve_conditions, ConditionSnapshot, WeatherProvider};

/// Default base fare in currency units.
pub const BASE_FARE: f64 = 50.0;

/// Default per-kilometer rate in currency units.
pub const PER_KM_RATE: f64 = 20.0;

/// Default multiplier for trips priced during the night window.
pub const NIGHT_MULTIPLIER: f64 = 1.2;

/// Default multiplier for trips priced in rain or cold.
pub const BAD_WEATHER_MULTIPLIER: f64 = 1.3;

/// Fare formula parameters. A single record, read per pricing request and
/// written only through the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub night_multiplier: f64,
    pub bad_weather_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km_rate: PER_KM_RATE,
            night_multiplier: NIGHT_MULTIPLIER,
            bad_weather_multiplier: BAD_WEATHER_MULTIPLIER,
        }
    }
}

/// A priced trip offer together with the conditions it was priced under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    pub is_night: bool,
    pub is_bad_weather: bool,
}

/// Calculate the fare for a trip.
///
/// Formula: `fare = base + distance_km * per_km`, then the night multiplier
/// and the bad-weather multiplier apply independently, in that order, when
/// the trip qualifies. The result is rounded to one decimal place.
/// Callers validate that `distance_km` is positive.
pub fn calculate_trip_fare(
    config: &PricingConfig,
    distance_km: f64,
    conditions: ConditionSnapshot,
) -> f64 {
    let mut fare = config.base_fare + distance_km * config.per_km_rate;
    if conditions.is_night {
        fare *= config.night_multiplier;
    }
    if conditions.is_bad_weather {
        fare *= config.bad_weather_multiplier;
    }
    round_to_tenth(fare)
}

/// Fares are quoted to one decimal place.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Price a prospective trip under current conditions.
///
/// Resolves night/bad-weather from the live provider (falling back to the
/// daytime/good-weather default if it is unavailable) and applies the fare
/// formula.
pub async fn quote_trip(
    provider: &dyn WeatherProvider,
    config: &PricingConfig,
    distance_km: f64,
) -> Result<Quote, DispatchError> {
    if !(distance_km > 0.0) {
        return Err(DispatchError::Validation(
            "distance must be positive".to_string(),
        ));
    }
    let conditions = resolve_conditions(provider).await;
    Ok(Quote {
        price: calculate_trip_fare(config, distance_km, conditions),
        is_night: conditions.is_night,
        is_bad_weather: conditions.is_bad_weather,
    })
}
