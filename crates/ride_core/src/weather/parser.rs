use chrono::NaiveDateTime;

use super::error::WeatherError;
use super::response::WttrResponse;
use super::WeatherObservation;

/// wttr.in reports local observation time like `2026-08-07 10:28 PM`.
const OBS_TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

pub(super) fn parse_current_observation(
    resp: WttrResponse,
) -> Result<WeatherObservation, WeatherError> {
    let condition = resp
        .current_condition
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingObservation)?;

    let raw_time = condition
        .local_obs_date_time
        .ok_or_else(|| WeatherError::Payload("missing localObsDateTime".to_string()))?;
    let observed_at = NaiveDateTime::parse_from_str(raw_time.trim(), OBS_TIME_FORMAT)
        .map_err(|err| WeatherError::Payload(format!("bad localObsDateTime {raw_time:?}: {err}")))?;

    let raw_temp = condition
        .temp_c
        .ok_or_else(|| WeatherError::Payload("missing temp_C".to_string()))?;
    let temperature_c = raw_temp
        .trim()
        .parse::<i32>()
        .map_err(|err| WeatherError::Payload(format!("bad temp_C {raw_temp:?}: {err}")))?;

    let raw_precip = condition
        .precip_mm
        .ok_or_else(|| WeatherError::Payload("missing precipMM".to_string()))?;
    let precipitation_mm = raw_precip
        .trim()
        .parse::<f64>()
        .map_err(|err| WeatherError::Payload(format!("bad precipMM {raw_precip:?}: {err}")))?;

    Ok(WeatherObservation {
        observed_at,
        temperature_c,
        precipitation_mm,
    })
}
