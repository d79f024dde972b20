use thiserror::Error;

/// Errors encountered while fetching or decoding a weather observation.
///
/// These never reach dispatch callers; the condition resolver recovers from
/// all of them by falling back to default conditions.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(reqwest::Error),
    #[error("weather response was not valid JSON: {0}")]
    Json(reqwest::Error),
    #[error("weather payload malformed: {0}")]
    Payload(String),
    #[error("weather payload carried no current observation")]
    MissingObservation,
}
