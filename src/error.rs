use crate::config::Weather;

/// Rejected race inputs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("lap count must be a positive integer")]
    NoLaps,

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{kind} lap {lap} is outside 1..={total_laps}")]
    EventLapOutOfRange {
        kind: &'static str,
        lap: u32,
        total_laps: u32,
    },

    #[error("unknown weather '{0}', expected Dry, Intermediate or Wet")]
    UnknownWeather(String),

    #[error("failed to read race file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid race file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("no valid strategy found for a {total_laps}-lap race in {weather} conditions")]
    NoValidStrategy { total_laps: u32, weather: Weather },
}
