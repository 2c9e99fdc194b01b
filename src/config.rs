use crate::error::ConfigError;
use crate::tyre::TyreTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_LAPS: u32 = 70;
pub const DEFAULT_PIT_STOP_TIME: f64 = 20.0;
pub const DEFAULT_SOFT_LAP_TIME: f64 = 85.0;
pub const DEFAULT_DEGRADATION_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Dry,
    Intermediate,
    Wet,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weather::Dry => "Dry",
            Weather::Intermediate => "Intermediate",
            Weather::Wet => "Wet",
        };
        f.write_str(name)
    }
}

impl FromStr for Weather {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" => Ok(Weather::Dry),
            "intermediate" => Ok(Weather::Intermediate),
            "wet" => Ok(Weather::Wet),
            _ => Err(ConfigError::UnknownWeather(s.to_string())),
        }
    }
}

/// Race-control intervention active on a lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyEvent {
    Vsc,
    SafetyCar,
    RedFlag,
}

impl SafetyEvent {
    pub fn label(self) -> &'static str {
        match self {
            SafetyEvent::Vsc => "VSC",
            SafetyEvent::SafetyCar => "SC",
            SafetyEvent::RedFlag => "Red",
        }
    }
}

/// One event per lap, keyed by absolute lap index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyEvents {
    by_lap: BTreeMap<u32, SafetyEvent>,
}

impl SafetyEvents {
    /// Merges the three lap lists in VSC, SC, Red order so a later kind
    /// overwrites an earlier one on a shared lap.
    pub fn from_lists(vsc: &[u32], sc: &[u32], red: &[u32]) -> Self {
        let mut by_lap = BTreeMap::new();
        for (laps, event) in [
            (vsc, SafetyEvent::Vsc),
            (sc, SafetyEvent::SafetyCar),
            (red, SafetyEvent::RedFlag),
        ] {
            for &lap in laps {
                by_lap.insert(lap, event);
            }
        }
        Self { by_lap }
    }

    pub fn get(&self, lap: u32) -> Option<SafetyEvent> {
        self.by_lap.get(&lap).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, SafetyEvent)> + '_ {
        self.by_lap.iter().map(|(lap, event)| (*lap, *event))
    }

    pub fn len(&self) -> usize {
        self.by_lap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lap.is_empty()
    }
}

/// Fully validated race inputs. The simulation core trusts these values.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    pub total_laps: u32,
    pub pit_stop_time: f64,
    pub weather: Weather,
    pub baseline_soft_lap_time: f64,
    pub track_degradation_multiplier: f64,
    pub safety_events: SafetyEvents,
}

impl RaceConfig {
    pub fn builder() -> RaceConfigBuilder {
        RaceConfigBuilder::default()
    }

    pub fn tyre_table(&self) -> TyreTable {
        TyreTable::derive(self.baseline_soft_lap_time, self.track_degradation_multiplier)
    }
}

#[derive(Debug, Clone)]
pub struct RaceConfigBuilder {
    total_laps: u32,
    pit_stop_time: f64,
    weather: Weather,
    baseline_soft_lap_time: f64,
    track_degradation_multiplier: f64,
    vsc_laps: Vec<u32>,
    sc_laps: Vec<u32>,
    red_laps: Vec<u32>,
}

impl Default for RaceConfigBuilder {
    fn default() -> Self {
        Self {
            total_laps: DEFAULT_LAPS,
            pit_stop_time: DEFAULT_PIT_STOP_TIME,
            weather: Weather::Dry,
            baseline_soft_lap_time: DEFAULT_SOFT_LAP_TIME,
            track_degradation_multiplier: DEFAULT_DEGRADATION_MULTIPLIER,
            vsc_laps: Vec::new(),
            sc_laps: Vec::new(),
            red_laps: Vec::new(),
        }
    }
}

impl RaceConfigBuilder {
    pub fn total_laps(mut self, laps: u32) -> Self {
        self.total_laps = laps;
        self
    }

    pub fn pit_stop_time(mut self, seconds: f64) -> Self {
        self.pit_stop_time = seconds;
        self
    }

    pub fn weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn baseline_soft_lap_time(mut self, seconds: f64) -> Self {
        self.baseline_soft_lap_time = seconds;
        self
    }

    pub fn track_degradation_multiplier(mut self, multiplier: f64) -> Self {
        self.track_degradation_multiplier = multiplier;
        self
    }

    pub fn vsc_laps(mut self, laps: Vec<u32>) -> Self {
        self.vsc_laps = laps;
        self
    }

    pub fn sc_laps(mut self, laps: Vec<u32>) -> Self {
        self.sc_laps = laps;
        self
    }

    pub fn red_laps(mut self, laps: Vec<u32>) -> Self {
        self.red_laps = laps;
        self
    }

    pub fn build(self) -> Result<RaceConfig, ConfigError> {
        if self.total_laps == 0 {
            return Err(ConfigError::NoLaps);
        }
        positive("pit stop time", self.pit_stop_time)?;
        positive("base lap time", self.baseline_soft_lap_time)?;
        positive("degradation multiplier", self.track_degradation_multiplier)?;

        for (kind, laps) in [
            ("VSC", &self.vsc_laps),
            ("SC", &self.sc_laps),
            ("Red", &self.red_laps),
        ] {
            if let Some(&lap) = laps.iter().find(|&&l| l == 0 || l > self.total_laps) {
                return Err(ConfigError::EventLapOutOfRange {
                    kind,
                    lap,
                    total_laps: self.total_laps,
                });
            }
        }

        Ok(RaceConfig {
            total_laps: self.total_laps,
            pit_stop_time: self.pit_stop_time,
            weather: self.weather,
            baseline_soft_lap_time: self.baseline_soft_lap_time,
            track_degradation_multiplier: self.track_degradation_multiplier,
            safety_events: SafetyEvents::from_lists(&self.vsc_laps, &self.sc_laps, &self.red_laps),
        })
    }
}

// NaN fails the comparison too
fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Race description loaded from a JSON file. Missing fields keep the builder's value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaceFile {
    pub laps: Option<u32>,
    pub pit_stop_time: Option<f64>,
    pub weather: Option<String>,
    pub base_lap_time: Option<f64>,
    pub degradation_multiplier: Option<f64>,
    #[serde(default)]
    pub vsc: Vec<u32>,
    #[serde(default)]
    pub sc: Vec<u32>,
    #[serde(default)]
    pub red: Vec<u32>,
}

impl RaceFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn apply(self, mut builder: RaceConfigBuilder) -> Result<RaceConfigBuilder, ConfigError> {
        if let Some(laps) = self.laps {
            builder = builder.total_laps(laps);
        }
        if let Some(pit) = self.pit_stop_time {
            builder = builder.pit_stop_time(pit);
        }
        if let Some(weather) = self.weather {
            builder = builder.weather(weather.parse()?);
        }
        if let Some(base) = self.base_lap_time {
            builder = builder.baseline_soft_lap_time(base);
        }
        if let Some(mult) = self.degradation_multiplier {
            builder = builder.track_degradation_multiplier(mult);
        }
        if !self.vsc.is_empty() {
            builder = builder.vsc_laps(self.vsc);
        }
        if !self.sc.is_empty() {
            builder = builder.sc_laps(self.sc);
        }
        if !self.red.is_empty() {
            builder = builder.red_laps(self.red);
        }
        Ok(builder)
    }
}
