use crate::config::{RaceConfig, SafetyEvent, Weather};
use crate::rng::RandomSource;
use crate::strategy::Strategy;
use crate::tyre::{Compound, TyreParameters, TyreTable};

const FUEL_EFFECT_PER_LAP: f64 = 0.03;
const NOISE_STD_DEV: f64 = 0.2;
const WARMUP_PENALTY: f64 = 1.0;
const PUNCTURE_PENALTY: f64 = 5.0;
const STANDING_START_PENALTY: f64 = 3.0;
const OVERRUN_EXTRA_SEVERITY: f64 = 2.0;
const LONG_SOFT_MARGIN: u32 = 3;
const LONG_SOFT_PENALTY: f64 = 0.5;

/// Tyre wear on one lap of a stint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wear {
    pub penalty: f64,
    pub puncture_chance: f64,
}

/// Three-phase wear curve: linear up to the falloff knee, steeper until the
/// end of the tyre's life, steeper still once the tyre is past it.
pub fn wear(params: &TyreParameters, tyre_age: u32) -> Wear {
    let degr = params.degradation_rate;
    let sev = params.falloff_severity;
    let life = params.life_laps;
    let knee = params.falloff_knee();
    let age = f64::from(tyre_age);

    if tyre_age < knee {
        Wear {
            penalty: degr * age,
            puncture_chance: 0.002,
        }
    } else if tyre_age < life {
        let into_falloff = f64::from(tyre_age - knee);
        Wear {
            penalty: degr * f64::from(knee) + into_falloff * degr * sev,
            puncture_chance: 0.005 + 0.001 * into_falloff * sev,
        }
    } else {
        let overrun = f64::from(tyre_age - life);
        Wear {
            penalty: degr * f64::from(knee)
                + f64::from(life - knee) * degr * sev
                + overrun * degr * (sev + OVERRUN_EXTRA_SEVERITY),
            puncture_chance: 0.01 + 0.002 * overrun * sev,
        }
    }
}

pub fn weather_penalty(weather: Weather, compound: Compound) -> f64 {
    match (weather, compound) {
        (Weather::Intermediate, c) if c.is_slick() => 10.0,
        (Weather::Intermediate, Compound::Wet) => 3.0,
        (Weather::Wet, c) if c.is_slick() => 20.0,
        _ => 0.0,
    }
}

pub fn safety_adjustment(event: Option<SafetyEvent>) -> f64 {
    match event {
        Some(SafetyEvent::Vsc) => 2.0,
        Some(SafetyEvent::SafetyCar) => 5.0,
        Some(SafetyEvent::RedFlag) | None => 0.0,
    }
}

/// Lap times of a full race plus the laps on which a stop was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub total_time: f64,
    pub lap_times: Vec<f64>,
    pub pit_laps: Vec<u32>,
}

pub struct RaceSimulator<'a> {
    config: &'a RaceConfig,
    table: TyreTable,
}

impl<'a> RaceSimulator<'a> {
    pub fn new(config: &'a RaceConfig) -> Self {
        Self {
            config,
            table: config.tyre_table(),
        }
    }

    pub fn config(&self) -> &RaceConfig {
        self.config
    }

    pub fn table(&self) -> &TyreTable {
        &self.table
    }

    /// Simulates `laps` laps on a fresh set of `compound`, the first of them being
    /// absolute lap `start_lap` (0 is the race start).
    pub fn simulate_stint<R: RandomSource + ?Sized>(
        &self,
        compound: Compound,
        laps: u32,
        start_lap: u32,
        rng: &mut R,
    ) -> Vec<f64> {
        let params = self.table.get(compound);
        let total_laps = self.config.total_laps;

        // flat per-lap surcharge for soft stints run far beyond their life
        let soft_life = self.table.get(Compound::Soft).life_laps;
        let long_soft = if compound == Compound::Soft && laps > soft_life + LONG_SOFT_MARGIN {
            LONG_SOFT_PENALTY * f64::from(laps - soft_life - LONG_SOFT_MARGIN)
        } else {
            0.0
        };
        let weather = weather_penalty(self.config.weather, compound);

        (0..laps)
            .map(|age| {
                let lap = start_lap + age;
                let fuel = FUEL_EFFECT_PER_LAP * (f64::from(total_laps) - f64::from(lap));
                let worn = wear(params, age);
                let warmup = if age < params.warmup_laps { WARMUP_PENALTY } else { 0.0 };
                let noise = rng.normal(0.0, NOISE_STD_DEV);
                let puncture = if rng.chance(worn.puncture_chance) {
                    PUNCTURE_PENALTY
                } else {
                    0.0
                };
                let safety = safety_adjustment(self.config.safety_events.get(lap));
                let start = if lap == 0 { STANDING_START_PENALTY } else { 0.0 };

                let raw = params.base_lap_time
                    + worn.penalty
                    + long_soft
                    + fuel
                    + warmup
                    + noise
                    + puncture
                    + weather
                    + safety
                    + start;
                // floor is the lap count, not a time
                raw.max(f64::from(total_laps))
            })
            .collect()
    }

    /// Runs the stints back to back, charging the pit-stop time to the last lap of
    /// every stint that ends before the flag, then cuts the trace to race length.
    pub fn simulate_race<R: RandomSource + ?Sized>(
        &self,
        strategy: &Strategy,
        rng: &mut R,
    ) -> SimulationResult {
        let total_laps = self.config.total_laps;
        let stints = strategy.stints();
        let mut lap_times = Vec::with_capacity(strategy.total_laps() as usize);
        let mut pit_laps = Vec::new();
        let mut current_lap = 0u32;

        for (i, stint) in stints.iter().enumerate() {
            lap_times.extend(self.simulate_stint(stint.compound, stint.laps, current_lap, rng));
            current_lap += stint.laps;

            if i + 1 < stints.len() && current_lap < total_laps {
                if let Some(last) = lap_times.last_mut() {
                    *last += self.config.pit_stop_time;
                }
                pit_laps.push(current_lap);
            }
        }

        lap_times.truncate(total_laps as usize);
        SimulationResult {
            total_time: lap_times.iter().sum(),
            lap_times,
            pit_laps,
        }
    }
}
