use serde::Serialize;
use std::fmt;

// soft tyre baseline, every other compound is scaled from these
pub const SOFT_DEGRADATION: f64 = 0.11; // s/lap
pub const SOFT_LIFE: u32 = 15; // laps
pub const SOFT_WARMUP: u32 = 2; // laps

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Inter,
    Wet,
}

impl Compound {
    pub const ALL: [Compound; 5] = [
        Compound::Soft,
        Compound::Medium,
        Compound::Hard,
        Compound::Inter,
        Compound::Wet,
    ];

    pub const SLICKS: [Compound; 3] = [Compound::Soft, Compound::Medium, Compound::Hard];

    pub fn is_slick(self) -> bool {
        matches!(self, Compound::Soft | Compound::Medium | Compound::Hard)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Fixed percentages relative to the soft baseline.
    pub fn profile(self) -> &'static CompoundProfile {
        &PROFILES[self.index()]
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compound::Soft => "Soft",
            Compound::Medium => "Medium",
            Compound::Hard => "Hard",
            Compound::Inter => "Inter",
            Compound::Wet => "Wet",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundProfile {
    pub base_pct: f64,
    pub degradation_pct: f64,
    pub life_pct: f64,
    pub warmup_pct: f64,
    pub set_limit: u32,
    pub falloff_severity: f64,
    pub falloff_start_fraction: f64,
}

// ordered like Compound::ALL
static PROFILES: [CompoundProfile; 5] = [
    CompoundProfile {
        base_pct: 1.00,
        degradation_pct: 1.00,
        life_pct: 1.00,
        warmup_pct: 1.00,
        set_limit: 2,
        falloff_severity: 4.0,
        falloff_start_fraction: 0.70,
    },
    CompoundProfile {
        base_pct: 1.0125,
        degradation_pct: 0.70,
        life_pct: 2.00,
        warmup_pct: 1.2,
        set_limit: 2,
        falloff_severity: 2.2,
        falloff_start_fraction: 0.80,
    },
    CompoundProfile {
        base_pct: 1.025,
        degradation_pct: 0.28,
        life_pct: 3.00,
        warmup_pct: 1.3,
        set_limit: 2,
        falloff_severity: 1.0,
        falloff_start_fraction: 0.90,
    },
    CompoundProfile {
        base_pct: 1.06,
        degradation_pct: 0.64,
        life_pct: 1.33,
        warmup_pct: 1.0,
        set_limit: 3,
        falloff_severity: 2.5,
        falloff_start_fraction: 0.80,
    },
    CompoundProfile {
        base_pct: 1.09,
        degradation_pct: 0.82,
        life_pct: 1.33,
        warmup_pct: 1.0,
        set_limit: 3,
        falloff_severity: 2.8,
        falloff_start_fraction: 0.80,
    },
];

/// Absolute parameters of one compound for a given track and baseline pace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TyreParameters {
    pub base_lap_time: f64,
    pub degradation_rate: f64,
    pub life_laps: u32,
    pub warmup_laps: u32,
    pub set_limit: u32,
    pub falloff_severity: f64,
    pub falloff_start_fraction: f64,
}

impl TyreParameters {
    /// Tyre age at which wear switches from linear to accelerated.
    pub fn falloff_knee(&self) -> u32 {
        (self.falloff_start_fraction * f64::from(self.life_laps)).floor() as u32
    }
}

/// Derived parameters for all five compounds. Built once per race and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TyreTable {
    params: [TyreParameters; 5],
}

impl TyreTable {
    pub fn derive(baseline_soft_lap_time: f64, track_degradation_multiplier: f64) -> Self {
        let params = Compound::ALL.map(|compound| {
            let p = compound.profile();
            TyreParameters {
                base_lap_time: baseline_soft_lap_time * p.base_pct,
                degradation_rate: SOFT_DEGRADATION * p.degradation_pct * track_degradation_multiplier,
                life_laps: (f64::from(SOFT_LIFE) * p.life_pct).floor() as u32,
                warmup_laps: (f64::from(SOFT_WARMUP) * p.warmup_pct).floor() as u32,
                set_limit: p.set_limit,
                falloff_severity: p.falloff_severity,
                falloff_start_fraction: p.falloff_start_fraction,
            }
        });
        Self { params }
    }

    pub fn get(&self, compound: Compound) -> &TyreParameters {
        &self.params[compound.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derives_base_times_from_soft_baseline() {
        let table = TyreTable::derive(90.0, 1.0);
        assert!(close(table.get(Compound::Soft).base_lap_time, 90.0));
        assert!(close(table.get(Compound::Medium).base_lap_time, 91.125));
        assert!(close(table.get(Compound::Hard).base_lap_time, 92.25));
        assert!(close(table.get(Compound::Inter).base_lap_time, 95.4));
        assert!(close(table.get(Compound::Wet).base_lap_time, 98.1));
    }

    #[test]
    fn life_and_warmup_are_floored() {
        let table = TyreTable::derive(90.0, 1.0);
        let life: Vec<u32> = Compound::ALL.iter().map(|c| table.get(*c).life_laps).collect();
        assert_eq!(life, vec![15, 30, 45, 19, 19]);
        let warmup: Vec<u32> = Compound::ALL.iter().map(|c| table.get(*c).warmup_laps).collect();
        assert_eq!(warmup, vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn track_multiplier_scales_degradation_only() {
        let normal = TyreTable::derive(85.0, 1.0);
        let harsh = TyreTable::derive(85.0, 2.0);
        for c in Compound::ALL {
            assert!(close(harsh.get(c).degradation_rate, 2.0 * normal.get(c).degradation_rate));
            assert_eq!(harsh.get(c).life_laps, normal.get(c).life_laps);
        }
        assert!(close(normal.get(Compound::Hard).degradation_rate, 0.11 * 0.28));
    }

    #[test]
    fn falloff_knees() {
        let table = TyreTable::derive(85.0, 1.0);
        assert_eq!(table.get(Compound::Soft).falloff_knee(), 10);
        assert_eq!(table.get(Compound::Medium).falloff_knee(), 24);
        assert_eq!(table.get(Compound::Hard).falloff_knee(), 40);
        assert_eq!(table.get(Compound::Inter).falloff_knee(), 15);
    }

    #[test]
    fn set_limits() {
        let table = TyreTable::derive(85.0, 1.0);
        assert_eq!(table.get(Compound::Soft).set_limit, 2);
        assert_eq!(table.get(Compound::Hard).set_limit, 2);
        assert_eq!(table.get(Compound::Wet).set_limit, 3);
    }

    #[test]
    fn life_ordering_holds_for_any_baseline() {
        for base in [60.0, 85.0, 120.5] {
            let t = TyreTable::derive(base, 1.3);
            assert!(t.get(Compound::Hard).life_laps > t.get(Compound::Medium).life_laps);
            assert!(t.get(Compound::Medium).life_laps > t.get(Compound::Soft).life_laps);
            assert_eq!(t.get(Compound::Inter).life_laps, t.get(Compound::Wet).life_laps);
        }
    }
}
