use crate::data::LapRecord;
use crate::tyre::Compound;
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
pub type FittedLinearRegression = linfa_linear::FittedLinearRegression<f64>;

const MIN_LAPS_FOR_FIT: usize = 5;

/// Observed pace trend of one stint.
#[derive(Debug, Clone, PartialEq)]
pub struct StintPace {
    pub stint: usize,
    pub compound: Compound,
    /// Seconds lost per lap of tyre age, fuel burn included.
    pub degradation_per_lap: f64,
    pub intercept: f64,
    pub laps_used: usize,
}

/// Linear fit of lap time against tyre age, one per stint. Pit laps and warm-up
/// laps are left out, they would only drag the line.
pub struct PaceModel {
    stints: Vec<(Compound, Option<FittedLinearRegression>, usize)>,
}

impl PaceModel {
    pub fn new(records: &[LapRecord]) -> Self {
        let stint_count = records.iter().map(|r| r.stint + 1).max().unwrap_or(0);
        let stints = (0..stint_count)
            .filter_map(|stint| {
                let laps: Vec<&LapRecord> = records
                    .iter()
                    .filter(|r| r.stint == stint && !r.pit && !r.warmup && r.lap_time.is_finite())
                    .collect();
                let compound = records.iter().find(|r| r.stint == stint)?.compound;
                Some((compound, Self::build_model(&laps), laps.len()))
            })
            .collect();
        Self { stints }
    }

    fn build_model(laps: &[&LapRecord]) -> Option<FittedLinearRegression> {
        if laps.len() < MIN_LAPS_FOR_FIT {
            return None;
        }
        let ages: Vec<f64> = laps.iter().map(|r| f64::from(r.tyre_age)).collect();
        let times: Vec<f64> = laps.iter().map(|r| r.lap_time).collect();

        let x = Array2::from_shape_vec((laps.len(), 1), ages).ok()?;
        let y = Array1::from_vec(times);
        let ds = Dataset::new(x, y);

        LinearRegression::new().fit(&ds).ok()
    }

    /// Fitted stints only; stints too short to fit are skipped.
    pub fn stints(&self) -> Vec<StintPace> {
        self.stints
            .iter()
            .enumerate()
            .filter_map(|(stint, (compound, model, laps_used))| {
                model.as_ref().map(|m| StintPace {
                    stint,
                    compound: *compound,
                    degradation_per_lap: m.params()[0],
                    intercept: m.intercept(),
                    laps_used: *laps_used,
                })
            })
            .collect()
    }

    pub fn predict(&self, stint: usize, tyre_age: u32) -> Option<f64> {
        let (_, model, _) = self.stints.get(stint)?;
        let model = model.as_ref()?;
        let x = Array2::from_shape_vec((1, 1), vec![f64::from(tyre_age)]).ok()?;
        Some(model.predict(&x)[0])
    }
}

/// Mean lap time, the reference line drawn under the trace.
pub fn average_pace(lap_times: &[f64]) -> Option<f64> {
    Array1::from_vec(lap_times.to_vec()).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaceConfig;
    use crate::data::lap_records;
    use crate::rng::Calm;
    use crate::simulation::RaceSimulator;
    use crate::strategy::Strategy;
    use Compound::*;

    fn record(stint: usize, age: u32, time: f64) -> LapRecord {
        LapRecord {
            lap: age + 1,
            stint,
            compound: Medium,
            tyre_age: age,
            lap_time: time,
            pit: false,
            warmup: false,
        }
    }

    #[test]
    fn recovers_linear_trend() {
        let records: Vec<LapRecord> = (2..12).map(|a| record(0, a, 100.0 + 0.2 * f64::from(a))).collect();
        let model = PaceModel::new(&records);
        let fits = model.stints();
        assert_eq!(fits.len(), 1);
        assert!((fits[0].degradation_per_lap - 0.2).abs() < 1e-6);
        assert!((fits[0].intercept - 100.0).abs() < 1e-6);
        assert_eq!(fits[0].laps_used, 10);
        assert!((model.predict(0, 20).unwrap() - 104.0).abs() < 1e-6);
    }

    #[test]
    fn short_stints_are_not_fitted() {
        let records: Vec<LapRecord> = (0..4).map(|a| record(0, a, 90.0)).collect();
        let model = PaceModel::new(&records);
        assert!(model.stints().is_empty());
        assert_eq!(model.predict(0, 1), None);
        assert_eq!(model.predict(3, 1), None);
    }

    #[test]
    fn simulated_stints_show_wear_net_of_fuel() {
        let cfg = RaceConfig::builder()
            .total_laps(50)
            .baseline_soft_lap_time(90.0)
            .build()
            .unwrap();
        let sim = RaceSimulator::new(&cfg);
        let strategy = Strategy::from(vec![(Medium, 25), (Hard, 25)]);
        let result = sim.simulate_race(&strategy, &mut Calm);
        let records = lap_records(&strategy, &result, sim.table());

        let fits = PaceModel::new(&records).stints();
        assert_eq!(fits.len(), 2);
        // linear wear phase minus 0.03 s/lap of fuel
        assert!((fits[0].degradation_per_lap - (0.11 * 0.70 - 0.03)).abs() < 1e-6);
        assert!((fits[1].degradation_per_lap - (0.11 * 0.28 - 0.03)).abs() < 1e-6);
        assert_eq!(fits[1].compound, Hard);
    }

    #[test]
    fn average_of_trace() {
        assert_eq!(average_pace(&[90.0, 92.0, 94.0]), Some(92.0));
        assert_eq!(average_pace(&[]), None);
    }
}
