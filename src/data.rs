use crate::simulation::SimulationResult;
use crate::strategy::Strategy;
use crate::tyre::{Compound, TyreTable};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;

// one row per lap of the simulated race, this is what the plotting side reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapRecord {
    pub lap: u32,
    pub stint: usize,
    pub compound: Compound,
    pub tyre_age: u32,
    pub lap_time: f64,
    pub pit: bool,
    #[serde(skip)]
    pub warmup: bool,
}

/// Lines the trace up with the stint that produced each lap. Laps are numbered from 1,
/// matching the pit laps in the result.
pub fn lap_records(
    strategy: &Strategy,
    result: &SimulationResult,
    table: &TyreTable,
) -> Vec<LapRecord> {
    let stint_laps = strategy.stints().iter().enumerate().flat_map(|(i, stint)| {
        let warmup_laps = table.get(stint.compound).warmup_laps;
        (0..stint.laps).map(move |age| (i, stint.compound, age, age < warmup_laps))
    });

    result
        .lap_times
        .iter()
        .zip(stint_laps)
        .enumerate()
        .map(|(idx, (&lap_time, (stint, compound, tyre_age, warmup)))| {
            let lap = idx as u32 + 1;
            LapRecord {
                lap,
                stint,
                compound,
                tyre_age,
                lap_time,
                pit: result.pit_laps.contains(&lap),
                warmup,
            }
        })
        .collect()
}

pub fn write_trace<W: Write>(out: W, records: &[LapRecord]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
