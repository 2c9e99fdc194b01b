use crate::model::{average_pace, StintPace};
use crate::search::SearchOutcome;
use std::io::{self, Write};

pub fn print_leaderboard<W: Write>(out: &mut W, outcome: &SearchOutcome) -> io::Result<()> {
    writeln!(out, "\nTop {} Strategies:", outcome.leaderboard().len())?;
    for (i, ranked) in outcome.leaderboard().iter().enumerate() {
        writeln!(
            out,
            "{}: Time = {:.2}s, Strategy = {}",
            i + 1,
            ranked.total_time,
            ranked.strategy
        )?;
    }
    Ok(())
}

pub fn print_best<W: Write>(out: &mut W, outcome: &SearchOutcome, pace: &[StintPace]) -> io::Result<()> {
    let best = outcome.best();
    writeln!(out, "\nBest Strategy: {}", best.strategy)?;
    writeln!(out, "Total Race Time: {:.2}s", best.total_time)?;
    writeln!(out, "Pit stops on laps: {:?}", best.result.pit_laps)?;
    if let Some(avg) = average_pace(&best.result.lap_times) {
        writeln!(out, "Average pace: {:.3}s", avg)?;
    }
    for stint in pace {
        writeln!(
            out,
            "- Stint {} ({}): {:+.3} s/lap over {} laps",
            stint.stint + 1,
            stint.compound,
            stint.degradation_per_lap,
            stint.laps_used
        )?;
    }
    writeln!(
        out,
        "({} strategies evaluated, {} rejected)",
        outcome.evaluated, outcome.rejected
    )
}
