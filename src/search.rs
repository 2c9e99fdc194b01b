use crate::config::{RaceConfig, Weather};
use crate::error::SearchError;
use crate::rng::RandomSource;
use crate::simulation::{RaceSimulator, SimulationResult};
use crate::strategy::{is_legal, Stint, Strategy};
use crate::tyre::{Compound, TyreTable};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use tracing::{debug, info};

/// How many strategies the search hands back.
pub const TOP_STRATEGIES: usize = 5;
/// Size of the extended view printed by the report.
pub const LEADERBOARD_SIZE: usize = 10;

// first-stint window around the anchor compound's life
const WINDOW_HALF_WIDTH: u32 = 5;
const THREE_STINT_FIRST_MIN: u32 = 10;
const THREE_STINT_FIRST_MARGIN: u32 = 20;
const THREE_STINT_GAP: u32 = 5;
const THREE_STINT_LAST_MARGIN: u32 = 5;

pub fn permitted_compounds(weather: Weather) -> &'static [Compound] {
    match weather {
        Weather::Dry => &Compound::SLICKS,
        Weather::Intermediate => &[Compound::Inter],
        Weather::Wet => &[Compound::Wet],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Two stints, stop placed around the anchor compound's life.
    TwoStintWindow,
    /// Three stints over every pair of increasing stop laps.
    ThreeStint,
    /// Two stints, stop anywhere in the race.
    TwoStintFull,
}

impl Pass {
    pub const ALL: [Pass; 3] = [Pass::TwoStintWindow, Pass::ThreeStint, Pass::TwoStintFull];

    /// Lazily yields this pass's candidates for a race of `total_laps`.
    pub fn candidates<'a>(
        self,
        total_laps: u32,
        compounds: &'a [Compound],
        table: &'a TyreTable,
    ) -> Box<dyn Iterator<Item = Strategy> + 'a> {
        match self {
            Pass::TwoStintWindow => Box::new(two_stint_window(total_laps, compounds, table)),
            Pass::ThreeStint => Box::new(three_stint(total_laps, compounds)),
            Pass::TwoStintFull => Box::new(two_stint_full(total_laps, compounds)),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::TwoStintWindow => "two-stint window",
            Pass::ThreeStint => "three-stint",
            Pass::TwoStintFull => "two-stint full range",
        };
        f.write_str(name)
    }
}

fn ordered_pairs(compounds: &[Compound]) -> impl Iterator<Item = (Compound, Compound)> + '_ {
    compounds
        .iter()
        .flat_map(move |&c1| compounds.iter().map(move |&c2| (c1, c2)))
}

fn two_stint_window<'a>(
    total_laps: u32,
    compounds: &'a [Compound],
    table: &'a TyreTable,
) -> impl Iterator<Item = Strategy> + 'a {
    // the last permitted compound anchors the window
    let anchor_life = compounds.last().map_or(0, |c| table.get(*c).life_laps);
    let first = anchor_life.saturating_sub(WINDOW_HALF_WIDTH).max(1);
    let last = anchor_life + WINDOW_HALF_WIDTH;

    ordered_pairs(compounds).flat_map(move |(c1, c2)| {
        let second_life = table.get(c2).life_laps;
        (first..=last)
            .filter(move |&split| split < total_laps)
            .filter(move |&split| total_laps - split <= second_life)
            .map(move |split| {
                Strategy::new(vec![Stint::new(c1, split), Stint::new(c2, total_laps - split)])
            })
    })
}

fn three_stint(total_laps: u32, compounds: &[Compound]) -> impl Iterator<Item = Strategy> + '_ {
    let first_end = total_laps.saturating_sub(THREE_STINT_FIRST_MARGIN);
    let second_end = total_laps.saturating_sub(THREE_STINT_LAST_MARGIN);

    ordered_pairs(compounds)
        .flat_map(move |(c1, c2)| compounds.iter().map(move |&c3| (c1, c2, c3)))
        .flat_map(move |(c1, c2, c3)| {
            (THREE_STINT_FIRST_MIN..first_end).flat_map(move |split1| {
                (split1 + THREE_STINT_GAP..second_end).map(move |split2| {
                    Strategy::new(vec![
                        Stint::new(c1, split1),
                        Stint::new(c2, split2 - split1),
                        Stint::new(c3, total_laps - split2),
                    ])
                })
            })
        })
}

fn two_stint_full(total_laps: u32, compounds: &[Compound]) -> impl Iterator<Item = Strategy> + '_ {
    ordered_pairs(compounds).flat_map(move |(c1, c2)| {
        (1..total_laps).map(move |split| {
            Strategy::new(vec![Stint::new(c1, split), Stint::new(c2, total_laps - split)])
        })
    })
}

/// Whether the three-stint stop ranges leave any room at this race length.
pub fn three_stint_fits(total_laps: u32) -> bool {
    total_laps > THREE_STINT_FIRST_MIN + THREE_STINT_FIRST_MARGIN
}

/// A scored candidate, kept together with the trace it was scored on.
#[derive(Debug, Clone)]
pub struct RankedStrategy {
    pub total_time: f64,
    pub strategy: Strategy,
    pub result: SimulationResult,
    pub pass: Pass,
}

struct Entry {
    seq: u64,
    ranked: RankedStrategy,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// By time, then arrival order. The heap top is the slowest and, among equals,
/// the latest entry: the one to evict.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranked
            .total_time
            .total_cmp(&other.ranked.total_time)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Keeps the `capacity` fastest candidates seen so far.
pub struct TopK {
    capacity: usize,
    seq: u64,
    heap: BinaryHeap<Entry>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seq: 0,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, ranked: RankedStrategy) {
        let entry = Entry {
            seq: self.seq,
            ranked,
        };
        self.seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(entry);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if entry < *worst {
                *worst = entry;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Fastest first.
    pub fn into_sorted_vec(self) -> Vec<RankedStrategy> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|e| e.ranked)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    ranked: Vec<RankedStrategy>,
    pub evaluated: usize,
    pub rejected: usize,
}

impl SearchOutcome {
    pub fn best(&self) -> &RankedStrategy {
        // constructed only with at least one entry
        &self.ranked[0]
    }

    pub fn top(&self, n: usize) -> &[RankedStrategy] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    pub fn top_five(&self) -> &[RankedStrategy] {
        self.top(TOP_STRATEGIES)
    }

    pub fn leaderboard(&self) -> &[RankedStrategy] {
        self.top(LEADERBOARD_SIZE)
    }
}

/// Enumerates all three passes, scores every legal candidate and ranks them by
/// total race time. All passes feed one collector; ranking happens once at the end.
pub fn search_strategies<R: RandomSource + ?Sized>(
    config: &RaceConfig,
    rng: &mut R,
) -> Result<SearchOutcome, SearchError> {
    let sim = RaceSimulator::new(config);
    let table = sim.table();
    let compounds = permitted_compounds(config.weather);
    let mut top = TopK::new(LEADERBOARD_SIZE);
    let mut evaluated = 0;
    let mut rejected = 0;

    info!(
        laps = config.total_laps,
        weather = %config.weather,
        compounds = ?compounds,
        "searching strategies"
    );

    for pass in Pass::ALL {
        if pass == Pass::ThreeStint && !three_stint_fits(config.total_laps) {
            debug!(laps = config.total_laps, "race too short for three stints, skipping pass");
            continue;
        }

        let (mut pass_evaluated, mut pass_rejected) = (0usize, 0usize);
        for strategy in pass.candidates(config.total_laps, compounds, table) {
            if !is_legal(&strategy, config.weather, table) {
                pass_rejected += 1;
                continue;
            }
            let result = sim.simulate_race(&strategy, rng);
            top.push(RankedStrategy {
                total_time: result.total_time,
                strategy,
                result,
                pass,
            });
            pass_evaluated += 1;
        }

        debug!(%pass, evaluated = pass_evaluated, rejected = pass_rejected, "pass done");
        evaluated += pass_evaluated;
        rejected += pass_rejected;
    }

    if top.is_empty() {
        return Err(SearchError::NoValidStrategy {
            total_laps: config.total_laps,
            weather: config.weather,
        });
    }

    let ranked = top.into_sorted_vec();
    info!(
        evaluated,
        rejected,
        best_time = ranked[0].total_time,
        best = %ranked[0].strategy,
        "search finished"
    );

    Ok(SearchOutcome {
        ranked,
        evaluated,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Calm, SeededRandom};
    use Compound::*;

    fn dry(laps: u32) -> RaceConfig {
        RaceConfig::builder()
            .total_laps(laps)
            .pit_stop_time(20.0)
            .baseline_soft_lap_time(90.0)
            .build()
            .unwrap()
    }

    fn ranked(time: f64) -> RankedStrategy {
        RankedStrategy {
            total_time: time,
            strategy: Strategy::from(vec![(Soft, 1), (Hard, 1)]),
            result: SimulationResult {
                total_time: time,
                lap_times: vec![time],
                pit_laps: vec![],
            },
            pass: Pass::TwoStintFull,
        }
    }

    #[test]
    fn top_k_keeps_fastest_sorted() {
        let mut top = TopK::new(3);
        for t in [5.0, 1.0, 9.0, 3.0, 2.0, 7.0] {
            top.push(ranked(t));
        }
        assert_eq!(top.len(), 3);
        let times: Vec<f64> = top.into_sorted_vec().iter().map(|r| r.total_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn top_k_prefers_earlier_on_ties() {
        let mut top = TopK::new(1);
        let mut first = ranked(4.0);
        first.pass = Pass::TwoStintWindow;
        top.push(first);
        top.push(ranked(4.0));
        assert_eq!(top.into_sorted_vec()[0].pass, Pass::TwoStintWindow);
    }

    #[test]
    fn permitted_sets_follow_weather() {
        assert_eq!(permitted_compounds(Weather::Dry), &[Soft, Medium, Hard]);
        assert_eq!(permitted_compounds(Weather::Intermediate), &[Inter]);
        assert_eq!(permitted_compounds(Weather::Wet), &[Wet]);
    }

    #[test]
    fn window_pass_anchors_on_last_compound() {
        let table = TyreTable::derive(90.0, 1.0);
        let all: Vec<Strategy> =
            Pass::TwoStintWindow.candidates(50, permitted_compounds(Weather::Dry), &table).collect();
        // hard life 45: splits 40..=49 for each of 9 pairs
        assert_eq!(all.len(), 90);
        assert!(all.iter().all(|s| s.total_laps() == 50));
        assert!(all.iter().all(|s| (40..50).contains(&s.stints()[0].laps)));
    }

    #[test]
    fn window_pass_respects_second_stint_life() {
        let table = TyreTable::derive(90.0, 1.0);
        let all: Vec<Strategy> =
            Pass::TwoStintWindow.candidates(70, permitted_compounds(Weather::Dry), &table).collect();
        for s in &all {
            let second = s.stints()[1];
            assert!(second.laps <= table.get(second.compound).life_laps);
        }
        // soft second stints need split >= 55, outside 40..=50
        assert!(all.iter().all(|s| s.stints()[1].compound != Soft));
    }

    #[test]
    fn three_stint_ranges() {
        let all: Vec<Strategy> = three_stint(50, &[Hard]).collect();
        assert_eq!(all.len(), 410);
        for s in &all {
            let laps: Vec<u32> = s.stints().iter().map(|st| st.laps).collect();
            assert!(laps[0] >= 10 && laps[1] >= 5 && laps[2] >= 6);
            assert_eq!(s.total_laps(), 50);
        }
        assert!(!three_stint_fits(30));
        assert!(three_stint_fits(31));
        assert_eq!(three_stint(30, &[Hard]).count(), 0);
    }

    #[test]
    fn full_pass_covers_every_split() {
        let all: Vec<Strategy> = two_stint_full(10, &[Medium, Hard]).collect();
        assert_eq!(all.len(), 4 * 9);
        let splits: Vec<u32> = all.iter().take(9).map(|s| s.stints()[0].laps).collect();
        assert_eq!(splits, (1..10).collect::<Vec<_>>());
    }

    #[test]
    fn dry_search_counts() {
        let outcome = search_strategies(&dry(50), &mut Calm).unwrap();
        assert_eq!(outcome.evaluated, 60 + 9840 + 294);
        assert_eq!(outcome.rejected, 30 + 1230 + 147);
    }

    #[test]
    fn dry_search_ranks_legal_full_length_strategies() {
        let cfg = dry(50);
        let table = cfg.tyre_table();
        let outcome = search_strategies(&cfg, &mut SeededRandom::new(11)).unwrap();

        let board = outcome.leaderboard();
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert_eq!(outcome.top_five().len(), TOP_STRATEGIES);
        assert!(board.windows(2).all(|w| w[0].total_time <= w[1].total_time));
        for r in board {
            assert!(is_legal(&r.strategy, Weather::Dry, &table));
            assert_eq!(r.strategy.total_laps(), 50);
            assert_eq!(r.result.lap_times.len(), 50);
            assert_eq!(r.total_time, r.result.total_time);
        }
        assert_eq!(outcome.best().total_time, board[0].total_time);
    }

    #[test]
    fn wet_search_uses_full_wets_only() {
        let cfg = RaceConfig::builder()
            .total_laps(40)
            .weather(Weather::Wet)
            .build()
            .unwrap();
        let outcome = search_strategies(&cfg, &mut SeededRandom::new(5)).unwrap();
        for r in outcome.leaderboard() {
            assert!(r.strategy.stints().iter().all(|s| s.compound == Wet));
        }
    }

    #[test]
    fn short_race_skips_three_stints() {
        let outcome = search_strategies(&dry(30), &mut Calm).unwrap();
        // only the full-range pass yields: 6 mixed pairs x 29 splits
        assert_eq!(outcome.evaluated, 174);
        assert!(outcome.leaderboard().iter().all(|r| r.pass == Pass::TwoStintFull));
    }

    #[test]
    fn one_lap_race_has_no_strategy() {
        let err = search_strategies(&dry(1), &mut Calm).unwrap_err();
        assert!(matches!(
            err,
            SearchError::NoValidStrategy { total_laps: 1, weather: Weather::Dry }
        ));
    }

    #[test]
    fn seeded_search_is_reproducible() {
        let cfg = dry(45);
        let a = search_strategies(&cfg, &mut SeededRandom::new(2024)).unwrap();
        let b = search_strategies(&cfg, &mut SeededRandom::new(2024)).unwrap();
        assert_eq!(a.best().strategy, b.best().strategy);
        assert_eq!(a.best().total_time, b.best().total_time);
    }
}
