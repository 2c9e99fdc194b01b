use crate::config::Weather;
use crate::tyre::{Compound, TyreTable};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A contiguous run of laps on one compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stint {
    pub compound: Compound,
    pub laps: u32,
}

impl Stint {
    pub fn new(compound: Compound, laps: u32) -> Self {
        Self { compound, laps }
    }
}

/// Ordered stints covering a race. Built by the search, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Strategy {
    stints: Vec<Stint>,
}

impl Strategy {
    pub fn new(stints: Vec<Stint>) -> Self {
        Self { stints }
    }

    pub fn stints(&self) -> &[Stint] {
        &self.stints
    }

    pub fn stops(&self) -> usize {
        self.stints.len().saturating_sub(1)
    }

    pub fn total_laps(&self) -> u32 {
        self.stints.iter().map(|s| s.laps).sum()
    }

    /// Number of stints run on each compound.
    pub fn usage(&self) -> BTreeMap<Compound, u32> {
        let mut usage = BTreeMap::new();
        for stint in &self.stints {
            *usage.entry(stint.compound).or_insert(0) += 1;
        }
        usage
    }
}

impl From<Vec<(Compound, u32)>> for Strategy {
    fn from(stints: Vec<(Compound, u32)>) -> Self {
        Self::new(stints.into_iter().map(|(c, l)| Stint::new(c, l)).collect())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, stint) in self.stints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", stint.compound, stint.laps)?;
        }
        write!(f, "]")
    }
}

/// In the dry at least two different slick compounds must be used.
pub fn is_compound_mix_valid(strategy: &Strategy, weather: Weather) -> bool {
    if weather != Weather::Dry {
        return true;
    }
    let slicks: BTreeSet<Compound> = strategy
        .stints()
        .iter()
        .map(|s| s.compound)
        .filter(|c| c.is_slick())
        .collect();
    slicks.len() >= 2
}

/// No compound may be fitted more often than its allocation of sets.
pub fn is_set_usage_valid(strategy: &Strategy, table: &TyreTable) -> bool {
    strategy
        .usage()
        .into_iter()
        .all(|(compound, count)| count <= table.get(compound).set_limit)
}

pub fn is_legal(strategy: &Strategy, weather: Weather, table: &TyreTable) -> bool {
    is_compound_mix_valid(strategy, weather) && is_set_usage_valid(strategy, table)
}
