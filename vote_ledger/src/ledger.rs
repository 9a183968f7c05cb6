use std::{
    collections::{HashMap, HashSet},
    ops::AddAssign,
};

use crate::config::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub(crate) struct VoteCount(pub(crate) u64);

impl VoteCount {
    const ONE: VoteCount = VoteCount(1);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// A tally that remembers the order in which the keys were first seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderedTally {
    index: HashMap<String, usize>,
    entries: Vec<(String, VoteCount)>,
}

impl OrderedTally {
    pub(crate) fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += VoteCount::ONE,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), VoteCount::ONE));
            }
        }
    }

    pub(crate) fn total(&self) -> VoteCount {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    fn to_pairs(&self) -> Vec<(String, u64)> {
        self.entries
            .iter()
            .map(|(name, c)| (name.clone(), c.0))
            .collect()
    }
}

/// The aggregate counters of an election.
///
/// The store does not check anything: callers must hold the ledger lock and
/// only apply ballots that passed the registration checks.
#[derive(Debug, Default)]
pub(crate) struct LedgerStore {
    candidate_totals: OrderedTally,
    consumed_identifiers: HashSet<String>,
    // Outer order: first vote in the state. Inner order: first vote for the candidate in that state.
    state_index: HashMap<String, usize>,
    state_totals: Vec<(String, OrderedTally)>,
    age_18_to_30: VoteCount,
    age_31_to_60: VoteCount,
    over_60: VoteCount,
}

impl LedgerStore {
    pub(crate) fn contains(&self, identifier: &str) -> bool {
        self.consumed_identifiers.contains(identifier)
    }

    pub(crate) fn voters(&self) -> u64 {
        self.consumed_identifiers.len() as u64
    }

    /// Records one accepted vote in every counter.
    pub(crate) fn apply(
        &mut self,
        candidate: &str,
        bracket: AgeBracket,
        state: &str,
        identifier: &str,
    ) {
        self.candidate_totals.increment(candidate);
        match bracket {
            AgeBracket::Young => self.age_18_to_30 += VoteCount::ONE,
            AgeBracket::Middle => self.age_31_to_60 += VoteCount::ONE,
            AgeBracket::Senior => self.over_60 += VoteCount::ONE,
        }
        let pos = match self.state_index.get(state) {
            Some(&pos) => pos,
            None => {
                self.state_index
                    .insert(state.to_string(), self.state_totals.len());
                self.state_totals
                    .push((state.to_string(), OrderedTally::default()));
                self.state_totals.len() - 1
            }
        };
        self.state_totals[pos].1.increment(candidate);
        self.consumed_identifiers.insert(identifier.to_string());
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            candidate_totals: self.candidate_totals.to_pairs(),
            age_demographics: AgeDemographics {
                age_18_to_30: self.age_18_to_30.0,
                age_31_to_60: self.age_31_to_60.0,
                over_60: self.over_60.0,
            },
            state_totals: self
                .state_totals
                .iter()
                .map(|(state, tally)| (state.clone(), tally.to_pairs()))
                .collect(),
            voters: self.voters(),
        }
    }

    /// Checks the cross-counter invariants. Only used by debug assertions and tests.
    pub(crate) fn is_consistent(&self) -> bool {
        let voters = VoteCount(self.voters());
        let brackets = VoteCount(self.age_18_to_30.0 + self.age_31_to_60.0 + self.over_60.0);
        let by_state: VoteCount = self.state_totals.iter().map(|(_, t)| t.total()).sum();
        self.candidate_totals.total() == voters && brackets == voters && by_state == voters
    }
}
