// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// State label used when a voter did not provide one.
pub const UNDETERMINED_STATE: &str = "Undetermined";

/// The youngest age accepted by the ledger.
pub const MINIMUM_VOTING_AGE: u32 = 18;

/// One submission from a voter, as handed over by an intake channel.
///
/// The intake channel is responsible for validating the name and the zip code.
/// The ledger only enforces the voting age and the uniqueness of the identifier.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub candidate: String,
    pub voter_name: String,
    pub age: u32,
    /// `None` or a blank string is recorded as [UNDETERMINED_STATE].
    pub state: Option<String>,
    pub identifier: String,
    pub zip_code: u32,
}

impl Ballot {
    /// The state under which this ballot is counted.
    pub fn normalized_state(&self) -> &str {
        match self.state.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => UNDETERMINED_STATE,
        }
    }
}

// ******** Output data structures *********

/// The three age groups used for demographics.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AgeBracket {
    /// 18 to 30, inclusive.
    Young,
    /// 31 to 60, inclusive.
    Middle,
    /// Above 60.
    Senior,
}

impl AgeBracket {
    /// Returns the bracket for this age, or None for ages below the voting age.
    pub fn classify(age: u32) -> Option<AgeBracket> {
        match age {
            18..=30 => Some(AgeBracket::Young),
            31..=60 => Some(AgeBracket::Middle),
            a if a > 60 => Some(AgeBracket::Senior),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Young => "18-30",
            AgeBracket::Middle => "31-60",
            AgeBracket::Senior => "60+",
        }
    }

    pub const ALL: [AgeBracket; 3] = [AgeBracket::Young, AgeBracket::Middle, AgeBracket::Senior];
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct AgeDemographics {
    pub age_18_to_30: u64,
    pub age_31_to_60: u64,
    pub over_60: u64,
}

impl AgeDemographics {
    pub fn count(&self, bracket: AgeBracket) -> u64 {
        match bracket {
            AgeBracket::Young => self.age_18_to_30,
            AgeBracket::Middle => self.age_31_to_60,
            AgeBracket::Senior => self.over_60,
        }
    }

    pub fn total(&self) -> u64 {
        self.age_18_to_30 + self.age_31_to_60 + self.over_60
    }
}

/// A point-in-time copy of all the counters of a ledger.
///
/// Candidates and states are listed in the order in which they were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub candidate_totals: Vec<(String, u64)>,
    pub age_demographics: AgeDemographics,
    pub state_totals: Vec<(String, Vec<(String, u64)>)>,
    /// Number of identifiers that have voted.
    pub voters: u64,
}

impl LedgerSnapshot {
    pub fn total_votes(&self) -> u64 {
        self.candidate_totals.iter().map(|(_, c)| *c).sum()
    }

    pub fn candidate_total(&self, candidate: &str) -> u64 {
        self.candidate_totals
            .iter()
            .find(|(name, _)| name == candidate)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// The sum of all the candidate counts recorded under this state.
    pub fn state_total(&self, state: &str) -> u64 {
        self.state_totals
            .iter()
            .find(|(name, _)| name == state)
            .map(|(_, tally)| tally.iter().map(|(_, c)| *c).sum())
            .unwrap_or(0)
    }
}

/// Reasons for the ledger to refuse an operation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// This identifier has already been used for a vote.
    DuplicateIdentifier(String),
    /// The voter is below the minimum voting age.
    UnderAge(u32),
    /// A thread panicked while holding the ledger lock.
    LedgerPoisoned,
    /// The live refresh thread could not be started.
    RefreshSpawn(String),
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::DuplicateIdentifier(id) => {
                write!(f, "identifier {} has already voted", id)
            }
            VotingErrors::UnderAge(age) => write!(
                f,
                "voters must be at least {} years old, got {}",
                MINIMUM_VOTING_AGE, age
            ),
            VotingErrors::LedgerPoisoned => write!(f, "the vote ledger is poisoned"),
            VotingErrors::RefreshSpawn(msg) => {
                write!(f, "failed to start the live refresh: {}", msg)
            }
        }
    }
}
