/*!
A concurrent, in-memory vote ledger for mock elections.

The ledger deduplicates voters by identifier and keeps running totals per
candidate, per age bracket and per state. It can be shared between the
threads that register votes and a background task that refreshes a live
report.

```
use vote_ledger::{Ballot, ReportStyle, VoteLedger};

let ledger = VoteLedger::new();
let ballot = Ballot {
    candidate: "Alice".to_string(),
    voter_name: "Bob".to_string(),
    age: 25,
    state: None,
    identifier: "id1".to_string(),
    zip_code: 10000,
};
assert!(ledger.cast_vote(&ballot));
// The same identifier cannot vote twice.
assert!(!ledger.cast_vote(&ballot));

let report = ledger.render_with(ReportStyle::PlainText)?;
assert!(report.contains("Candidate: Alice, Total number of votes: 1"));
assert!(report.contains("State: Undetermined, Total votes: 1"));
# Ok::<(), vote_ledger::VotingErrors>(())
```
*/

mod config;
mod ledger;
pub mod live;
pub mod report;

use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard};

pub use crate::config::*;
use crate::ledger::LedgerStore;
pub use crate::report::{render_snapshot, ReportStyle};

/// The registration engine of an election.
///
/// All the counters sit behind a single lock: registering a vote and taking a
/// snapshot are both atomic with respect to each other.
#[derive(Debug, Default)]
pub struct VoteLedger {
    store: Mutex<LedgerStore>,
}

impl VoteLedger {
    pub fn new() -> VoteLedger {
        VoteLedger {
            store: Mutex::new(LedgerStore::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerStore>, VotingErrors> {
        self.store.lock().map_err(|_| VotingErrors::LedgerPoisoned)
    }

    /// Registers a vote.
    ///
    /// Returns false if the vote was rejected, in which case the ledger is left
    /// untouched. See [VoteLedger::try_cast_vote] for the reason of the rejection.
    pub fn cast_vote(&self, ballot: &Ballot) -> bool {
        self.try_cast_vote(ballot).is_ok()
    }

    /// Registers a vote, or explains why it was rejected.
    ///
    /// The checks and the updates happen in one critical section: two concurrent
    /// calls with the same identifier cannot both succeed.
    pub fn try_cast_vote(&self, ballot: &Ballot) -> Result<(), VotingErrors> {
        let state = ballot.normalized_state();

        let mut store = self.lock()?;
        // A reused identifier is a duplicate, whatever the rest of the ballot says.
        if store.contains(&ballot.identifier) {
            debug!(
                "try_cast_vote: rejecting duplicate identifier {:?}",
                ballot.identifier
            );
            return Err(VotingErrors::DuplicateIdentifier(ballot.identifier.clone()));
        }
        let bracket =
            AgeBracket::classify(ballot.age).ok_or(VotingErrors::UnderAge(ballot.age))?;
        store.apply(&ballot.candidate, bracket, state, &ballot.identifier);
        debug_assert!(store.is_consistent());
        info!(
            "Vote registered for {} (state: {}, bracket: {}, zip code: {})",
            ballot.candidate,
            state,
            bracket.label(),
            ballot.zip_code
        );
        Ok(())
    }

    /// Tells if this identifier has already voted.
    ///
    /// The answer may be outdated as soon as it is returned. It is only meant to
    /// stop an intake form early; [VoteLedger::cast_vote] performs the real check.
    pub fn has_already_voted(&self, identifier: &str) -> bool {
        match self.lock() {
            Ok(store) => store.contains(identifier),
            Err(e) => {
                warn!("has_already_voted({:?}): {}", identifier, e);
                false
            }
        }
    }

    pub fn voter_count(&self) -> Result<u64, VotingErrors> {
        Ok(self.lock()?.voters())
    }

    /// A consistent copy of all the counters.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, VotingErrors> {
        Ok(self.lock()?.snapshot())
    }

    /// The current results, in the markup style.
    pub fn render(&self) -> Result<String, VotingErrors> {
        self.render_with(ReportStyle::Markup)
    }

    pub fn render_with(&self, style: ReportStyle) -> Result<String, VotingErrors> {
        let snapshot = self.snapshot()?;
        Ok(render_snapshot(&snapshot, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ballot(candidate: &str, age: u32, state: &str, id: &str) -> Ballot {
        Ballot {
            candidate: candidate.to_string(),
            voter_name: "Bob".to_string(),
            age,
            state: Some(state.to_string()),
            identifier: id.to_string(),
            zip_code: 10000,
        }
    }

    #[test]
    fn first_vote_with_blank_state() {
        init();
        let ledger = VoteLedger::new();
        assert!(ledger.cast_vote(&ballot("Alice", 25, "", "id1")));

        let snap = ledger.snapshot().unwrap();
        assert_eq!(snap.candidate_total("Alice"), 1);
        assert_eq!(snap.age_demographics.age_18_to_30, 1);
        assert_eq!(snap.state_total(UNDETERMINED_STATE), 1);

        let report = ledger.render().unwrap();
        assert!(report.contains("Candidate: Alice, Total number of votes: 1"));
        assert!(report.contains("18-30: 1"));
        assert!(report.contains("State: Undetermined, Total votes: 1"));
    }

    #[test]
    fn missing_and_whitespace_states_are_undetermined() {
        let ledger = VoteLedger::new();
        let mut b = ballot("Alice", 40, "", "id1");
        b.state = None;
        assert!(ledger.cast_vote(&b));
        assert!(ledger.cast_vote(&ballot("Alice", 40, "   ", "id2")));
        let snap = ledger.snapshot().unwrap();
        assert_eq!(snap.state_totals.len(), 1);
        assert_eq!(snap.state_total(UNDETERMINED_STATE), 2);
    }

    #[test]
    fn duplicate_identifier_leaves_ledger_unchanged() {
        init();
        let ledger = VoteLedger::new();
        assert!(ledger.cast_vote(&ballot("Alice", 25, "", "id1")));
        let before = ledger.snapshot().unwrap();

        // Different content, same identifier.
        assert!(!ledger.cast_vote(&ballot("Bob", 70, "Germany", "id1")));
        assert_eq!(
            ledger.try_cast_vote(&ballot("Alice", 25, "", "id1")),
            Err(VotingErrors::DuplicateIdentifier("id1".to_string()))
        );
        assert_eq!(ledger.snapshot().unwrap(), before);
    }

    #[test]
    fn two_seniors_in_the_same_state() {
        let ledger = VoteLedger::new();
        assert!(ledger.cast_vote(&ballot("Alice", 65, "Germany", "id2")));
        assert!(ledger.cast_vote(&ballot("Bob", 65, "Germany", "id3")));
        let snap = ledger.snapshot().unwrap();
        assert_eq!(snap.state_total("Germany"), 2);
        assert_eq!(snap.age_demographics.over_60, 2);
    }

    #[test]
    fn bracket_boundaries() {
        let ledger = VoteLedger::new();
        let expected = [
            (18, AgeBracket::Young),
            (30, AgeBracket::Young),
            (31, AgeBracket::Middle),
            (60, AgeBracket::Middle),
            (61, AgeBracket::Senior),
        ];
        for (idx, (age, bracket)) in expected.iter().enumerate() {
            let before = ledger.snapshot().unwrap().age_demographics;
            assert!(ledger.cast_vote(&ballot("Alice", *age, "Slovakia", &format!("b{}", idx))));
            let after = ledger.snapshot().unwrap().age_demographics;
            for b in AgeBracket::ALL {
                let delta = after.count(b) - before.count(b);
                assert_eq!(delta, u64::from(b == *bracket), "age {} bracket {:?}", age, b);
            }
        }
    }

    #[test]
    fn under_age_is_rejected_without_mutation() {
        let ledger = VoteLedger::new();
        assert_eq!(
            ledger.try_cast_vote(&ballot("Alice", 17, "Germany", "kid")),
            Err(VotingErrors::UnderAge(17))
        );
        assert!(!ledger.has_already_voted("kid"));
        assert_eq!(ledger.snapshot().unwrap(), LedgerSnapshot::default());
        // The identifier was not consumed.
        assert!(ledger.cast_vote(&ballot("Alice", 18, "Germany", "kid")));
    }

    #[test]
    fn reused_identifier_is_a_duplicate_even_under_age() {
        let ledger = VoteLedger::new();
        assert!(ledger.cast_vote(&ballot("Alice", 30, "Germany", "x")));
        let before = ledger.snapshot().unwrap();
        assert_eq!(
            ledger.try_cast_vote(&ballot("Bob", 16, "Germany", "x")),
            Err(VotingErrors::DuplicateIdentifier("x".to_string()))
        );
        assert_eq!(ledger.snapshot().unwrap(), before);
    }

    #[test]
    fn poisoned_ledger_refuses_votes() {
        init();
        let ledger = Arc::new(VoteLedger::new());
        assert!(ledger.cast_vote(&ballot("Alice", 30, "Germany", "id1")));
        let l = Arc::clone(&ledger);
        let res = thread::spawn(move || {
            let _guard = l.store.lock().unwrap();
            panic!("writer died while holding the lock");
        })
        .join();
        assert!(res.is_err());

        assert!(!ledger.has_already_voted("id1"));
        assert_eq!(
            ledger.try_cast_vote(&ballot("Alice", 30, "Germany", "id2")),
            Err(VotingErrors::LedgerPoisoned)
        );
        assert_eq!(ledger.render(), Err(VotingErrors::LedgerPoisoned));
    }

    #[test]
    fn totals_match_number_of_distinct_voters() {
        let ledger = VoteLedger::new();
        let candidates = ["Ivan Prvy", "Alexander Pekny", "Clara"];
        let states = ["Slovakia", "", "Czechia", "Austria"];
        let n = 50;
        for i in 0..n {
            let b = ballot(candidates[i % 3], 18 + (i as u32 * 7) % 80, states[i % 4], &format!("v{}", i));
            assert!(ledger.cast_vote(&b));
        }
        let snap = ledger.snapshot().unwrap();
        assert_eq!(snap.total_votes(), n as u64);
        assert_eq!(snap.voters, n as u64);
        assert_eq!(snap.age_demographics.total(), n as u64);
        let by_state: u64 = snap
            .state_totals
            .iter()
            .map(|(s, _)| snap.state_total(s))
            .sum();
        assert_eq!(by_state, n as u64);
        assert_eq!(ledger.voter_count().unwrap(), n as u64);
    }

    #[test]
    fn report_order_is_first_seen_order() {
        let ledger = VoteLedger::new();
        assert!(ledger.cast_vote(&ballot("Zed", 20, "Poland", "1")));
        assert!(ledger.cast_vote(&ballot("Anna", 20, "Austria", "2")));
        assert!(ledger.cast_vote(&ballot("Zed", 20, "Austria", "3")));
        let report = ledger.render_with(ReportStyle::PlainText).unwrap();
        let zed = report.find("Candidate: Zed").unwrap();
        let anna = report.find("Candidate: Anna").unwrap();
        assert!(zed < anna);
        let poland = report.find("State: Poland").unwrap();
        let austria = report.find("State: Austria, Total votes: 2").unwrap();
        assert!(poland < austria);
    }

    #[test]
    fn concurrent_distinct_voters_are_all_counted() {
        init();
        let ledger = Arc::new(VoteLedger::new());
        let n = 64;
        let barrier = Arc::new(Barrier::new(n));
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let cand = if i % 2 == 0 { "Alice" } else { "Bob" };
                    ledger.cast_vote(&ballot(cand, 18 + i as u32, "Germany", &format!("id{}", i)))
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, n);
        let snap = ledger.snapshot().unwrap();
        assert_eq!(snap.total_votes(), n as u64);
        assert_eq!(snap.voters, n as u64);
        assert_eq!(snap.age_demographics.total(), n as u64);
        assert_eq!(snap.state_total("Germany"), n as u64);
    }

    #[test]
    fn concurrent_same_identifier_is_accepted_once() {
        let ledger = Arc::new(VoteLedger::new());
        let n = 32;
        let barrier = Arc::new(Barrier::new(n));
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ledger.cast_vote(&ballot("Alice", 44, "Hungary", "shared"))
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(ledger.snapshot().unwrap().total_votes(), 1);
    }

    #[test]
    fn snapshots_taken_during_writes_are_consistent() {
        let ledger = Arc::new(VoteLedger::new());
        let writer = {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..500 {
                    ledger.cast_vote(&ballot("Alice", 35, "Slovakia", &format!("w{}", i)));
                }
            })
        };
        for _ in 0..200 {
            let snap = ledger.snapshot().unwrap();
            assert_eq!(snap.total_votes(), snap.voters);
            assert_eq!(snap.age_demographics.total(), snap.voters);
            assert_eq!(snap.state_total("Slovakia"), snap.voters);
        }
        writer.join().unwrap();
        assert_eq!(ledger.voter_count().unwrap(), 500);
    }
}
