//! Quorum primitives shared by airline admission, gate voting and oracle rounds

use flightsurety_common::Account;
use std::collections::BTreeSet;

/// Whether `votes` form a majority of `electorate`
///
/// Half of the electorate is enough: 2 of 4, 3 of 5, 3 of 6.
#[inline]
pub fn majority_reached(votes: usize, electorate: usize) -> bool {
    votes.saturating_mul(2) >= electorate
}

/// Smallest vote count satisfying [`majority_reached`]
#[inline]
pub fn required_majority(electorate: usize) -> usize {
    electorate.div_ceil(2)
}

/// Set of distinct voters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    voters: BTreeSet<Account>,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote; `false` if the voter already voted
    pub fn cast(&mut self, voter: &Account) -> bool {
        self.voters.insert(voter.clone())
    }

    pub fn has_voted(&self, voter: &Account) -> bool {
        self.voters.contains(voter)
    }

    pub fn count(&self) -> usize {
        self.voters.len()
    }

    pub fn into_voters(self) -> BTreeSet<Account> {
        self.voters
    }
}

/// Fixed-count quorum for oracle rounds (e.g. 3 matching responses)
#[derive(Debug, Clone, Copy)]
pub struct QuorumManager {
    threshold: usize,
}

impl QuorumManager {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_reached(&self, matching: usize) -> bool {
        matching >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_majority_examples() {
        assert!(!majority_reached(1, 4));
        assert!(majority_reached(2, 4));
        assert!(!majority_reached(2, 5));
        assert!(majority_reached(3, 5));
        assert_eq!(required_majority(4), 2);
        assert_eq!(required_majority(5), 3);
    }

    #[test]
    fn test_ballot_rejects_double_votes() {
        let mut ballot = Ballot::new();
        let voter = Account::from("0xvoter");

        assert!(ballot.cast(&voter));
        assert!(!ballot.cast(&voter));
        assert_eq!(ballot.count(), 1);
        assert!(ballot.has_voted(&voter));
    }

    #[test]
    fn test_quorum_manager() {
        let quorum = QuorumManager::new(3);
        assert!(!quorum.is_reached(2));
        assert!(quorum.is_reached(3));
    }

    proptest! {
        #[test]
        fn required_majority_is_the_smallest_passing_count(electorate in 1usize..10_000) {
            let required = required_majority(electorate);
            prop_assert!(majority_reached(required, electorate));
            prop_assert!(!majority_reached(required - 1, electorate));
        }
    }
}
