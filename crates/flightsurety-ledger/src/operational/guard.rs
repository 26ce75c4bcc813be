//! Operational guard - the pausable gate in front of every governance mutation
//!
//! The owner can flip the gate directly. Registered and funded airlines can
//! also flip it together: once a majority of registered airlines vote for the
//! same target, the gate follows. This lets the consortium unpause without
//! the owner.

use flightsurety_common::{Account, GovernanceError, GovernanceResult};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::consensus::quorum::{majority_reached, required_majority, Ballot};
use crate::membership::MembershipLedger;

/// Result of a multiparty gate vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVote {
    /// The vote carried and the gate now holds the voted value
    Applied,
    /// More votes are needed
    Pending { votes: usize, required: usize },
}

/// Process-wide operating status
#[derive(Debug)]
pub struct OperationalGuard {
    operational: bool,
    owner: Account,
    /// Outstanding votes keyed by target status
    votes: BTreeMap<bool, Ballot>,
}

impl OperationalGuard {
    /// New gate, open, controlled by `owner`
    pub fn new(owner: Account) -> Self {
        Self {
            operational: true,
            owner,
            votes: BTreeMap::new(),
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn owner(&self) -> &Account {
        &self.owner
    }

    /// Fail with `NotOperational` while the gate is closed
    #[inline]
    pub fn require_operational(&self) -> GovernanceResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(GovernanceError::NotOperational)
        }
    }

    /// Owner-only gate switch
    pub fn set_operating_status(&mut self, target: bool, caller: &Account) -> GovernanceResult<()> {
        if caller != &self.owner {
            return Err(GovernanceError::Unauthorized {
                caller: caller.clone(),
            });
        }
        if target == self.operational {
            return Err(GovernanceError::NoOpChange {
                current: self.operational,
            });
        }

        self.apply(target);
        info!(operational = target, "Operating status changed by owner");
        Ok(())
    }

    /// Vote to move the gate to `target`
    ///
    /// Voters must be registered and funded airlines. The electorate is the
    /// current number of registered airlines.
    pub fn vote_operating_status(
        &mut self,
        target: bool,
        caller: &Account,
        ledger: &MembershipLedger,
    ) -> GovernanceResult<GateVote> {
        if !ledger.is_participating(caller) {
            return Err(GovernanceError::ProposerNotEligible {
                account: caller.clone(),
            });
        }
        if target == self.operational {
            return Err(GovernanceError::NoOpChange {
                current: self.operational,
            });
        }

        let ballot = self.votes.entry(target).or_default();
        if !ballot.cast(caller) {
            return Err(GovernanceError::DuplicateVote {
                voter: caller.clone(),
                subject: format!("operating status {target}"),
            });
        }

        let votes = ballot.count();
        let electorate = ledger.registered_count();
        debug!(voter = %caller, target, votes, electorate, "Operating status vote recorded");

        if majority_reached(votes, electorate) {
            self.apply(target);
            info!(operational = target, votes, "Operating status changed by airline vote");
            Ok(GateVote::Applied)
        } else {
            Ok(GateVote::Pending {
                votes,
                required: required_majority(electorate),
            })
        }
    }

    /// Votes currently recorded for `target`
    pub fn pending_votes(&self, target: bool) -> usize {
        self.votes.get(&target).map_or(0, Ballot::count)
    }

    fn apply(&mut self, target: bool) {
        self.operational = target;
        // Votes were cast against the previous state; start over.
        self.votes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn owner() -> Account {
        Account::from("0xowner")
    }

    fn ledger_with_funded(airlines: &[&str]) -> MembershipLedger {
        let mut ledger = MembershipLedger::new();
        for airline in airlines {
            let account = Account::from(*airline);
            ledger.admit_airline(&account);
            ledger.fund(&account, dec!(10), dec!(10)).unwrap();
        }
        ledger
    }

    #[test]
    fn test_initially_operational() {
        let guard = OperationalGuard::new(owner());
        assert!(guard.is_operational());
        assert!(guard.require_operational().is_ok());
    }

    #[test]
    fn test_only_owner_can_switch() {
        let mut guard = OperationalGuard::new(owner());
        let stranger = Account::from("0xstranger");

        let err = guard.set_operating_status(false, &stranger).unwrap_err();
        assert_eq!(err, GovernanceError::Unauthorized { caller: stranger });
        assert!(guard.is_operational());

        guard.set_operating_status(false, &owner()).unwrap();
        assert!(!guard.is_operational());
        assert_eq!(guard.require_operational(), Err(GovernanceError::NotOperational));
    }

    #[test]
    fn test_no_op_change_rejected() {
        let mut guard = OperationalGuard::new(owner());
        let err = guard.set_operating_status(true, &owner()).unwrap_err();
        assert_eq!(err, GovernanceError::NoOpChange { current: true });
    }

    #[test]
    fn test_airlines_vote_to_unpause() {
        let ledger = ledger_with_funded(&["0xa1", "0xa2", "0xa3", "0xa4"]);
        let mut guard = OperationalGuard::new(owner());
        guard.set_operating_status(false, &owner()).unwrap();

        let first = guard
            .vote_operating_status(true, &Account::from("0xa1"), &ledger)
            .unwrap();
        assert_eq!(first, GateVote::Pending { votes: 1, required: 2 });
        assert!(!guard.is_operational());

        let dup = guard.vote_operating_status(true, &Account::from("0xa1"), &ledger);
        assert!(matches!(dup, Err(GovernanceError::DuplicateVote { .. })));

        let second = guard
            .vote_operating_status(true, &Account::from("0xa2"), &ledger)
            .unwrap();
        assert_eq!(second, GateVote::Applied);
        assert!(guard.is_operational());
        assert_eq!(guard.pending_votes(true), 0);
    }

    #[test]
    fn test_unfunded_airline_cannot_vote() {
        let mut ledger = MembershipLedger::new();
        let airline = Account::from("0xa1");
        ledger.admit_airline(&airline);

        let mut guard = OperationalGuard::new(owner());
        let err = guard.vote_operating_status(false, &airline, &ledger).unwrap_err();
        assert_eq!(err, GovernanceError::ProposerNotEligible { account: airline });
    }
}
