//! Consensus registrar - airline admission
//!
//! Small consortia bootstrap without votes: while fewer than
//! `consensus_threshold` airlines are registered, an eligible proposer admits
//! a candidate immediately. From then on every admission needs votes from
//! half of the registered airlines, each voter counted once.
//!
//! Eligible proposers are registered and funded airlines. During bootstrap the
//! contract owner is eligible as well, since no airline exists yet to propose
//! the first one.

use flightsurety_common::{Account, GovernanceError, GovernanceResult};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::consensus::quorum::{majority_reached, required_majority, Ballot};
use crate::membership::MembershipLedger;

/// Outcome of a registration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Candidate is now a registered airline
    Admitted,
    /// Candidate awaits further votes
    Pending { votes: usize, required: usize },
}

impl RegistrationOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RegistrationOutcome::Admitted)
    }
}

/// Open admission vote for a candidate
#[derive(Debug, Clone)]
pub struct RegistrationProposal {
    pub candidate: Account,
    /// Airline that opened the proposal
    pub proposer: Account,
    pub votes: Ballot,
    /// Opening timestamp (Unix milliseconds)
    pub opened_at: i64,
}

/// Decides between immediate admission and multi-voter consensus
#[derive(Debug)]
pub struct ConsensusRegistrar {
    consensus_threshold: usize,
    proposals: HashMap<Account, RegistrationProposal>,
}

impl ConsensusRegistrar {
    pub fn new(consensus_threshold: usize) -> Self {
        Self {
            consensus_threshold,
            proposals: HashMap::new(),
        }
    }

    /// Propose (or vote for) the admission of `candidate`
    pub fn register_airline(
        &mut self,
        candidate: &Account,
        proposer: &Account,
        owner: &Account,
        ledger: &mut MembershipLedger,
    ) -> GovernanceResult<RegistrationOutcome> {
        let registered = ledger.registered_count();
        let bootstrapping = registered < self.consensus_threshold;

        let eligible = ledger.is_participating(proposer) || (bootstrapping && proposer == owner);
        if !eligible {
            return Err(GovernanceError::ProposerNotEligible {
                account: proposer.clone(),
            });
        }
        if ledger.is_registered_airline(candidate) {
            return Err(GovernanceError::AlreadyRegistered {
                account: candidate.clone(),
            });
        }

        ledger.track_candidate(candidate);

        if bootstrapping {
            ledger.admit_airline(candidate);
            info!(airline = %candidate, proposer = %proposer, registered = registered + 1, "Airline admitted during bootstrap");
            return Ok(RegistrationOutcome::Admitted);
        }

        let proposal = self
            .proposals
            .entry(candidate.clone())
            .or_insert_with(|| RegistrationProposal {
                candidate: candidate.clone(),
                proposer: proposer.clone(),
                votes: Ballot::new(),
                opened_at: chrono::Utc::now().timestamp_millis(),
            });

        if !proposal.votes.cast(proposer) {
            return Err(GovernanceError::DuplicateVote {
                voter: proposer.clone(),
                subject: candidate.to_string(),
            });
        }

        let votes = proposal.votes.count();
        debug!(candidate = %candidate, voter = %proposer, votes, electorate = registered, "Admission vote recorded");

        if !majority_reached(votes, registered) {
            return Ok(RegistrationOutcome::Pending {
                votes,
                required: required_majority(registered),
            });
        }

        if let Some(proposal) = self.proposals.remove(candidate) {
            ledger.admit_with_votes(candidate, proposal.votes.into_voters());
        }
        info!(airline = %candidate, votes, electorate = registered, "Airline admitted by consensus");
        Ok(RegistrationOutcome::Admitted)
    }

    pub fn proposal(&self, candidate: &Account) -> Option<&RegistrationProposal> {
        self.proposals.get(candidate)
    }

    /// Proposals still waiting for votes
    ///
    /// Proposals never expire on their own; this is the hook for an
    /// external sweep.
    pub fn pending_proposals(&self) -> impl Iterator<Item = &RegistrationProposal> {
        self.proposals.values()
    }
}
