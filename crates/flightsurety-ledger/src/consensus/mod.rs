//! Consensus module - majority admission and oracle quorum
//!
//! This module provides:
//! - Airline admission with bootstrap and majority-vote phases
//! - Oracle enrolment and index assignment
//! - Flight-status requests resolved by matching oracle responses

pub mod oracle;
pub mod quorum;
pub mod registrar;
pub mod status;

pub use oracle::{OracleRecord, OracleRegistry};
pub use quorum::{majority_reached, required_majority, Ballot, QuorumManager};
pub use registrar::{ConsensusRegistrar, RegistrationOutcome, RegistrationProposal};
pub use status::{
    OracleConsensus, OracleResponse, RequestIndex, RequestState, ResponseOutcome, StatusRequest,
};
