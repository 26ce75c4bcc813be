//! # FlightSurety Ledger
//!
//! Governance core of the FlightSurety airline consortium.
//!
//! ## Components
//!
//! - **Operational**: owner-controlled pause gate with multiparty override
//! - **Membership**: registered and funded airlines
//! - **Consensus**: bootstrap and majority-vote admission, oracle quorum
//! - **Flights**: flight registration and finalized status
//! - **Ledger**: sequenced event journal with live subscription
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FlightSurety                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────┐  │
//! │  │ Operational │  │ Membership  │  │      Consensus       │  │
//! │  │    Guard    │──│   Ledger    │──│ (Registrar, Oracles) │  │
//! │  └─────────────┘  └─────────────┘  └──────────────────────┘  │
//! │         │                │                    │              │
//! │         └────────────────┴───────┬────────────┘              │
//! │                          ┌───────┴──────┐                    │
//! │                          │ EventJournal │                    │
//! │                          └──────────────┘                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod consensus;
pub mod flights;
pub mod ledger;
pub mod membership;
pub mod operational;
pub mod service;

pub use config::{FlightSuretyConfig, GovernanceSettings, JournalSettings, OracleSettings};
pub use consensus::{
    ConsensusRegistrar, OracleConsensus, OracleRegistry, QuorumManager, RegistrationOutcome,
    RegistrationProposal, RequestIndex, RequestState, ResponseOutcome, StatusRequest,
};
pub use flights::FlightRegistry;
pub use ledger::{EventJournal, JournalEntry, LedgerEvent};
pub use membership::MembershipLedger;
pub use operational::{GateVote, OperationalGuard};
pub use service::FlightSurety;
