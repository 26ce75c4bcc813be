//! # FlightSurety Common
//!
//! Shared types, errors, and the audit trail for the FlightSurety governance core.
//!
//! ## Core Types
//!
//! - [`Account`]: opaque identity of airlines, oracles and owners
//! - [`AirlineRecord`]: membership and funding state of an airline
//! - [`Flight`]/[`FlightKey`]/[`FlightStatus`]: registered flights and oracle-reported status
//!
//! ## Security
//!
//! - [`security::audit`]: audit logging of governance decisions

pub mod error;
pub mod security;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{FlightSuretyError, GovernanceError, GovernanceResult, Result};
pub use types::{
    account::Account,
    airline::{AirlineRecord, Amount},
    flight::{Flight, FlightKey, FlightStatus, InvalidStatusCode},
};

use rust_decimal::Decimal;

/// FlightSurety version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum contribution for an airline to become funded
pub const FUNDING_THRESHOLD: Decimal = Decimal::TEN;

/// Registered airline count from which admission requires a vote
pub const CONSENSUS_THRESHOLD_COUNT: usize = 4;

/// Matching oracle responses required to finalize a flight status
pub const ORACLE_QUORUM: usize = 3;

/// Fee an oracle pays to enrol
pub const ORACLE_REGISTRATION_FEE: Decimal = Decimal::ONE;

/// Size of the oracle index space
pub const ORACLE_INDEX_COUNT: u8 = 10;

/// Indexes assigned to every oracle
pub const INDEXES_PER_ORACLE: usize = 3;
