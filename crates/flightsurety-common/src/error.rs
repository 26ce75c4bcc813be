//! Error types for FlightSurety
//!
//! Every violated precondition of a governance operation surfaces as a
//! [`GovernanceError`]. [`FlightSuretyError`] wraps those together with the
//! failures that can happen around the core (configuration, serialization).

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::account::Account;

/// Result type alias using FlightSuretyError
pub type Result<T> = std::result::Result<T, FlightSuretyError>;

/// Result type alias for boundary operations of the governance core
pub type GovernanceResult<T> = std::result::Result<T, GovernanceError>;

/// Unified error type for FlightSurety
#[derive(Debug, Error)]
pub enum FlightSuretyError {
    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Synchronous, local failures of governance operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Contract is currently not operational")]
    NotOperational,

    #[error("Caller {caller} is not the contract owner")]
    Unauthorized { caller: Account },

    #[error("Operating status is already {current}")]
    NoOpChange { current: bool },

    #[error("Account {account} is not a registered airline")]
    NotRegistered { account: Account },

    #[error("Account {account} is not a registered and funded airline")]
    ProposerNotEligible { account: Account },

    #[error("Insufficient funds: required {required}, provided {provided}")]
    InsufficientFunds { required: Decimal, provided: Decimal },

    #[error("Airline {account} is already registered")]
    AlreadyRegistered { account: Account },

    #[error("Account {voter} already voted for {subject}")]
    DuplicateVote { voter: Account, subject: String },

    #[error("Flight {code} at {departure_time} is already registered for {airline}")]
    DuplicateFlight {
        airline: Account,
        code: String,
        departure_time: i64,
    },

    #[error("Unknown request: {0}")]
    UnknownRequest(String),

    #[error("Oracle {oracle} already responded to request {request}")]
    DuplicateResponse { oracle: Account, request: u64 },

    #[error("Request {request} is already resolved")]
    AlreadyResolved { request: u64 },

    #[error("Oracle {oracle} is not registered")]
    OracleNotRegistered { oracle: Account },

    #[error("Oracle {oracle} is already registered")]
    OracleAlreadyRegistered { oracle: Account },

    #[error("Oracle {oracle} does not hold index {index}")]
    IndexMismatch { oracle: Account, index: u8 },
}

impl GovernanceError {
    /// Whether the failure is an authorization decision (audited)
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            GovernanceError::Unauthorized { .. }
                | GovernanceError::ProposerNotEligible { .. }
                | GovernanceError::NotRegistered { .. }
                | GovernanceError::OracleNotRegistered { .. }
                | GovernanceError::IndexMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for FlightSuretyError {
    fn from(err: serde_json::Error) -> Self {
        FlightSuretyError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = FlightSuretyError::Governance(GovernanceError::NotRegistered {
            account: Account::from("0xairline"),
        });
        assert!(err.to_string().contains("0xairline"));
    }

    #[test]
    fn test_insufficient_funds() {
        let err = GovernanceError::InsufficientFunds {
            required: dec!(10),
            provided: dec!(9.5),
        };
        assert!(err.to_string().contains("required 10, provided 9.5"));
    }

    #[test]
    fn test_authorization_classification() {
        let caller = Account::from("0xstranger");
        assert!(GovernanceError::Unauthorized { caller }.is_authorization());
        assert!(!GovernanceError::NotOperational.is_authorization());
        assert!(!GovernanceError::AlreadyResolved { request: 1 }.is_authorization());
    }
}
