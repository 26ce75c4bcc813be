//! Operational status gate

pub mod guard;

pub use guard::{GateVote, OperationalGuard};
