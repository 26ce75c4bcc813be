//! Membership - airline registration and funding state

pub mod ledger;

pub use ledger::MembershipLedger;
