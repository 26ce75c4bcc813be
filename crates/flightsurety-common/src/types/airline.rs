//! Airline membership records
//!
//! An airline passes through three observable stages:
//! - pending: proposed but not yet admitted by the consortium
//! - registered: admitted, may vote once funded
//! - funded: contributed at least the funding threshold, may propose and register flights
//!
//! Funding is monotonic. Nothing in the core ever un-funds an airline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::account::Account;

/// Amount of funding units
pub type Amount = Decimal;

/// Membership record for a single airline account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineRecord {
    /// Airline account
    pub account: Account,

    /// Admitted to the consortium
    pub registered: bool,

    /// Funding threshold reached
    pub funded: bool,

    /// Total funding contributed
    pub funded_amount: Amount,

    /// Voters whose approval admitted this airline (empty for bootstrap admissions)
    pub votes_received: BTreeSet<Account>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Timestamp of last modification
    pub updated_at: i64,
}

impl AirlineRecord {
    /// Create a pending record for a candidate
    pub fn pending(account: Account) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            account,
            registered: false,
            funded: false,
            funded_amount: Decimal::ZERO,
            votes_received: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Registered and funded: may propose, vote and register flights
    #[inline]
    pub fn is_participating(&self) -> bool {
        self.registered && self.funded
    }

    /// Mark the airline as admitted
    ///
    /// Returns `false` when the airline was already registered.
    pub fn admit(&mut self) -> bool {
        if self.registered {
            return false;
        }
        self.registered = true;
        self.touch();
        true
    }

    /// Accumulate a contribution
    ///
    /// The caller has already checked the contribution against the threshold;
    /// the record only flips `funded` once the running total reaches it.
    pub fn contribute(&mut self, amount: Amount, threshold: Amount) {
        self.funded_amount += amount;
        if self.funded_amount >= threshold {
            self.funded = true;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_record() {
        let record = AirlineRecord::pending(Account::from("0xairline"));
        assert!(!record.registered);
        assert!(!record.funded);
        assert_eq!(record.funded_amount, Decimal::ZERO);
        assert!(!record.is_participating());
    }

    #[test]
    fn test_admit_is_idempotent() {
        let mut record = AirlineRecord::pending(Account::from("0xairline"));
        assert!(record.admit());
        assert!(!record.admit());
        assert!(record.registered);
    }

    #[test]
    fn test_contribution_accumulates() {
        let mut record = AirlineRecord::pending(Account::from("0xairline"));
        record.admit();
        record.contribute(dec!(10), dec!(10));
        record.contribute(dec!(15), dec!(10));

        assert!(record.funded);
        assert!(record.is_participating());
        assert_eq!(record.funded_amount, dec!(25));
    }
}
