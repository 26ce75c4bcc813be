//! Membership ledger - registered and funded airline accounts
//!
//! The ledger owns every [`AirlineRecord`]. It answers the registration and
//! funding lookups the rest of the core relies on, and it is the only place
//! where records are created or upgraded. Admission decisions are made by the
//! registrar; the ledger just applies them.

use flightsurety_common::{Account, AirlineRecord, Amount, GovernanceError, GovernanceResult};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Registered/funded airline accounts and their funding balances
#[derive(Debug, Default)]
pub struct MembershipLedger {
    airlines: HashMap<Account, AirlineRecord>,
    registered: usize,
    funded: usize,
}

impl MembershipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered_airline(&self, account: &Account) -> bool {
        self.airlines.get(account).is_some_and(|r| r.registered)
    }

    pub fn is_airline_funded(&self, account: &Account) -> bool {
        self.airlines.get(account).is_some_and(|r| r.funded)
    }

    /// Registered and funded
    pub fn is_participating(&self, account: &Account) -> bool {
        self.airlines
            .get(account)
            .is_some_and(AirlineRecord::is_participating)
    }

    pub fn airline(&self, account: &Account) -> Option<&AirlineRecord> {
        self.airlines.get(account)
    }

    pub fn registered_count(&self) -> usize {
        self.registered
    }

    pub fn funded_count(&self) -> usize {
        self.funded
    }

    /// Create a pending record on the first registration attempt
    pub fn track_candidate(&mut self, candidate: &Account) -> &AirlineRecord {
        self.airlines
            .entry(candidate.clone())
            .or_insert_with(|| AirlineRecord::pending(candidate.clone()))
    }

    /// Admit an airline
    ///
    /// Idempotent: returns `false` when the airline was already registered.
    pub fn admit_airline(&mut self, candidate: &Account) -> bool {
        let record = self
            .airlines
            .entry(candidate.clone())
            .or_insert_with(|| AirlineRecord::pending(candidate.clone()));

        let admitted = record.admit();
        if admitted {
            self.registered += 1;
            debug!(airline = %candidate, registered = self.registered, "Airline admitted");
        }
        admitted
    }

    /// Admit an airline and keep the voters that carried the decision
    pub fn admit_with_votes(&mut self, candidate: &Account, voters: BTreeSet<Account>) -> bool {
        let admitted = self.admit_airline(candidate);
        if admitted {
            if let Some(record) = self.airlines.get_mut(candidate) {
                record.votes_received = voters;
            }
        }
        admitted
    }

    /// Record a funding contribution from a registered airline
    ///
    /// Every contribution must meet `threshold` on its own. Returns the
    /// airline's total contribution.
    pub fn fund(
        &mut self,
        caller: &Account,
        amount: Amount,
        threshold: Amount,
    ) -> GovernanceResult<Amount> {
        let record = self
            .airlines
            .get_mut(caller)
            .filter(|r| r.registered)
            .ok_or_else(|| GovernanceError::NotRegistered {
                account: caller.clone(),
            })?;

        if amount < threshold {
            return Err(GovernanceError::InsufficientFunds {
                required: threshold,
                provided: amount,
            });
        }

        let was_funded = record.funded;
        record.contribute(amount, threshold);
        if !was_funded && record.funded {
            self.funded += 1;
        }

        Ok(record.funded_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lookups_never_fail() {
        let ledger = MembershipLedger::new();
        let stranger = Account::from("0xstranger");
        assert!(!ledger.is_registered_airline(&stranger));
        assert!(!ledger.is_airline_funded(&stranger));
        assert!(ledger.airline(&stranger).is_none());
    }

    #[test]
    fn test_admit_is_idempotent() {
        let mut ledger = MembershipLedger::new();
        let airline = Account::from("0xairline");

        assert!(ledger.admit_airline(&airline));
        assert!(!ledger.admit_airline(&airline));
        assert_eq!(ledger.registered_count(), 1);
        assert!(ledger.is_registered_airline(&airline));
    }

    #[test]
    fn test_pending_candidate_is_not_registered() {
        let mut ledger = MembershipLedger::new();
        let candidate = Account::from("0xcandidate");

        ledger.track_candidate(&candidate);
        assert!(ledger.airline(&candidate).is_some());
        assert!(!ledger.is_registered_airline(&candidate));
        assert_eq!(ledger.registered_count(), 0);
    }

    #[test]
    fn test_fund_requires_registration() {
        let mut ledger = MembershipLedger::new();
        let candidate = Account::from("0xcandidate");
        ledger.track_candidate(&candidate);

        let err = ledger.fund(&candidate, dec!(10), dec!(10)).unwrap_err();
        assert_eq!(err, GovernanceError::NotRegistered { account: candidate });
    }

    #[test]
    fn test_fund_below_threshold() {
        let mut ledger = MembershipLedger::new();
        let airline = Account::from("0xairline");
        ledger.admit_airline(&airline);

        let err = ledger.fund(&airline, dec!(9.99), dec!(10)).unwrap_err();
        assert!(matches!(err, GovernanceError::InsufficientFunds { .. }));
        assert!(!ledger.is_airline_funded(&airline));
    }

    #[test]
    fn test_fund_accumulates() {
        let mut ledger = MembershipLedger::new();
        let airline = Account::from("0xairline");
        ledger.admit_airline(&airline);

        assert_eq!(ledger.fund(&airline, dec!(10), dec!(10)).unwrap(), dec!(10));
        assert_eq!(ledger.fund(&airline, dec!(12), dec!(10)).unwrap(), dec!(22));
        assert!(ledger.is_airline_funded(&airline));
        assert!(ledger.is_participating(&airline));
        assert_eq!(ledger.funded_count(), 1);
    }
}
