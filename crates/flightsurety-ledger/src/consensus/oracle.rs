//! Oracle enrolment and index assignment
//!
//! Each oracle pays a registration fee and receives a fixed set of distinct
//! indexes. Every status request carries one random index; when enforcement
//! is on, only oracles holding that index may answer it. This spreads
//! requests over the oracle population instead of letting a fixed group
//! answer everything.

use flightsurety_common::{Account, Amount, GovernanceError, GovernanceResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::config::OracleSettings;

/// Enrolled oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub oracle: Account,
    /// Distinct indexes in `0..index_count`
    pub indexes: Vec<u8>,
    pub fee_paid: Amount,
    /// Enrolment timestamp (Unix milliseconds)
    pub registered_at: i64,
}

impl OracleRecord {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Registry of enrolled oracles
#[derive(Debug)]
pub struct OracleRegistry {
    oracles: HashMap<Account, OracleRecord>,
    registration_fee: Amount,
    index_count: u8,
    indexes_per_oracle: usize,
    rng: StdRng,
}

impl OracleRegistry {
    /// Registry for validated settings (`index_count` and
    /// `indexes_per_oracle` within range)
    pub(crate) fn new(settings: &OracleSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            oracles: HashMap::new(),
            registration_fee: settings.registration_fee,
            index_count: settings.index_count,
            indexes_per_oracle: settings.indexes_per_oracle,
            rng,
        }
    }

    /// Enrol an oracle and assign its indexes
    pub fn register_oracle(&mut self, oracle: &Account, fee: Amount) -> GovernanceResult<Vec<u8>> {
        if fee < self.registration_fee {
            return Err(GovernanceError::InsufficientFunds {
                required: self.registration_fee,
                provided: fee,
            });
        }
        if self.oracles.contains_key(oracle) {
            return Err(GovernanceError::OracleAlreadyRegistered {
                oracle: oracle.clone(),
            });
        }

        let mut indexes: Vec<u8> = rand::seq::index::sample(
            &mut self.rng,
            usize::from(self.index_count),
            self.indexes_per_oracle,
        )
        .into_iter()
        .filter_map(|i| u8::try_from(i).ok())
        .collect();
        indexes.sort_unstable();

        info!(oracle = %oracle, ?indexes, "Oracle registered");

        self.oracles.insert(
            oracle.clone(),
            OracleRecord {
                oracle: oracle.clone(),
                indexes: indexes.clone(),
                fee_paid: fee,
                registered_at: chrono::Utc::now().timestamp_millis(),
            },
        );

        Ok(indexes)
    }

    pub fn is_registered(&self, oracle: &Account) -> bool {
        self.oracles.contains_key(oracle)
    }

    pub fn indexes(&self, oracle: &Account) -> Option<&[u8]> {
        self.oracles.get(oracle).map(|r| r.indexes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    /// Index for a new status request
    pub fn random_index(&mut self) -> u8 {
        self.rng.gen_range(0..self.index_count)
    }

    /// Check that `oracle` may answer a request carrying `index`
    pub fn authorize(&self, oracle: &Account, index: u8) -> GovernanceResult<()> {
        let record = self
            .oracles
            .get(oracle)
            .ok_or_else(|| GovernanceError::OracleNotRegistered {
                oracle: oracle.clone(),
            })?;

        if !record.holds(index) {
            return Err(GovernanceError::IndexMismatch {
                oracle: oracle.clone(),
                index,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn registry() -> OracleRegistry {
        OracleRegistry::new(&OracleSettings {
            rng_seed: Some(7),
            ..OracleSettings::default()
        })
    }

    #[test]
    fn test_registration_assigns_distinct_indexes() {
        let mut registry = registry();
        let oracle = Account::from("0xoracle");

        let indexes = registry.register_oracle(&oracle, dec!(1)).unwrap();
        assert_eq!(indexes.len(), 3);
        assert!(indexes.iter().all(|i| *i < 10));
        assert!(indexes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(registry.indexes(&oracle), Some(indexes.as_slice()));
    }

    #[test]
    fn test_registration_fee_enforced() {
        let mut registry = registry();
        let err = registry
            .register_oracle(&Account::from("0xoracle"), dec!(0.5))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InsufficientFunds { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_double_registration_rejected() {
        let mut registry = registry();
        let oracle = Account::from("0xoracle");
        registry.register_oracle(&oracle, dec!(1)).unwrap();

        let err = registry.register_oracle(&oracle, dec!(1)).unwrap_err();
        assert_eq!(err, GovernanceError::OracleAlreadyRegistered { oracle });
    }

    #[test]
    fn test_authorize() {
        let mut registry = registry();
        let oracle = Account::from("0xoracle");
        let indexes = registry.register_oracle(&oracle, dec!(1)).unwrap();

        assert!(registry.authorize(&oracle, indexes[0]).is_ok());

        let missing = (0..10u8).find(|i| !indexes.contains(i)).unwrap();
        assert!(matches!(
            registry.authorize(&oracle, missing),
            Err(GovernanceError::IndexMismatch { .. })
        ));
        assert!(matches!(
            registry.authorize(&Account::from("0xother"), indexes[0]),
            Err(GovernanceError::OracleNotRegistered { .. })
        ));
    }

    #[test]
    fn test_random_index_in_range() {
        let mut registry = registry();
        for _ in 0..100 {
            assert!(registry.random_index() < 10);
        }
    }
}
