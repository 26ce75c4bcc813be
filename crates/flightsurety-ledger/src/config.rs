//! FlightSurety configuration

use anyhow::Result;
use flightsurety_common::{
    Amount, FlightSuretyError, CONSENSUS_THRESHOLD_COUNT, FUNDING_THRESHOLD, INDEXES_PER_ORACLE,
    ORACLE_INDEX_COUNT, ORACLE_QUORUM, ORACLE_REGISTRATION_FEE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FLIGHTSURETY_";

/// FlightSurety configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightSuretyConfig {
    /// Membership and funding rules
    pub governance: GovernanceSettings,
    /// Oracle consensus
    pub oracle: OracleSettings,
    /// Event journal and audit retention
    pub journal: JournalSettings,
}

impl FlightSuretyConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from defaults overridden by `lookup`
    ///
    /// `lookup` receives full variable names such as `FLIGHTSURETY_ORACLE_QUORUM`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        // Governance settings
        override_from(&lookup, "FUNDING_THRESHOLD", &mut cfg.governance.funding_threshold);
        override_from(
            &lookup,
            "CONSENSUS_THRESHOLD_COUNT",
            &mut cfg.governance.consensus_threshold_count,
        );

        // Oracle settings
        override_from(&lookup, "ORACLE_QUORUM", &mut cfg.oracle.quorum);
        override_from(&lookup, "ORACLE_REGISTRATION_FEE", &mut cfg.oracle.registration_fee);
        override_from(&lookup, "ORACLE_INDEX_COUNT", &mut cfg.oracle.index_count);
        override_from(&lookup, "ORACLE_INDEXES_PER_ORACLE", &mut cfg.oracle.indexes_per_oracle);
        override_from(
            &lookup,
            "ORACLE_REQUIRE_REGISTRATION",
            &mut cfg.oracle.require_registration,
        );
        if let Some(raw) = lookup(&format!("{ENV_PREFIX}ORACLE_RNG_SEED")) {
            match raw.parse() {
                Ok(seed) => cfg.oracle.rng_seed = Some(seed),
                Err(_) => warn!(value = %raw, "Ignoring invalid FLIGHTSURETY_ORACLE_RNG_SEED"),
            }
        }

        // Journal settings
        override_from(&lookup, "JOURNAL_CHANNEL_CAPACITY", &mut cfg.journal.channel_capacity);
        override_from(&lookup, "JOURNAL_AUDIT_CAPACITY", &mut cfg.journal.audit_capacity);
        override_from(&lookup, "JOURNAL_RETAINED_ENTRIES", &mut cfg.journal.retained_entries);

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the governance core cannot operate with
    pub fn validate(&self) -> flightsurety_common::Result<()> {
        let invalid = |msg: &str| Err(FlightSuretyError::Config(msg.to_string()));

        if self.governance.funding_threshold <= Decimal::ZERO {
            return invalid("funding_threshold must be positive");
        }
        if self.governance.consensus_threshold_count == 0 {
            return invalid("consensus_threshold_count must be at least 1");
        }
        if self.oracle.quorum == 0 {
            return invalid("oracle quorum must be at least 1");
        }
        if self.oracle.registration_fee < Decimal::ZERO {
            return invalid("oracle registration_fee must not be negative");
        }
        if self.oracle.index_count == 0 {
            return invalid("oracle index_count must be at least 1");
        }
        if self.oracle.indexes_per_oracle == 0
            || self.oracle.indexes_per_oracle > usize::from(self.oracle.index_count)
        {
            return invalid("oracle indexes_per_oracle must be within 1..=index_count");
        }
        if self.journal.channel_capacity == 0 {
            return invalid("journal channel_capacity must be at least 1");
        }
        if self.journal.retained_entries == 0 {
            return invalid("journal retained_entries must be at least 1");
        }
        Ok(())
    }
}

fn override_from<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let name = format!("{ENV_PREFIX}{key}");
    if let Some(raw) = lookup(&name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(variable = %name, value = %raw, "Ignoring invalid configuration value"),
        }
    }
}

/// Membership and funding rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceSettings {
    /// Minimum contribution for an airline to become funded
    pub funding_threshold: Amount,
    /// Registered airline count from which admission requires a majority vote
    pub consensus_threshold_count: usize,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            funding_threshold: FUNDING_THRESHOLD,
            consensus_threshold_count: CONSENSUS_THRESHOLD_COUNT,
        }
    }
}

/// Oracle enrolment and consensus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Matching responses required to finalize a status
    pub quorum: usize,
    /// Fee an oracle pays to enrol
    pub registration_fee: Amount,
    /// Size of the index space requests are spread over
    pub index_count: u8,
    /// Distinct indexes assigned to each oracle
    pub indexes_per_oracle: usize,
    /// Only accept responses from enrolled oracles holding the request's index
    pub require_registration: bool,
    /// Fixed seed for index assignment (entropy when unset)
    pub rng_seed: Option<u64>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            quorum: ORACLE_QUORUM,
            registration_fee: ORACLE_REGISTRATION_FEE,
            index_count: ORACLE_INDEX_COUNT,
            indexes_per_oracle: INDEXES_PER_ORACLE,
            require_registration: false,
            rng_seed: None,
        }
    }
}

/// Journal and audit retention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Buffered events per subscriber before it starts lagging
    pub channel_capacity: usize,
    /// Audit events retained in memory
    pub audit_capacity: usize,
    /// Journal entries retained in memory, oldest evicted first
    pub retained_entries: usize,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            audit_capacity: 4096,
            retained_entries: 16_384,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = FlightSuretyConfig::default();
        assert_eq!(cfg.governance.funding_threshold, dec!(10));
        assert_eq!(cfg.governance.consensus_threshold_count, 4);
        assert_eq!(cfg.oracle.quorum, 3);
        assert!(!cfg.oracle.require_registration);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let cfg = FlightSuretyConfig::from_lookup(lookup_from(&[
            ("FLIGHTSURETY_FUNDING_THRESHOLD", "12.5"),
            ("FLIGHTSURETY_ORACLE_QUORUM", "5"),
            ("FLIGHTSURETY_ORACLE_REQUIRE_REGISTRATION", "true"),
            ("FLIGHTSURETY_ORACLE_RNG_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(cfg.governance.funding_threshold, dec!(12.5));
        assert_eq!(cfg.oracle.quorum, 5);
        assert!(cfg.oracle.require_registration);
        assert_eq!(cfg.oracle.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let cfg = FlightSuretyConfig::from_lookup(lookup_from(&[(
            "FLIGHTSURETY_CONSENSUS_THRESHOLD_COUNT",
            "four",
        )]))
        .unwrap();

        assert_eq!(cfg.governance.consensus_threshold_count, 4);
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        let result = FlightSuretyConfig::from_lookup(lookup_from(&[(
            "FLIGHTSURETY_FUNDING_THRESHOLD",
            "0",
        )]));
        assert!(result.is_err());

        let mut cfg = FlightSuretyConfig::default();
        cfg.oracle.indexes_per_oracle = 11;
        assert!(matches!(cfg.validate(), Err(FlightSuretyError::Config(_))));

        let mut cfg = FlightSuretyConfig::default();
        cfg.oracle.index_count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_journal_retention() {
        let cfg = FlightSuretyConfig::from_lookup(lookup_from(&[(
            "FLIGHTSURETY_JOURNAL_RETAINED_ENTRIES",
            "64",
        )]))
        .unwrap();
        assert_eq!(cfg.journal.retained_entries, 64);

        let result = FlightSuretyConfig::from_lookup(lookup_from(&[(
            "FLIGHTSURETY_JOURNAL_RETAINED_ENTRIES",
            "0",
        )]));
        assert!(result.is_err());
    }
}
