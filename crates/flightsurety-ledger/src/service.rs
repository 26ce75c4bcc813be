//! FlightSurety context object
//!
//! Owns every governance component and exposes the boundary operations.
//! All state sits behind one mutex, so each operation is applied atomically
//! and in arrival order. Every mutating operation except the gate controls
//! checks the gate first.

use flightsurety_common::security::{AuditCategory, AuditEvent, AuditLogger, MemoryAuditSink};
use flightsurety_common::{
    Account, AirlineRecord, Amount, Flight, FlightKey, FlightStatus, GovernanceResult, Result,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use crate::config::FlightSuretyConfig;
use crate::consensus::{
    ConsensusRegistrar, OracleConsensus, OracleRegistry, RegistrationOutcome,
    RegistrationProposal, RequestIndex, ResponseOutcome, StatusRequest,
};
use crate::flights::FlightRegistry;
use crate::ledger::{EventJournal, JournalEntry, LedgerEvent};
use crate::membership::MembershipLedger;
use crate::operational::{GateVote, OperationalGuard};

/// Mutable governance state, guarded as a whole
#[derive(Debug)]
struct GovernanceState {
    guard: OperationalGuard,
    ledger: MembershipLedger,
    registrar: ConsensusRegistrar,
    flights: FlightRegistry,
    consensus: OracleConsensus,
    oracles: OracleRegistry,
}

/// Airline registration and flight-status oracle network
pub struct FlightSurety {
    config: FlightSuretyConfig,
    state: Mutex<GovernanceState>,
    journal: EventJournal,
    audit: AuditLogger,
    audit_trail: Arc<MemoryAuditSink>,
}

impl FlightSurety {
    /// Create a new instance owned by `owner`
    pub fn new(owner: Account, config: FlightSuretyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(owner, config))
    }

    /// Instance with the default configuration
    pub fn with_defaults(owner: Account) -> Self {
        Self::build(owner, FlightSuretyConfig::default())
    }

    fn build(owner: Account, config: FlightSuretyConfig) -> Self {
        let state = GovernanceState {
            guard: OperationalGuard::new(owner),
            ledger: MembershipLedger::new(),
            registrar: ConsensusRegistrar::new(config.governance.consensus_threshold_count),
            flights: FlightRegistry::new(),
            consensus: OracleConsensus::new(config.oracle.quorum),
            oracles: OracleRegistry::new(&config.oracle),
        };

        let audit_trail = Arc::new(MemoryAuditSink::new(config.journal.audit_capacity));
        let mut audit = AuditLogger::new();
        audit.add_sink(audit_trail.clone());

        Self {
            journal: EventJournal::new(
                config.journal.channel_capacity,
                config.journal.retained_entries,
            ),
            state: Mutex::new(state),
            audit,
            audit_trail,
            config,
        }
    }

    pub fn config(&self) -> &FlightSuretyConfig {
        &self.config
    }

    pub fn owner(&self) -> Account {
        self.state.lock().guard.owner().clone()
    }

    // ============ OPERATIONAL STATUS ============

    pub fn is_operational(&self) -> bool {
        self.state.lock().guard.is_operational()
    }

    /// Owner-only gate switch
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn set_operating_status(&self, target: bool, caller: &Account) -> GovernanceResult<()> {
        let mut state = self.state.lock();
        let previous = state.guard.is_operational();

        let result = state.guard.set_operating_status(target, caller);
        self.audited("set_operating_status", caller, "operating_status", &result);
        result?;

        self.audit
            .log_operating_status(caller.as_str(), previous, target, "owner");
        self.journal.record(LedgerEvent::OperationalStatusChanged {
            operational: target,
            changed_by: caller.clone(),
        });
        Ok(())
    }

    /// Multiparty gate vote by registered and funded airlines
    ///
    /// Accepted while the gate is closed.
    #[instrument(skip(self), fields(caller = %caller))]
    pub fn vote_operating_status(&self, target: bool, caller: &Account) -> GovernanceResult<GateVote> {
        let mut state = self.state.lock();
        let GovernanceState { guard, ledger, .. } = &mut *state;
        let previous = guard.is_operational();

        let result = guard.vote_operating_status(target, caller, ledger);
        self.audited("vote_operating_status", caller, "operating_status", &result);

        match result? {
            GateVote::Applied => {
                self.audit
                    .log_operating_status(caller.as_str(), previous, target, "airline_vote");
                self.journal.record(LedgerEvent::OperationalStatusChanged {
                    operational: target,
                    changed_by: caller.clone(),
                });
                Ok(GateVote::Applied)
            }
            GateVote::Pending { votes, required } => {
                self.journal.record(LedgerEvent::OperatingVoteRecorded {
                    target,
                    voter: caller.clone(),
                    votes,
                    required,
                });
                Ok(GateVote::Pending { votes, required })
            }
        }
    }

    // ============ MEMBERSHIP ============

    pub fn is_registered_airline(&self, account: &Account) -> bool {
        self.state.lock().ledger.is_registered_airline(account)
    }

    pub fn is_airline_funded(&self, account: &Account) -> bool {
        self.state.lock().ledger.is_airline_funded(account)
    }

    pub fn airline(&self, account: &Account) -> Option<AirlineRecord> {
        self.state.lock().ledger.airline(account).cloned()
    }

    pub fn registered_airline_count(&self) -> usize {
        self.state.lock().ledger.registered_count()
    }

    /// Fund the caller's airline
    #[instrument(skip(self), fields(caller = %caller, amount = %amount))]
    pub fn fund(&self, caller: &Account, amount: Amount) -> GovernanceResult<()> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let threshold = self.config.governance.funding_threshold;
        let result = state.ledger.fund(caller, amount, threshold);
        self.audited("fund", caller, caller.as_str(), &result);
        let total = result?;

        self.audit
            .log_change(AuditCategory::Funding, caller.as_str(), caller.as_str(), "fund");
        self.journal.record(LedgerEvent::AirlineFunded {
            airline: caller.clone(),
            amount,
            total,
        });
        Ok(())
    }

    /// Propose or vote for the admission of `candidate`
    #[instrument(skip(self), fields(candidate = %candidate, proposer = %proposer))]
    pub fn register_airline(
        &self,
        candidate: &Account,
        proposer: &Account,
    ) -> GovernanceResult<RegistrationOutcome> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let GovernanceState {
            guard,
            ledger,
            registrar,
            ..
        } = &mut *state;
        let result = registrar.register_airline(candidate, proposer, guard.owner(), ledger);
        self.audited("register_airline", proposer, candidate.as_str(), &result);

        let outcome = result?;
        match outcome {
            RegistrationOutcome::Admitted => {
                let votes = ledger
                    .airline(candidate)
                    .map_or(0, |record| record.votes_received.len());
                self.audit.log_change(
                    AuditCategory::Membership,
                    proposer.as_str(),
                    candidate.as_str(),
                    "register_airline",
                );
                self.journal.record(LedgerEvent::AirlineRegistered {
                    airline: candidate.clone(),
                    proposer: proposer.clone(),
                    votes,
                });
            }
            RegistrationOutcome::Pending { votes, required } => {
                self.journal.record(LedgerEvent::AirlineVoteRecorded {
                    candidate: candidate.clone(),
                    voter: proposer.clone(),
                    votes,
                    required,
                });
            }
        }
        Ok(outcome)
    }

    /// Open admission proposal for `candidate`, if any
    pub fn pending_proposal(&self, candidate: &Account) -> Option<RegistrationProposal> {
        self.state.lock().registrar.proposal(candidate).cloned()
    }

    /// Candidates still waiting for admission votes
    pub fn pending_candidates(&self) -> Vec<Account> {
        self.state
            .lock()
            .registrar
            .pending_proposals()
            .map(|p| p.candidate.clone())
            .collect()
    }

    // ============ FLIGHTS ============

    /// Register a flight operated by `airline`
    #[instrument(skip(self), fields(airline = %airline, caller = %caller))]
    pub fn register_flight(
        &self,
        airline: &Account,
        code: &str,
        departure_time: i64,
        caller: &Account,
    ) -> GovernanceResult<FlightKey> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let GovernanceState { ledger, flights, .. } = &mut *state;
        let result = flights.register_flight(airline, code, departure_time, caller, ledger);
        self.audited("register_flight", caller, code, &result);
        let key = result?;

        self.journal.record(LedgerEvent::FlightRegistered {
            airline: airline.clone(),
            code: code.to_string(),
            departure_time,
            digest: key.digest_hex(),
        });
        Ok(key)
    }

    pub fn flight(&self, key: &FlightKey) -> Option<Flight> {
        self.state.lock().flights.flight(key).cloned()
    }

    pub fn flights_by_airline(&self, airline: &Account) -> Vec<Flight> {
        self.state
            .lock()
            .flights
            .flights_by_airline(airline)
            .cloned()
            .collect()
    }

    /// Ask the oracles for the status of a registered flight
    #[instrument(skip(self), fields(airline = %airline, caller = %caller))]
    pub fn fetch_flight_status(
        &self,
        airline: &Account,
        code: &str,
        departure_time: i64,
        caller: &Account,
    ) -> GovernanceResult<RequestIndex> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let GovernanceState {
            flights,
            consensus,
            oracles,
            ..
        } = &mut *state;
        let key = FlightKey::new(airline.clone(), code, departure_time);
        let mut oracle_index = 0;
        let request = flights.fetch_flight_status(&key, caller, consensus, || {
            oracle_index = oracles.random_index();
            oracle_index
        })?;

        self.journal.record(LedgerEvent::OracleRequest {
            request,
            oracle_index,
            airline: airline.clone(),
            code: code.to_string(),
            departure_time,
        });
        Ok(request)
    }

    pub fn status_request(&self, index: RequestIndex) -> Option<StatusRequest> {
        self.state.lock().consensus.request(index).cloned()
    }

    // ============ ORACLES ============

    /// Enrol an oracle; returns its assigned indexes
    #[instrument(skip(self), fields(oracle = %oracle, fee = %fee))]
    pub fn register_oracle(&self, oracle: &Account, fee: Amount) -> GovernanceResult<Vec<u8>> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let indexes = state.oracles.register_oracle(oracle, fee)?;

        self.audit
            .log_change(AuditCategory::Oracles, oracle.as_str(), oracle.as_str(), "register_oracle");
        self.journal.record(LedgerEvent::OracleRegistered {
            oracle: oracle.clone(),
            indexes: indexes.clone(),
        });
        Ok(indexes)
    }

    pub fn oracle_indexes(&self, oracle: &Account) -> Option<Vec<u8>> {
        self.state.lock().oracles.indexes(oracle).map(<[u8]>::to_vec)
    }

    /// Submit an oracle's observation for a status request
    #[instrument(skip(self), fields(oracle = %oracle, status = %status))]
    pub fn submit_oracle_response(
        &self,
        index: RequestIndex,
        oracle: &Account,
        status: FlightStatus,
    ) -> GovernanceResult<ResponseOutcome> {
        let mut state = self.state.lock();
        state.guard.require_operational()?;

        let GovernanceState {
            flights,
            consensus,
            oracles,
            ..
        } = &mut *state;

        if self.config.oracle.require_registration {
            let oracle_index = consensus.open_request_at(index)?.oracle_index;
            let result = oracles.authorize(oracle, oracle_index);
            self.audited("submit_oracle_response", oracle, &index.to_string(), &result);
            result?;
        }

        let outcome = consensus.submit_response(index, oracle, status)?;
        self.journal.record(LedgerEvent::OracleReport {
            request: index,
            oracle: oracle.clone(),
            status,
        });

        if let ResponseOutcome::Resolved { key, status } = &outcome {
            flights.set_status(key, *status)?;
            self.journal.record(LedgerEvent::FlightStatusInfo {
                request: index,
                airline: key.airline.clone(),
                code: key.code.clone(),
                departure_time: key.departure_time,
                status: *status,
            });
        }
        Ok(outcome)
    }

    // ============ JOURNAL & AUDIT ============

    /// Live stream of journal entries
    pub fn subscribe(&self) -> broadcast::Receiver<JournalEntry> {
        self.journal.subscribe()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Retained audit events, oldest first
    pub fn audit_trail(&self) -> Vec<AuditEvent> {
        self.audit_trail.events()
    }

    /// Audit authorization failures, log every other rejection
    fn audited<T>(&self, action: &str, actor: &Account, resource: &str, result: &GovernanceResult<T>) {
        if let Err(err) = result {
            if err.is_authorization() {
                self.audit
                    .log_authorization(actor.as_str(), resource, action, false, &err.to_string());
            } else {
                debug!(action, actor = %actor, error = %err, "Governance call rejected");
            }
        }
    }
}

impl std::fmt::Debug for FlightSurety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightSurety")
            .field("config", &self.config)
            .field("journal", &self.journal)
            .finish_non_exhaustive()
    }
}

impl Drop for FlightSurety {
    fn drop(&mut self) {
        let open = self.state.get_mut().consensus.open_requests().count();
        if open > 0 {
            warn!(open, "Dropping FlightSurety with unresolved status requests");
        }
    }
}
