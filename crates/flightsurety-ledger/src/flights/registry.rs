//! Flight registry
//!
//! Flights are registered by the operating airline itself, which must be
//! registered and funded. Status changes only come from resolved oracle
//! requests. Flights are never removed.

use flightsurety_common::{
    Account, Flight, FlightKey, FlightStatus, GovernanceError, GovernanceResult,
};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::consensus::{OracleConsensus, RequestIndex};
use crate::membership::MembershipLedger;

/// Registered flights keyed by (airline, code, departure time)
#[derive(Debug, Default)]
pub struct FlightRegistry {
    flights: HashMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight operated by `airline`
    pub fn register_flight(
        &mut self,
        airline: &Account,
        code: &str,
        departure_time: i64,
        caller: &Account,
        ledger: &MembershipLedger,
    ) -> GovernanceResult<FlightKey> {
        if caller != airline || !ledger.is_participating(airline) {
            return Err(GovernanceError::ProposerNotEligible {
                account: caller.clone(),
            });
        }

        let key = FlightKey::new(airline.clone(), code, departure_time);
        if self.flights.contains_key(&key) {
            return Err(GovernanceError::DuplicateFlight {
                airline: airline.clone(),
                code: code.to_string(),
                departure_time,
            });
        }

        info!(flight = %key, digest = %key.digest_hex(), "Flight registered");
        self.flights.insert(key.clone(), Flight::new(key.clone()));
        Ok(key)
    }

    /// Open a status request for a registered flight
    ///
    /// Anyone may ask; the request is resolved by oracles, not here.
    /// `oracle_index` is only drawn once the flight is known.
    pub fn fetch_flight_status<F>(
        &self,
        key: &FlightKey,
        caller: &Account,
        consensus: &mut OracleConsensus,
        oracle_index: F,
    ) -> GovernanceResult<RequestIndex>
    where
        F: FnOnce() -> u8,
    {
        if !self.flights.contains_key(key) {
            return Err(GovernanceError::UnknownRequest(format!("flight {key}")));
        }

        let oracle_index = oracle_index();
        let index = consensus.open_request(key.clone(), caller, oracle_index);
        debug!(flight = %key, requester = %caller, request = index, "Flight status requested");
        Ok(index)
    }

    /// Write a finalized status
    pub fn set_status(&mut self, key: &FlightKey, status: FlightStatus) -> GovernanceResult<()> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| GovernanceError::UnknownRequest(format!("flight {key}")))?;

        flight.set_status(status);
        info!(flight = %key, %status, "Flight status updated");
        Ok(())
    }

    pub fn flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn flights_by_airline<'a>(&'a self, airline: &'a Account) -> impl Iterator<Item = &'a Flight> + 'a {
        self.flights.values().filter(move |f| &f.key.airline == airline)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
