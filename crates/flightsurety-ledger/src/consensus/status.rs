//! Oracle consensus over flight-status requests
//!
//! A request moves `Open -> Resolved` exactly once. Responses are processed in
//! arrival order; after each one the responses reporting the same status are
//! counted, and the first status to reach the quorum wins. A request that
//! never reaches quorum stays open.

use flightsurety_common::{Account, FlightKey, FlightStatus, GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::consensus::quorum::QuorumManager;

/// Sequential identifier of a status request
pub type RequestIndex = u64;

/// Request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "status", rename_all = "snake_case")]
pub enum RequestState {
    Open,
    Resolved(FlightStatus),
}

/// Single oracle observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub oracle: Account,
    pub status: FlightStatus,
    /// Arrival timestamp (Unix milliseconds)
    pub received_at: i64,
}

/// Flight-status request collecting oracle responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub index: RequestIndex,
    pub key: FlightKey,
    /// Oracle index the request was broadcast to
    pub oracle_index: u8,
    pub requester: Account,
    /// Responses in arrival order
    pub responses: Vec<OracleResponse>,
    pub required_quorum: usize,
    pub state: RequestState,
    pub opened_at: i64,
    pub resolved_at: Option<i64>,
}

impl StatusRequest {
    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    pub fn has_responded(&self, oracle: &Account) -> bool {
        self.responses.iter().any(|r| &r.oracle == oracle)
    }

    /// Responses grouped by reported status
    pub fn tally(&self) -> BTreeMap<FlightStatus, usize> {
        let mut tally = BTreeMap::new();
        for response in &self.responses {
            *tally.entry(response.status).or_insert(0) += 1;
        }
        tally
    }

    fn matching(&self, status: FlightStatus) -> usize {
        self.responses.iter().filter(|r| r.status == status).count()
    }
}

/// Result of accepting an oracle response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Response counted, quorum not yet reached
    Recorded {
        status: FlightStatus,
        matching: usize,
        required: usize,
    },
    /// This response completed the quorum
    Resolved { key: FlightKey, status: FlightStatus },
}

/// Collects and resolves status requests
#[derive(Debug)]
pub struct OracleConsensus {
    quorum: QuorumManager,
    requests: Vec<StatusRequest>,
}

impl OracleConsensus {
    pub fn new(quorum: usize) -> Self {
        Self {
            quorum: QuorumManager::new(quorum),
            requests: Vec::new(),
        }
    }

    pub fn quorum(&self) -> usize {
        self.quorum.threshold()
    }

    /// Open a new request for `key`
    pub fn open_request(&mut self, key: FlightKey, requester: &Account, oracle_index: u8) -> RequestIndex {
        let index = self.requests.len() as RequestIndex;
        debug!(request = index, flight = %key, oracle_index, "Status request opened");

        self.requests.push(StatusRequest {
            index,
            key,
            oracle_index,
            requester: requester.clone(),
            responses: Vec::new(),
            required_quorum: self.quorum.threshold(),
            state: RequestState::Open,
            opened_at: chrono::Utc::now().timestamp_millis(),
            resolved_at: None,
        });

        index
    }

    pub fn request(&self, index: RequestIndex) -> Option<&StatusRequest> {
        usize::try_from(index).ok().and_then(|i| self.requests.get(i))
    }

    /// Request that still accepts responses
    pub fn open_request_at(&self, index: RequestIndex) -> GovernanceResult<&StatusRequest> {
        let request = self
            .request(index)
            .ok_or_else(|| GovernanceError::UnknownRequest(format!("status request {index}")))?;

        if !request.is_open() {
            return Err(GovernanceError::AlreadyResolved { request: index });
        }
        Ok(request)
    }

    /// Requests that have not reached quorum
    pub fn open_requests(&self) -> impl Iterator<Item = &StatusRequest> {
        self.requests.iter().filter(|r| r.is_open())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Accept a response from `oracle`
    pub fn submit_response(
        &mut self,
        index: RequestIndex,
        oracle: &Account,
        status: FlightStatus,
    ) -> GovernanceResult<ResponseOutcome> {
        self.open_request_at(index)?;

        let quorum = self.quorum;
        let request = usize::try_from(index)
            .ok()
            .and_then(|i| self.requests.get_mut(i))
            .ok_or_else(|| GovernanceError::UnknownRequest(format!("status request {index}")))?;

        if request.has_responded(oracle) {
            return Err(GovernanceError::DuplicateResponse {
                oracle: oracle.clone(),
                request: index,
            });
        }

        request.responses.push(OracleResponse {
            oracle: oracle.clone(),
            status,
            received_at: chrono::Utc::now().timestamp_millis(),
        });

        let matching = request.matching(status);
        debug!(request = index, oracle = %oracle, %status, matching, "Oracle response recorded");

        if quorum.is_reached(matching) {
            request.state = RequestState::Resolved(status);
            request.resolved_at = Some(chrono::Utc::now().timestamp_millis());
            info!(request = index, flight = %request.key, %status, responses = request.responses.len(), "Status request resolved");
            return Ok(ResponseOutcome::Resolved {
                key: request.key.clone(),
                status,
            });
        }

        Ok(ResponseOutcome::Recorded {
            status,
            matching,
            required: quorum.threshold(),
        })
    }
}
