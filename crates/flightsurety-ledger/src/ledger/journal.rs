//! Event journal for governance state changes
//!
//! Provides an append-only, sequenced record of every successful mutation:
//! - Sequence numbers follow the order in which operations were applied and
//!   keep counting after old entries are evicted
//! - Subscribers receive entries over a broadcast channel (off-chain oracles
//!   listen for `OracleRequest` here)
//! - Entries can be exported as JSON lines for an external store

use flightsurety_common::{Account, Amount, FlightStatus, Result};
use parking_lot::RwLock;
use std::collections::VecDeque;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::consensus::RequestIndex;

/// Event types recorded in the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    /// Gate switched by the owner or by airline vote
    OperationalStatusChanged { operational: bool, changed_by: Account },
    /// Airline voted on the gate without reaching majority
    OperatingVoteRecorded {
        target: bool,
        voter: Account,
        votes: usize,
        required: usize,
    },
    /// Airline admitted to the consortium
    AirlineRegistered {
        airline: Account,
        proposer: Account,
        votes: usize,
    },
    /// Admission vote recorded, candidate still pending
    AirlineVoteRecorded {
        candidate: Account,
        voter: Account,
        votes: usize,
        required: usize,
    },
    /// Funding contribution accepted
    AirlineFunded {
        airline: Account,
        amount: Amount,
        total: Amount,
    },
    /// Flight registered by its airline
    FlightRegistered {
        airline: Account,
        code: String,
        departure_time: i64,
        digest: String,
    },
    /// Oracle enrolled
    OracleRegistered { oracle: Account, indexes: Vec<u8> },
    /// Status request opened; oracles holding `oracle_index` should answer
    OracleRequest {
        request: RequestIndex,
        oracle_index: u8,
        airline: Account,
        code: String,
        departure_time: i64,
    },
    /// Oracle response accepted
    OracleReport {
        request: RequestIndex,
        oracle: Account,
        status: FlightStatus,
    },
    /// Quorum reached, flight status finalized
    FlightStatusInfo {
        request: RequestIndex,
        airline: Account,
        code: String,
        departure_time: i64,
        status: FlightStatus,
    },
}

impl LedgerEvent {
    /// Event name as written to the `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::OperationalStatusChanged { .. } => "OperationalStatusChanged",
            LedgerEvent::OperatingVoteRecorded { .. } => "OperatingVoteRecorded",
            LedgerEvent::AirlineRegistered { .. } => "AirlineRegistered",
            LedgerEvent::AirlineVoteRecorded { .. } => "AirlineVoteRecorded",
            LedgerEvent::AirlineFunded { .. } => "AirlineFunded",
            LedgerEvent::FlightRegistered { .. } => "FlightRegistered",
            LedgerEvent::OracleRegistered { .. } => "OracleRegistered",
            LedgerEvent::OracleRequest { .. } => "OracleRequest",
            LedgerEvent::OracleReport { .. } => "OracleReport",
            LedgerEvent::FlightStatusInfo { .. } => "FlightStatusInfo",
        }
    }
}

/// Sequenced journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    /// Recording timestamp (Unix milliseconds)
    pub recorded_at: i64,
    pub event: LedgerEvent,
}

/// Retained entries and the next sequence number
struct JournalLog {
    entries: VecDeque<JournalEntry>,
    next_sequence: u64,
}

/// Bounded journal with broadcast subscription
pub struct EventJournal {
    log: RwLock<JournalLog>,
    retained_entries: usize,
    sender: broadcast::Sender<JournalEntry>,
}

impl EventJournal {
    /// Create a journal keeping the latest `retained_entries` entries
    ///
    /// Subscribers buffer up to `channel_capacity` entries. Both must be
    /// non-zero; `FlightSuretyConfig::validate` checks this.
    pub(crate) fn new(channel_capacity: usize, retained_entries: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        Self {
            log: RwLock::new(JournalLog {
                entries: VecDeque::with_capacity(retained_entries.min(1024)),
                next_sequence: 0,
            }),
            retained_entries,
            sender,
        }
    }

    /// Append an event and notify subscribers
    pub fn record(&self, event: LedgerEvent) -> u64 {
        let mut log = self.log.write();
        let entry = JournalEntry {
            sequence: log.next_sequence,
            recorded_at: chrono::Utc::now().timestamp_millis(),
            event,
        };
        log.next_sequence += 1;
        let sequence = entry.sequence;
        trace!(sequence, event = entry.event.name(), "Journal entry recorded");

        // Err only means nobody is subscribed.
        let _ = self.sender.send(entry.clone());

        while log.entries.len() >= self.retained_entries {
            log.entries.pop_front();
        }
        log.entries.push_back(entry);
        sequence
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JournalEntry> {
        self.sender.subscribe()
    }

    /// Snapshot of retained entries in sequence order
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.log.read().entries.iter().cloned().collect()
    }

    /// Retained entries
    pub fn len(&self) -> usize {
        self.log.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().entries.is_empty()
    }

    /// Entries ever recorded, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.log.read().next_sequence
    }

    /// One JSON document per line, in sequence order
    pub fn export_json_lines(&self) -> Result<String> {
        let log = self.log.read();
        let mut out = String::new();
        for entry in log.entries.iter() {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl std::fmt::Debug for EventJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventJournal")
            .field("entries", &self.len())
            .field("retained_entries", &self.retained_entries)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn funded(airline: &str) -> LedgerEvent {
        LedgerEvent::AirlineFunded {
            airline: Account::from(airline),
            amount: dec!(10),
            total: dec!(10),
        }
    }

    #[test]
    fn test_sequence_numbers() {
        let journal = EventJournal::new(16, 16);
        assert_eq!(journal.record(funded("0xa1")), 0);
        assert_eq!(journal.record(funded("0xa2")), 1);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.entries()[1].event, funded("0xa2"));
    }

    #[test]
    fn test_json_lines_export() {
        let journal = EventJournal::new(16, 16);
        journal.record(funded("0xa1"));
        journal.record(LedgerEvent::OracleReport {
            request: 3,
            oracle: Account::from("0xoracle"),
            status: FlightStatus::LateAirline,
        });

        let exported = journal.export_json_lines().unwrap();
        let lines: Vec<&str> = exported.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"AirlineFunded\""));
        assert!(lines[1].contains("\"late_airline\""));

        let back: JournalEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back.sequence, 1);
    }

    #[test]
    fn test_subscribers_receive_entries() {
        let journal = EventJournal::new(16, 16);
        let mut receiver = journal.subscribe();
        journal.record(funded("0xa1"));

        let entry = receiver.try_recv().unwrap();
        assert_eq!(entry.sequence, 0);
        assert_eq!(entry.event.name(), "AirlineFunded");
    }

    #[test]
    fn test_oldest_entries_evicted() {
        let journal = EventJournal::new(16, 3);
        for n in 0..5 {
            journal.record(funded(&format!("0xa{n}")));
        }

        let entries = journal.entries();
        assert_eq!(journal.len(), 3);
        assert_eq!(journal.total_recorded(), 5);
        let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);
        assert_eq!(entries[0].event, funded("0xa2"));
        assert_eq!(journal.record(funded("0xa5")), 5);
    }
}
