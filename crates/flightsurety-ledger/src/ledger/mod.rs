//! Ledger module - journal of governance events

pub mod journal;

pub use journal::{EventJournal, JournalEntry, LedgerEvent};
