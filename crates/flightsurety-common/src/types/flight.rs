//! Flights and their oracle-reported status

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::account::Account;

/// Flight status as reported by oracles
///
/// Discriminants are the status codes oracles exchange with the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FlightStatus {
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl FlightStatus {
    /// All statuses in code order
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Numeric status code
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightStatus::Unknown => write!(f, "unknown"),
            FlightStatus::OnTime => write!(f, "on_time"),
            FlightStatus::LateAirline => write!(f, "late_airline"),
            FlightStatus::LateWeather => write!(f, "late_weather"),
            FlightStatus::LateTechnical => write!(f, "late_technical"),
            FlightStatus::LateOther => write!(f, "late_other"),
        }
    }
}

/// Status code outside the known set
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid flight status code: {0}")]
pub struct InvalidStatusCode(pub u8);

impl TryFrom<u8> for FlightStatus {
    type Error = InvalidStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(InvalidStatusCode(code))
    }
}

/// Unique flight identity: (airline, flight code, departure time)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Account,
    pub code: String,
    /// Scheduled departure (Unix seconds)
    pub departure_time: i64,
}

impl FlightKey {
    pub fn new(airline: Account, code: impl Into<String>, departure_time: i64) -> Self {
        Self {
            airline,
            code: code.into(),
            departure_time,
        }
    }

    /// Stable 32-byte digest of the key
    ///
    /// Fields are length-prefixed so that distinct keys never share an encoding.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.airline.as_str().len() as u64).to_le_bytes());
        hasher.update(self.airline.as_ref());
        hasher.update(&(self.code.len() as u64).to_le_bytes());
        hasher.update(self.code.as_bytes());
        hasher.update(&self.departure_time.to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Hex form of [`FlightKey::digest`], used in logs and journal events
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

impl std::fmt::Display for FlightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.code, self.departure_time)
    }
}

/// Registered flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,

    /// Last finalized status
    pub status: FlightStatus,

    /// Registration timestamp (Unix milliseconds)
    pub registered_at: i64,

    /// Timestamp of the last status change
    pub updated_at: i64,
}

impl Flight {
    /// New flight with status `Unknown`
    pub fn new(key: FlightKey) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            key,
            status: FlightStatus::Unknown,
            registered_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: FlightStatus) {
        self.status = status;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}
