//! Core data types for FlightSurety

pub mod account;
pub mod airline;
pub mod flight;
