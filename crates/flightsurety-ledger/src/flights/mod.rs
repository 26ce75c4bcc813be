//! Flight registration and status

pub mod registry;

pub use registry::FlightRegistry;
