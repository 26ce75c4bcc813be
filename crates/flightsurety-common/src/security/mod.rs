//! Security primitives for FlightSurety

pub mod audit;

pub use audit::{
    AuditCategory, AuditEvent, AuditLogger, AuditOutcome, AuditSeverity, AuditSink,
    MemoryAuditSink, TracingAuditSink,
};
