//! Governance Audit Trail
//!
//! Records security-relevant governance decisions:
//! - Authorization failures (non-owner gate changes, ineligible proposers)
//! - Operating status changes
//! - Membership admissions and funding
//! - Oracle enrolment

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuditSeverity {
    /// Informational - normal operation
    Info,
    /// Warning - rejected call
    Warning,
    /// Critical - governance incident
    Critical,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditSeverity::Info => write!(f, "INFO"),
            AuditSeverity::Warning => write!(f, "WARN"),
            AuditSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Audit event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditCategory {
    /// Authorization decisions
    Authorization,
    /// Operating status gate
    Operations,
    /// Airline admission
    Membership,
    /// Airline funding
    Funding,
    /// Oracle enrolment
    Oracles,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditCategory::Authorization => write!(f, "AUTHZ"),
            AuditCategory::Operations => write!(f, "OPS"),
            AuditCategory::Membership => write!(f, "MEMBER"),
            AuditCategory::Funding => write!(f, "FUND"),
            AuditCategory::Oracles => write!(f, "ORACLE"),
        }
    }
}

/// Audit outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub event_id: String,

    /// Timestamp (Unix millis)
    pub timestamp: i64,

    pub severity: AuditSeverity,

    pub category: AuditCategory,

    /// Operation name (e.g. "register_airline", "set_operating_status")
    pub action: String,

    pub outcome: AuditOutcome,

    /// Calling account
    pub actor: Option<String>,

    /// Target of the operation (airline, flight key, request index)
    pub resource: Option<String>,

    /// Additional details
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(category: AuditCategory, action: &str, outcome: AuditOutcome) -> Self {
        Self {
            event_id: uuid::Uuid::now_v7().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            severity: match outcome {
                AuditOutcome::Success => AuditSeverity::Info,
                AuditOutcome::Failure => AuditSeverity::Warning,
            },
            category,
            action: action.to_string(),
            outcome,
            actor: None,
            resource: None,
            details: HashMap::new(),
        }
    }

    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = Some(resource.to_string());
        self
    }

    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Audit log sink
pub trait AuditSink: Send + Sync {
    /// Write an audit event
    fn write(&self, event: &AuditEvent);
}

/// Sink that forwards events to `tracing`
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, event: &AuditEvent) {
        let log_line = format!(
            "[{}] {} {} {} - actor={} resource={} outcome={:?}",
            event.severity,
            event.category,
            event.action,
            event.event_id,
            event.actor.as_deref().unwrap_or("-"),
            event.resource.as_deref().unwrap_or("-"),
            event.outcome,
        );

        match event.severity {
            AuditSeverity::Info => info!("{}", log_line),
            AuditSeverity::Warning => warn!("{}", log_line),
            AuditSeverity::Critical => error!("CRITICAL: {}", log_line),
        }
    }
}

/// Bounded in-memory sink, oldest events are dropped first
pub struct MemoryAuditSink {
    events: RwLock<VecDeque<AuditEvent>>,
    capacity: usize,
}

impl MemoryAuditSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Snapshot of retained events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, event: &AuditEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.write();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// Audit logger fanning events out to its sinks
pub struct AuditLogger {
    sinks: Vec<Arc<dyn AuditSink>>,
    min_severity: AuditSeverity,
}

impl AuditLogger {
    /// Logger writing to `tracing` only
    pub fn new() -> Self {
        Self {
            sinks: vec![Arc::new(TracingAuditSink)],
            min_severity: AuditSeverity::Info,
        }
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn set_min_severity(&mut self, severity: AuditSeverity) {
        self.min_severity = severity;
    }

    /// Log an audit event
    pub fn log(&self, event: AuditEvent) {
        if event.severity < self.min_severity {
            return;
        }
        for sink in &self.sinks {
            sink.write(&event);
        }
    }

    /// Log an authorization decision
    pub fn log_authorization(&self, actor: &str, resource: &str, action: &str, allowed: bool, reason: &str) {
        let outcome = if allowed {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        };

        let mut event = AuditEvent::new(AuditCategory::Authorization, action, outcome)
            .with_actor(actor)
            .with_resource(resource);

        if !allowed {
            event = event.with_detail("reason", reason);
        }

        self.log(event);
    }

    /// Log a successful governance state change
    pub fn log_change(&self, category: AuditCategory, actor: &str, resource: &str, action: &str) {
        let event = AuditEvent::new(category, action, AuditOutcome::Success)
            .with_actor(actor)
            .with_resource(resource);

        self.log(event);
    }

    /// Log an operating status change
    pub fn log_operating_status(&self, actor: &str, old_value: bool, new_value: bool, via: &str) {
        // Pausing is always critical.
        let severity = if new_value {
            AuditSeverity::Info
        } else {
            AuditSeverity::Critical
        };

        let event = AuditEvent::new(AuditCategory::Operations, "set_operating_status", AuditOutcome::Success)
            .with_severity(severity)
            .with_actor(actor)
            .with_detail("old_value", &old_value.to_string())
            .with_detail("new_value", &new_value.to_string())
            .with_detail("via", via);

        self.log(event);
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_creation() {
        let event = AuditEvent::new(AuditCategory::Membership, "register_airline", AuditOutcome::Success)
            .with_actor("0xowner")
            .with_resource("0xairline")
            .with_detail("outcome", "admitted");

        assert_eq!(event.category, AuditCategory::Membership);
        assert_eq!(event.action, "register_airline");
        assert_eq!(event.severity, AuditSeverity::Info);
        assert_eq!(event.actor, Some("0xowner".to_string()));
        assert_eq!(event.details.get("outcome"), Some(&"admitted".to_string()));
    }

    #[test]
    fn test_audit_event_json() {
        let event = AuditEvent::new(AuditCategory::Authorization, "fund", AuditOutcome::Failure)
            .with_resource("0xairline");

        let json = event.to_json();
        assert!(json.contains("Authorization"));
        assert!(json.contains("fund"));
    }

    #[test]
    fn test_memory_sink_is_bounded() {
        let sink = Arc::new(MemoryAuditSink::new(2));
        let mut logger = AuditLogger::new();
        logger.add_sink(sink.clone());

        logger.log_authorization("0xa", "gate", "set_operating_status", false, "not owner");
        logger.log_change(AuditCategory::Funding, "0xb", "0xb", "fund");
        logger.log_operating_status("0xowner", true, false, "owner");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category, AuditCategory::Funding);
        assert_eq!(events[1].severity, AuditSeverity::Critical);
    }

    #[test]
    fn test_min_severity_filters() {
        let sink = Arc::new(MemoryAuditSink::new(8));
        let mut logger = AuditLogger::new();
        logger.add_sink(sink.clone());
        logger.set_min_severity(AuditSeverity::Warning);

        logger.log_change(AuditCategory::Membership, "0xowner", "0xairline", "register_airline");
        logger.log_authorization("0xa", "0xb", "register_airline", false, "not funded");

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AuditSeverity::Info < AuditSeverity::Warning);
        assert!(AuditSeverity::Warning < AuditSeverity::Critical);
    }
}
