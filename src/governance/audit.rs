/*!
 * Governance Audit
 * Audit records for governance decisions and a bounded in-memory sink
 */

use crate::governance::types::{GovernanceMode, RedactionLevel};
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::time::SystemTime;
use thiserror::Error;

/// Default capacity of the in-memory ring buffer.
const MAX_AUDIT_RECORDS: usize = 4096;

/// Failure to persist an audit record.
///
/// Audit failures never block or alter the governance decision they
/// describe; the engine logs them and moves on.
#[derive(Debug, Error)]
#[error("failed to write audit record: {0}")]
pub struct AuditError(pub String);

/// One governance evaluation, as written to the audit sink.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub route: String,
    pub classification: String,
    pub mode: GovernanceMode,
    pub require_content_encryption: bool,
    pub encrypt_logs: bool,
    pub redaction: RedactionLevel,
    pub retention_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub recorded_at: SystemTime,
}

/// Destination for governance audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Bounded in-memory audit sink with per-route counters.
///
/// The ring buffer keeps the most recent records; counters are monotonic and
/// survive trimming. Built-in sink for tests and diagnostics — production
/// deployments plug their own persistence behind [`AuditSink`].
pub struct MemoryAuditSink {
    records: RwLock<VecDeque<AuditRecord>>,
    route_counts: DashMap<String, u64, RandomState>,
    capacity: usize,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::with_capacity(MAX_AUDIT_RECORDS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity.min(MAX_AUDIT_RECORDS))),
            route_counts: DashMap::with_hasher(RandomState::new()),
            capacity,
        }
    }

    /// Most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditRecord> {
        let records = self.records.read();
        records.iter().rev().take(limit).cloned().collect()
    }

    /// Total records ever written for a route.
    pub fn count_for_route(&self, route: &str) -> u64 {
        self.route_counts.get(route).map(|e| *e).unwrap_or(0)
    }

    pub fn stats(&self) -> AuditStats {
        AuditStats {
            buffered_records: self.records.read().len(),
            total_records: self.route_counts.iter().map(|e| *e.value()).sum(),
            routes_tracked: self.route_counts.len(),
        }
    }

    pub fn clear(&self) {
        self.records.write().clear();
        self.route_counts.clear();
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        {
            let mut records = self.records.write();
            if records.len() >= self.capacity {
                records.pop_front();
            }
            records.push_back(record.clone());
        }
        self.route_counts
            .entry(record.route.clone())
            .and_modify(|count| *count += 1)
            .or_insert(1);
        Ok(())
    }
}

/// Audit sink statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub buffered_records: usize,
    pub total_records: u64,
    pub routes_tracked: usize,
}
