use std::time::{Duration, Instant};

use metrics::{counter, histogram};

use crate::models::EntityKind;
use crate::repository::Collection;

/// Metric names emitted by the tracker
pub struct MetricNames;

impl MetricNames {
    /// Store mutations, labelled by `kind` and `operation`
    pub const MUTATIONS_TOTAL: &'static str = "job_tracker_mutations_total";
    /// Companies created by reconciliation
    pub const COMPANIES_RECONCILED_TOTAL: &'static str = "job_tracker_companies_reconciled_total";
    /// Time spent writing one slot, labelled by `collection`
    pub const PERSIST_DURATION: &'static str = "job_tracker_persist_duration_seconds";
    /// Failed slot writes, labelled by `collection`
    pub const PERSIST_ERRORS_TOTAL: &'static str = "job_tracker_persist_errors_total";
    /// Records moved by export or import, labelled by `direction`
    pub const TRANSFER_RECORDS_TOTAL: &'static str = "job_tracker_transfer_records_total";
}

/// Record one store mutation
pub fn record_mutation(kind: EntityKind, operation: &'static str) {
    counter!(MetricNames::MUTATIONS_TOTAL, "kind" => kind.as_str(), "operation" => operation).increment(1);
}

/// Record a company created by reconciliation
pub fn record_company_reconciled() {
    counter!(MetricNames::COMPANIES_RECONCILED_TOTAL).increment(1);
}

/// Record records exported or imported
pub fn record_transfer(direction: &'static str, records: usize) {
    counter!(MetricNames::TRANSFER_RECORDS_TOTAL, "direction" => direction).increment(records as u64);
}

/// Timer for one slot write
pub struct PersistTimer {
    collection: Collection,
    start: Instant,
}

impl PersistTimer {
    /// Start timing a write of `collection`
    #[must_use]
    pub fn start(collection: Collection) -> Self {
        Self {
            collection,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the outcome
    pub fn finish(self, success: bool) -> Duration {
        let duration = self.start.elapsed();
        let name = self.collection.name();
        histogram!(MetricNames::PERSIST_DURATION, "collection" => name).record(duration.as_secs_f64());
        if !success {
            counter!(MetricNames::PERSIST_ERRORS_TOTAL, "collection" => name).increment(1);
        }
        duration
    }
}
