use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub use witchcraft_metrics::{Counter, MetricRegistry};

/// Counters describing the work done by scans.
///
/// Scans sharing a [`ScanMetrics`] (or built from the same registry) add to the same counters.
#[derive(Clone)]
pub struct ScanMetrics {
    registry: Arc<MetricRegistry>,
    records_read: Arc<Counter>,
    records_matched: Arc<Counter>,
    records_skipped: Arc<Counter>,
    values_skipped: Arc<Counter>,
}

impl ScanMetrics {
    pub fn new(registry: Arc<MetricRegistry>) -> Self {
        Self {
            records_read: registry.counter("scan.records.read"),
            records_matched: registry.counter("scan.records.matched"),
            records_skipped: registry.counter("scan.records.skipped"),
            values_skipped: registry.counter("scan.values.skipped"),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    /// Records visited, whether or not they matched.
    pub fn records_read(&self) -> i64 {
        self.records_read.count()
    }

    pub fn records_matched(&self) -> i64 {
        self.records_matched.count()
    }

    /// Records rejected by the filter.
    pub fn records_skipped(&self) -> i64 {
        self.records_skipped.count()
    }

    /// Triples of rejected records that were stepped over.
    pub fn values_skipped(&self) -> i64 {
        self.values_skipped.count()
    }

    pub(crate) fn record_read(&self) {
        self.records_read.inc();
    }

    pub(crate) fn record_matched(&self) {
        self.records_matched.inc();
    }

    pub(crate) fn record_skipped(&self, values: usize) {
        self.records_skipped.inc();
        self.values_skipped
            .add(i64::try_from(values).unwrap_or(i64::MAX));
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new(Arc::new(MetricRegistry::default()))
    }
}

impl Debug for ScanMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanMetrics")
            .field("records_read", &self.records_read())
            .field("records_matched", &self.records_matched())
            .field("records_skipped", &self.records_skipped())
            .field("values_skipped", &self.values_skipped())
            .finish()
    }
}
