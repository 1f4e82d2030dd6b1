use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking record store operations.
///
/// Implementations collect statistics about lookups, move-to-front promotions
/// and record lifetimes. This information can be used for monitoring and for
/// judging how well the front cache works for a given access pattern.
pub trait RecMetrics: Send + Sync {
    /// Records a lookup and whether it found the record.
    fn lookup(&self, hit: bool);

    /// Records a move-to-front promotion that changed an entity's header.
    fn promoted(&self);

    /// Records a promoting lookup refused by the move-to-front lock.
    fn lock_inconsistency(&self);

    /// Records the creation of a record.
    fn record_created(&self);

    /// Records the deletion of a single record.
    fn record_deleted(&self);

    /// Records records released by an entity teardown.
    fn records_torn_down(&self, count: u64);
}

/// A no-op implementation of [`RecMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl RecMetrics for NoopMetrics {
    fn lookup(&self, _hit: bool) {}
    fn promoted(&self) {}
    fn lock_inconsistency(&self) {}
    fn record_created(&self) {}
    fn record_deleted(&self) {}
    fn records_torn_down(&self, _count: u64) {}
}

/// Counter-based implementation of [`RecMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of lookups performed.
    pub lookups: AtomicU64,

    /// Number of lookups that found their record.
    pub hits: AtomicU64,

    /// Number of promotions that rewrote a header.
    pub promotions: AtomicU64,

    /// Number of promotions refused by the lock.
    pub lock_inconsistencies: AtomicU64,

    /// Number of records created.
    pub records_created: AtomicU64,

    /// Number of records deleted by name.
    pub records_deleted: AtomicU64,

    /// Number of records released by teardown.
    pub records_torn_down: AtomicU64,
}

/// Plain copy of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub lookups: u64,
    pub hits: u64,
    pub promotions: u64,
    pub lock_inconsistencies: u64,
    pub records_created: u64,
    pub records_deleted: u64,
    pub records_torn_down: u64,
}

impl CounterMetrics {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            lock_inconsistencies: self.lock_inconsistencies.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            records_torn_down: self.records_torn_down.load(Ordering::Relaxed),
        }
    }
}

impl RecMetrics for CounterMetrics {
    fn lookup(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn promoted(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    fn lock_inconsistency(&self) {
        self.lock_inconsistencies.fetch_add(1, Ordering::Relaxed);
    }

    fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    fn record_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    fn records_torn_down(&self, count: u64) {
        self.records_torn_down.fetch_add(count, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
///
/// The default implementation is [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn RecMetrics> {
    Arc::new(NoopMetrics)
}
