//! Record storage attached to graph entities.
//!
//! Implements the per-entity circular record lists, the edge mirror rule, the
//! bulk lifecycle passes and the in-memory host graph they run against.

/// String interning for record names.
///
/// Maps every distinct name to one canonical id with reference counting.
pub mod catalog;

/// Host graph structure.
///
/// The traversal trait the store is generic over and its in-memory implementation.
pub mod graph;

mod bulk;
mod metrics;
mod mirror;
mod options;
mod record;
mod store;

/// Main record store interface.
pub use store::{RecStore, Records};

/// Bulk lifecycle configuration.
pub use bulk::InitSpec;

pub use graph::{MemGraph, Structure};

/// Per-entity record header.
pub use record::RecHeader;

pub use mirror::check_mirror;

/// Metrics and profiling.
pub use metrics::{default_metrics, CounterMetrics, CounterSnapshot, NoopMetrics, RecMetrics};

/// Record store configuration options.
pub use options::RecOptions;
