use std::sync::Arc;

use crate::primitives::alloc::RecAlloc;
use crate::primitives::diag::DiagSink;

use super::metrics::RecMetrics;

/// Configuration options supplied when creating a [`super::RecStore`].
#[derive(Clone, Default)]
pub struct RecOptions {
    /// Payload allocator. Defaults to a heap allocator bounded by `byte_limit`.
    pub alloc: Option<Arc<dyn RecAlloc>>,
    /// Budget in payload bytes for the default allocator.
    pub byte_limit: Option<u64>,
    /// Sink for advisory diagnostics. Defaults to `tracing`.
    pub diagnostics: Option<Arc<dyn DiagSink>>,
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn RecMetrics>>,
    /// Whether to verify an entity's record list after every mutation.
    pub verify_on_mutation: bool,
    /// Number of record slots reserved up front.
    pub initial_capacity: usize,
}

impl RecOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            verify_on_mutation: cfg!(debug_assertions),
            ..Self::default()
        }
    }

    /// Sets the payload allocator.
    pub fn alloc(mut self, alloc: Arc<dyn RecAlloc>) -> Self {
        self.alloc = Some(alloc);
        self
    }

    /// Bounds the default allocator to `bytes` live payload bytes.
    pub fn byte_limit(mut self, bytes: u64) -> Self {
        self.byte_limit = Some(bytes);
        self
    }

    /// Sets the diagnostic sink.
    pub fn diagnostics(mut self, sink: Arc<dyn DiagSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn RecMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Enables or disables list verification after each mutation.
    pub fn verify_on_mutation(mut self, enabled: bool) -> Self {
        self.verify_on_mutation = enabled;
        self
    }

    /// Reserves arena slots for `records` records.
    pub fn initial_capacity(mut self, records: usize) -> Self {
        self.initial_capacity = records;
        self
    }
}
