#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{RecError, Result};
use tracing::{debug, trace};

/// Storage provider for record payloads.
///
/// A store asks for a block when a record is first bound and hands the same
/// block back exactly once, when the record is deleted or torn down.
pub trait RecAlloc: Send + Sync {
    /// Returns a zero-filled block of `size` bytes.
    fn alloc(&self, size: u32) -> Result<Box<[u8]>>;

    /// Takes back a block previously returned by [`RecAlloc::alloc`].
    fn free(&self, block: Box<[u8]>);
}

/// Point-in-time view of [`HeapAlloc`] counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    /// Bytes currently handed out.
    pub live_bytes: u64,
    /// Successful allocations.
    pub allocs: u64,
    /// Blocks returned.
    pub frees: u64,
    /// Allocations refused because of the byte limit.
    pub failures: u64,
}

/// Heap-backed allocator with an optional budget on live bytes.
#[derive(Debug, Default)]
pub struct HeapAlloc {
    limit: Option<u64>,
    live: AtomicU64,
    allocs: AtomicU64,
    frees: AtomicU64,
    failures: AtomicU64,
}

impl HeapAlloc {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn live_bytes(&self) -> u64 {
        self.live.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            live_bytes: self.live.load(Ordering::Relaxed),
            allocs: self.allocs.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl RecAlloc for HeapAlloc {
    fn alloc(&self, size: u32) -> Result<Box<[u8]>> {
        let limit = self.limit;
        let reserved = self
            .live
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
                let next = live.checked_add(u64::from(size))?;
                match limit {
                    Some(max) if next > max => None,
                    _ => Some(next),
                }
            });
        if reserved.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            debug!(size, ?limit, "record allocation refused");
            return Err(RecError::AllocFailed {
                requested: size,
                limit,
            });
        }
        self.allocs.fetch_add(1, Ordering::Relaxed);
        trace!(size, "record block allocated");
        Ok(vec![0u8; size as usize].into_boxed_slice())
    }

    fn free(&self, block: Box<[u8]>) {
        self.live.fetch_sub(block.len() as u64, Ordering::Relaxed);
        self.frees.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default allocator: an unbounded [`HeapAlloc`].
pub fn default_alloc() -> Arc<dyn RecAlloc> {
    Arc::new(HeapAlloc::default())
}
