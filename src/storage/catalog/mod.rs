#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::types::{RecError, Result, StrId};

#[derive(Default)]
pub struct InternMetrics {
    intern_calls: AtomicU64,
    intern_hits: AtomicU64,
    intern_misses: AtomicU64,
    releases: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InternMetricsSnapshot {
    pub intern_calls: u64,
    pub intern_hits: u64,
    pub intern_misses: u64,
    pub releases: u64,
    pub evictions: u64,
}

impl InternMetricsSnapshot {
    pub fn intern_hit_rate(&self) -> f64 {
        if self.intern_calls == 0 {
            return 0.0;
        }
        self.intern_hits as f64 / self.intern_calls as f64
    }
}

impl InternMetrics {
    pub fn snapshot(&self) -> InternMetricsSnapshot {
        InternMetricsSnapshot {
            intern_calls: self.intern_calls.load(Ordering::Relaxed),
            intern_hits: self.intern_hits.load(Ordering::Relaxed),
            intern_misses: self.intern_misses.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct StrEntry {
    text: Box<str>,
    refs: u32,
}

/// Reference-counted string interner.
///
/// Every distinct string maps to one canonical [`StrId`] for as long as at
/// least one holder has not released it. Ids of evicted strings are recycled.
#[derive(Default)]
pub struct Interner {
    by_text: FxHashMap<Box<str>, StrId>,
    entries: Vec<Option<StrEntry>>,
    free: Vec<u32>,
    metrics: InternMetrics,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics_snapshot(&self) -> InternMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of distinct live strings.
    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }

    /// Looks up the canonical id for `s` without taking a reference.
    pub fn lookup(&self, s: &str) -> Option<StrId> {
        self.by_text.get(s).copied()
    }

    /// Returns the canonical id for `s`, taking one reference on it.
    pub fn intern(&mut self, s: &str) -> StrId {
        self.metrics.inc(&self.metrics.intern_calls);
        if let Some(&id) = self.by_text.get(s) {
            if let Some(entry) = self.entries[id.0 as usize].as_mut() {
                entry.refs += 1;
                self.metrics.inc(&self.metrics.intern_hits);
                trace!(len = s.len(), id = id.0, refs = entry.refs, "intern.hit");
                return id;
            }
        }
        self.metrics.inc(&self.metrics.intern_misses);
        let entry = StrEntry {
            text: s.into(),
            refs: 1,
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(entry);
                StrId(slot)
            }
            None => {
                self.entries.push(Some(entry));
                StrId((self.entries.len() - 1) as u32)
            }
        };
        self.by_text.insert(s.into(), id);
        trace!(len = s.len(), id = id.0, "intern.insert");
        id
    }

    pub fn resolve(&self, id: StrId) -> Option<&str> {
        self.entries
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|entry| &*entry.text)
    }

    /// Current reference count of `id`, zero when it is not live.
    pub fn refs(&self, id: StrId) -> u32 {
        self.entries
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map_or(0, |entry| entry.refs)
    }

    /// Drops one reference on `id`, evicting the string when none remain.
    pub fn release(&mut self, id: StrId) -> Result<()> {
        let slot = self
            .entries
            .get_mut(id.0 as usize)
            .ok_or(RecError::Corruption("release of unknown string id"))?;
        let entry = slot
            .as_mut()
            .ok_or(RecError::Corruption("release of evicted string id"))?;
        self.metrics.inc(&self.metrics.releases);
        entry.refs -= 1;
        if entry.refs > 0 {
            return Ok(());
        }
        if let Some(entry) = slot.take() {
            self.by_text.remove(&entry.text);
            self.free.push(id.0);
            self.metrics.inc(&self.metrics.evictions);
            trace!(id = id.0, "intern.evict");
        }
        Ok(())
    }
}
