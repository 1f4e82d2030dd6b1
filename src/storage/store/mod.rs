#![forbid(unsafe_code)]

//! Record list manager.
//!
//! Each entity owns a circular singly linked list of named records. The
//! entity's [`RecHeader`] caches the list's front. While the entity is
//! unlocked every successful lookup moves the found record to the front; a
//! promoting lookup also sets the move-to-front lock, after which the front
//! only changes when the record it points at is deleted.


use std::sync::Arc;

use tracing::{error, trace};

use crate::admin::verify::verify_entity;
use crate::primitives::alloc::{default_alloc, HeapAlloc, RecAlloc};
use crate::primitives::diag::{default_sink, DiagSink, Diagnostic};
use crate::storage::catalog::{Interner, InternMetricsSnapshot};
use crate::storage::graph::Structure;
use crate::storage::metrics::{default_metrics, RecMetrics};
use crate::storage::mirror::set_data;
use crate::storage::options::RecOptions;
use crate::storage::record::{RecArena, RecHeader, Record};
use crate::types::{ObjKind, ObjRef, RecError, RecId, Result, StrId};

/// Named record storage for the entities of one graph hierarchy.
///
/// The store owns every record, its payload block and its interned name; the
/// host graph only holds each entity's [`RecHeader`].
pub struct RecStore {
    arena: RecArena,
    names: Interner,
    alloc: Arc<dyn RecAlloc>,
    diag: Arc<dyn DiagSink>,
    metrics: Arc<dyn RecMetrics>,
    verify_on_mutation: bool,
}

impl Default for RecStore {
    fn default() -> Self {
        Self::new(RecOptions::new())
    }
}

impl RecStore {
    pub fn new(opts: RecOptions) -> Self {
        let limit = opts.byte_limit;
        Self {
            arena: RecArena::with_capacity(opts.initial_capacity),
            names: Interner::new(),
            alloc: opts.alloc.unwrap_or_else(|| match limit {
                None => default_alloc(),
                Some(_) => Arc::new(HeapAlloc::new(limit)),
            }),
            diag: opts.diagnostics.unwrap_or_else(default_sink),
            metrics: opts.metrics.unwrap_or_else(default_metrics),
            verify_on_mutation: opts.verify_on_mutation,
        }
    }

    /// Looks up `name` on `obj`.
    ///
    /// On an unlocked entity the found record becomes the front, and `promote`
    /// also sets the move-to-front lock. A locked entity's header never changes
    /// here; asking it to promote a record that is not the front reports
    /// [`Diagnostic::LockInconsistency`]. A lookup never touches payloads.
    pub fn get<S: Structure>(
        &self,
        host: &mut S,
        obj: ObjRef,
        name: &str,
        promote: bool,
    ) -> Option<RecId> {
        let found = self.find(host, obj, name);
        self.metrics.lookup(found.is_some());
        let Some((rec, header)) = found else {
            trace!(%obj, name, "rec.get.miss");
            return None;
        };
        self.move_to_front(host, obj, name, rec, header, promote);
        Some(rec)
    }

    fn move_to_front<S: Structure>(
        &self,
        host: &mut S,
        obj: ObjRef,
        name: &str,
        rec: RecId,
        header: RecHeader,
        promote: bool,
    ) {
        if header.locked {
            if promote && header.front != Some(rec) {
                self.metrics.lock_inconsistency();
                self.diag.report(&Diagnostic::LockInconsistency {
                    obj,
                    name: name.to_owned(),
                });
            }
            return;
        }
        if header.front == Some(rec) && !promote {
            return;
        }
        set_data(host, obj, Some(rec), promote);
        if promote {
            self.metrics.promoted();
        }
        trace!(%obj, name, %rec, promote, "rec.move_to_front");
    }

    /// Walks `obj`'s list once from the front looking for `name`.
    fn find<S: Structure>(&self, host: &S, obj: ObjRef, name: &str) -> Option<(RecId, RecHeader)> {
        let header = *host.header(obj)?;
        let first = header.front?;
        let canonical = self.names.lookup(name);
        let mut cur = first;
        // A well-formed list returns to `first` within `len` steps.
        for _ in 0..self.arena.len() {
            let rec = self.arena.get(cur)?;
            if Some(rec.name) == canonical || self.names.resolve(rec.name) == Some(name) {
                return Some((cur, header));
            }
            cur = rec.next;
            if cur == first {
                return None;
            }
        }
        None
    }

    /// Attaches a record called `name` of `size` zeroed bytes to `obj`, or
    /// returns the one already there.
    ///
    /// The lookup is the non-promoting one of [`RecStore::get`], so an existing
    /// record on an unlocked entity moves to the front. A new record becomes the
    /// front unless the entity is locked and already has records.
    ///
    /// A zero `size` only probes: nothing is created and `None` comes back when
    /// the record is absent. With `promote` the record is then promoted as by
    /// [`RecStore::get`].
    pub fn bind<S: Structure>(
        &mut self,
        host: &mut S,
        obj: ObjRef,
        name: &str,
        size: u32,
        promote: bool,
    ) -> Result<Option<RecId>> {
        let header = *host
            .header(obj)
            .ok_or(RecError::Invalid("bind on unknown entity"))?;
        let mut rec = self.get(host, obj, name, false);
        if rec.is_none() && size > 0 {
            rec = Some(self.create(host, obj, header, name, size)?);
        }
        if promote {
            self.get(host, obj, name, true);
        }
        if rec.is_some() {
            self.verify_after(host, obj)?;
        }
        Ok(rec)
    }

    fn create<S: Structure>(
        &mut self,
        host: &mut S,
        obj: ObjRef,
        header: RecHeader,
        name: &str,
        size: u32,
    ) -> Result<RecId> {
        let anchor = match header.front {
            Some(first) => {
                let next = self
                    .arena
                    .get(first)
                    .ok_or(RecError::Corruption("front references a released record"))?
                    .next;
                Some((first, next))
            }
            None => None,
        };
        let payload = self.alloc.alloc(size)?;
        let name_id = self.names.intern(name);
        let id = self.arena.insert(|id| Record {
            name: name_id,
            payload,
            next: id,
        });
        match anchor {
            None => {}
            Some((first, first_next)) if first_next == first => {
                self.link(first, id);
                self.link(id, first);
            }
            Some((first, first_next)) => {
                self.link(id, first_next);
                self.link(first, id);
            }
        }
        // A torn-down entity may still carry its lock with no list behind it.
        if !header.locked || anchor.is_none() {
            set_data(host, obj, Some(id), header.locked);
        }
        self.metrics.record_created();
        trace!(%obj, name, size, %id, "rec.bind.create");
        Ok(id)
    }

    fn link(&mut self, from: RecId, to: RecId) {
        if let Some(rec) = self.arena.get_mut(from) {
            rec.next = to;
        }
    }

    /// Removes the record called `name` from `obj`.
    ///
    /// Returns `Ok(false)` when there is no such record. The record is found
    /// with a non-promoting lookup, so on an unlocked entity it is the front by
    /// the time it is unlinked. Every view of the entity whose front pointed at
    /// the record moves on to its successor (or to nothing, for a singleton) and
    /// drops its lock. A list that does not lead back to the record is reported
    /// as corruption and its links are left unchanged.
    pub fn delete<S: Structure>(&mut self, host: &mut S, obj: ObjRef, name: &str) -> Result<bool> {
        let Some(rec) = self.get(host, obj, name, false) else {
            trace!(%obj, name, "rec.delete.miss");
            return Ok(false);
        };
        let first = self
            .front(host, obj)
            .ok_or(RecError::Corruption("found record on an empty list"))?;
        let prev = self.predecessor(obj, first, rec)?;
        let successor = self
            .arena
            .get(rec)
            .ok_or(RecError::Corruption("record released during delete"))?
            .next;
        // Harmless when the record is a singleton: prev == rec.
        self.link(prev, successor);
        let replacement = (successor != rec).then_some(successor);
        match obj.kind() {
            ObjKind::Graph => refresh_front(host, obj, rec, replacement),
            ObjKind::Node | ObjKind::OutEdge | ObjKind::InEdge => {
                let root = host.root();
                let visited = host.apply(root, obj, false, &mut |h: &mut S, _, view| {
                    refresh_front(h, view, rec, replacement);
                    Ok(())
                })?;
                if !visited {
                    refresh_front(host, obj, rec, replacement);
                }
            }
        }
        if let Some(record) = self.arena.remove(rec) {
            self.release(record)?;
        }
        self.metrics.record_deleted();
        trace!(%obj, name, %rec, "rec.delete");
        self.verify_after(host, obj)?;
        Ok(true)
    }

    fn predecessor(&self, obj: ObjRef, first: RecId, target: RecId) -> Result<RecId> {
        let mut prev = first;
        for _ in 0..=self.arena.len() {
            let next = self
                .arena
                .get(prev)
                .ok_or(RecError::Corruption("record list references a released record"))?
                .next;
            if next == target {
                return Ok(prev);
            }
            prev = next;
            if prev == first {
                break;
            }
        }
        error!(%obj, %target, "record predecessor not found");
        Err(RecError::Corruption("record predecessor not found"))
    }

    fn release(&mut self, record: Record) -> Result<()> {
        let Record { name, payload, .. } = record;
        self.alloc.free(payload);
        self.names.release(name)
    }

    /// Releases every record on `obj` and clears its front pointer.
    ///
    /// Meant for an entity that is going away: the lock flag and the opposite
    /// edge view are not touched. Returns the number of records released.
    pub fn teardown<S: Structure>(&mut self, host: &mut S, obj: ObjRef) -> Result<usize> {
        let Some(first) = host.header(obj).and_then(|h| h.front) else {
            return Ok(0);
        };
        if let Some(header) = host.header_mut(obj) {
            header.front = None;
        }
        let mut released = 0usize;
        let mut outcome = Ok(());
        let mut cur = first;
        while let Some(record) = self.arena.remove(cur) {
            let next = record.next;
            outcome = outcome.and(self.release(record));
            released += 1;
            if next == first {
                break;
            }
            cur = next;
        }
        self.metrics.records_torn_down(released as u64);
        trace!(%obj, released, "rec.teardown");
        outcome.map(|()| released)
    }

    fn verify_after<S: Structure>(&self, host: &S, obj: ObjRef) -> Result<()> {
        if !self.verify_on_mutation {
            return Ok(());
        }
        let report = verify_entity(self, host, obj);
        if report.success {
            return Ok(());
        }
        error!(%obj, findings = ?report.findings, "record list failed verification");
        Err(RecError::Corruption("record list failed verification"))
    }

    /// Cached front record of `obj`.
    pub fn front<S: Structure>(&self, host: &S, obj: ObjRef) -> Option<RecId> {
        host.header(obj).and_then(|h| h.front)
    }

    pub fn is_locked<S: Structure>(&self, host: &S, obj: ObjRef) -> bool {
        host.header(obj).is_some_and(|h| h.locked)
    }

    /// Iterates `obj`'s records once around the cycle, starting at the front.
    pub fn records<S: Structure>(&self, host: &S, obj: ObjRef) -> Records<'_> {
        let first = self.front(host, obj);
        Records {
            arena: &self.arena,
            first,
            cur: first,
            budget: self.arena.len(),
        }
    }

    /// Number of records attached to `obj`.
    pub fn len<S: Structure>(&self, host: &S, obj: ObjRef) -> usize {
        self.records(host, obj).count()
    }

    pub fn name(&self, rec: RecId) -> Option<&str> {
        self.arena
            .get(rec)
            .and_then(|r| self.names.resolve(r.name))
    }

    pub fn name_id(&self, rec: RecId) -> Option<StrId> {
        self.arena.get(rec).map(|r| r.name)
    }

    pub fn next(&self, rec: RecId) -> Option<RecId> {
        self.arena.get(rec).map(|r| r.next)
    }

    pub fn payload(&self, rec: RecId) -> Option<&[u8]> {
        self.arena.get(rec).map(|r| &*r.payload)
    }

    pub fn payload_mut(&mut self, rec: RecId) -> Option<&mut [u8]> {
        self.arena.get_mut(rec).map(|r| &mut *r.payload)
    }

    /// Live records across all entities.
    pub fn record_count(&self) -> usize {
        self.arena.len()
    }

    /// Distinct record names currently interned.
    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn names_snapshot(&self) -> InternMetricsSnapshot {
        self.names.metrics_snapshot()
    }

    #[cfg(test)]
    pub(crate) fn arena_mut(&mut self) -> &mut RecArena {
        &mut self.arena
    }
}

/// Moves `obj`'s front off `rec` if it points there.
fn refresh_front<S: Structure>(host: &mut S, obj: ObjRef, rec: RecId, replacement: Option<RecId>) {
    if host.header(obj).and_then(|h| h.front) == Some(rec) {
        set_data(host, obj, replacement, false);
    }
}

/// Iterator over one entity's records, see [`RecStore::records`].
pub struct Records<'a> {
    arena: &'a RecArena,
    first: Option<RecId>,
    cur: Option<RecId>,
    budget: usize,
}

impl Iterator for Records<'_> {
    type Item = RecId;

    fn next(&mut self) -> Option<RecId> {
        let cur = self.cur?;
        if self.budget == 0 {
            self.cur = None;
            return None;
        }
        self.budget -= 1;
        let next = self.arena.get(cur)?.next;
        self.cur = (Some(next) != self.first).then_some(next);
        Some(cur)
    }
}
