#![forbid(unsafe_code)]

use crate::types::{RecId, StrId};

/// Per-entity view of its attached records: the cached front of the circular
/// list and the move-to-front lock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecHeader {
    pub front: Option<RecId>,
    pub locked: bool,
}

impl RecHeader {
    pub const EMPTY: RecHeader = RecHeader {
        front: None,
        locked: false,
    };
}

#[derive(Debug)]
pub(crate) struct Record {
    pub name: StrId,
    pub payload: Box<[u8]>,
    /// Successor in the owning entity's circular list; a singleton points at itself.
    pub next: RecId,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    rec: Option<Record>,
}

/// Generational slab holding every record of one store.
#[derive(Debug, Default)]
pub(crate) struct RecArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl RecArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Inserts the record built by `build`, which receives the record's own id so
    /// a fresh record can start as a self-loop.
    pub fn insert(&mut self, build: impl FnOnce(RecId) -> Record) -> RecId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    rec: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = RecId {
            index,
            generation: slot.generation,
        };
        slot.rec = Some(build(id));
        self.len += 1;
        id
    }

    pub fn get(&self, id: RecId) -> Option<&Record> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.rec.as_ref())
    }

    pub fn get_mut(&mut self, id: RecId) -> Option<&mut Record> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.rec.as_mut())
    }

    pub fn remove(&mut self, id: RecId) -> Option<Record> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let rec = slot.rec.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(rec)
    }
}
