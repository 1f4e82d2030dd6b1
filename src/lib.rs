//! Named, caller-sized records attached to the graphs, nodes and edges of a
//! graph hierarchy.
//!
//! Records on one entity form a circular list with a cached front; lookups can
//! move a record to the front, and both views of an edge share one list.

pub mod admin;
pub mod logging;
pub mod primitives;
pub mod storage;
pub mod types;

pub use storage::{InitSpec, MemGraph, RecOptions, RecStore, Structure};
pub use types::{ObjKind, ObjRef, RecError, RecId, Result};
