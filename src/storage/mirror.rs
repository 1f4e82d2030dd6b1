//! Keeps the two views of an edge looking at one record list.

use crate::storage::graph::Structure;
use crate::storage::record::RecHeader;
use crate::types::{ObjRef, RecId};

/// Writes `front` and `locked` to `obj` and, when `obj` is an edge view, to its
/// opposite view in the same call.
///
/// Every change of an entity's front pointer or lock flag goes through here.
pub(crate) fn set_data<S: Structure>(
    host: &mut S,
    obj: ObjRef,
    front: Option<RecId>,
    locked: bool,
) {
    let header = RecHeader { front, locked };
    if let Some(slot) = host.header_mut(obj) {
        *slot = header;
    }
    if obj.kind().is_edge() {
        let twin = host.opposite(obj);
        if let Some(slot) = host.header_mut(twin) {
            *slot = header;
        }
    }
}

/// Whether both views of an edge carry the same header. Graphs and nodes always pass.
pub fn check_mirror<S: Structure>(host: &S, obj: ObjRef) -> bool {
    if !obj.kind().is_edge() {
        return true;
    }
    host.header(obj) == host.header(host.opposite(obj))
}
