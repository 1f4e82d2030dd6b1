//! Host graph structure seen by the record store.
//!
//! The store never creates or removes graph entities; it only walks them and
//! reads and writes each entity's [`RecHeader`]. [`MemGraph`] is the in-memory
//! implementation.

mod mem;

pub use mem::MemGraph;

use crate::storage::record::RecHeader;
use crate::types::{EdgeId, GraphId, NodeId, ObjRef, Result};

/// Structural queries over a graph hierarchy.
///
/// Iteration follows the `first_*`/`next_*` pattern; `next_*` returns `None`
/// past the last member. Edge iteration only yields out-edges; the matching
/// in-edge view is obtained with [`Structure::opposite`].
pub trait Structure {
    fn root(&self) -> GraphId;

    fn first_node(&self, g: GraphId) -> Option<NodeId>;
    fn next_node(&self, g: GraphId, n: NodeId) -> Option<NodeId>;

    fn first_out(&self, g: GraphId, n: NodeId) -> Option<EdgeId>;
    fn next_out(&self, g: GraphId, e: EdgeId) -> Option<EdgeId>;

    fn first_subgraph(&self, g: GraphId) -> Option<GraphId>;
    fn next_subgraph(&self, g: GraphId) -> Option<GraphId>;

    /// The view of `obj` inside graph `g`, if `g` contains it. For a graph
    /// handle the view is `g` itself.
    fn view_in(&self, g: GraphId, obj: ObjRef) -> Option<ObjRef>;

    fn header(&self, obj: ObjRef) -> Option<&RecHeader>;
    fn header_mut(&mut self, obj: ObjRef) -> Option<&mut RecHeader>;

    /// The opposite-direction twin of an edge view.
    fn opposite(&self, obj: ObjRef) -> ObjRef {
        obj.flipped()
    }

    /// Calls `f` on every view of `obj` in `g` and, recursively, in each
    /// subgraph of `g` that contains it. With `preorder` a graph is visited
    /// before its subgraphs, otherwise after.
    ///
    /// Returns `Ok(false)` when `g` does not contain `obj`.
    fn apply<F>(&mut self, g: GraphId, obj: ObjRef, preorder: bool, f: &mut F) -> Result<bool>
    where
        Self: Sized,
        F: FnMut(&mut Self, GraphId, ObjRef) -> Result<()>,
    {
        let Some(view) = self.view_in(g, obj) else {
            return Ok(false);
        };
        apply_rec(self, g, view, preorder, f)?;
        Ok(true)
    }
}

fn apply_rec<S, F>(host: &mut S, g: GraphId, obj: ObjRef, preorder: bool, f: &mut F) -> Result<()>
where
    S: Structure,
    F: FnMut(&mut S, GraphId, ObjRef) -> Result<()>,
{
    if preorder {
        f(host, g, obj)?;
    }
    let mut sub = host.first_subgraph(g);
    while let Some(s) = sub {
        if let Some(view) = host.view_in(s, obj) {
            apply_rec(host, s, view, preorder, f)?;
        }
        sub = host.next_subgraph(s);
    }
    if !preorder {
        f(host, g, obj)?;
    }
    Ok(())
}
