//! Bind, clean and teardown passes over whole classes of entities.

use tracing::debug;

use crate::storage::graph::Structure;
use crate::storage::store::RecStore;
use crate::types::{GraphId, ObjKind, ObjRef, Result};

/// Size and reach of a bulk bind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitSpec {
    /// Payload size of each created record.
    pub size: u32,
    /// Whether a graph-class bind also covers every subgraph, transitively.
    pub recursive: bool,
}

impl InitSpec {
    pub const fn new(size: u32) -> Self {
        Self {
            size,
            recursive: false,
        }
    }

    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Decodes the signed form used by external callers, where a negative size
    /// asks for recursion and its magnitude is the record size.
    pub const fn from_signed(size: i32) -> Self {
        Self {
            size: size.unsigned_abs(),
            recursive: size < 0,
        }
    }
}

impl RecStore {
    /// Binds `name` on every entity of class `kind` in `g`.
    ///
    /// Graph class binds on `g` itself (and its subgraph tree when
    /// `spec.recursive`). Node class binds on each node of `g`. Either edge
    /// class binds on every out-edge of every node, which covers the in-edge view too.
    pub fn init<S: Structure>(
        &mut self,
        host: &mut S,
        g: GraphId,
        kind: ObjKind,
        name: &str,
        spec: InitSpec,
        promote: bool,
    ) -> Result<()> {
        debug!(graph = %g, ?kind, name, size = spec.size, recursive = spec.recursive, "rec.init");
        match kind {
            ObjKind::Graph => {
                self.bind(host, ObjRef::Graph(g), name, spec.size, promote)?;
                if spec.recursive {
                    let mut sub = host.first_subgraph(g);
                    while let Some(s) = sub {
                        self.init(host, s, kind, name, spec, promote)?;
                        sub = host.next_subgraph(s);
                    }
                }
            }
            ObjKind::Node | ObjKind::OutEdge | ObjKind::InEdge => {
                let mut node = host.first_node(g);
                while let Some(n) = node {
                    if kind == ObjKind::Node {
                        self.bind(host, ObjRef::Node(n), name, spec.size, promote)?;
                    } else {
                        let mut edge = host.first_out(g, n);
                        while let Some(e) = edge {
                            self.bind(host, ObjRef::OutEdge(e), name, spec.size, promote)?;
                            edge = host.next_out(g, e);
                        }
                    }
                    node = host.next_node(g, n);
                }
            }
        }
        Ok(())
    }

    /// Deletes `name` from every entity of class `kind` in `g`.
    ///
    /// Graph class sweeps `g` and every graph of its subgraph tree.
    pub fn clean<S: Structure>(
        &mut self,
        host: &mut S,
        g: GraphId,
        kind: ObjKind,
        name: &str,
    ) -> Result<()> {
        debug!(graph = %g, ?kind, name, "rec.clean");
        match kind {
            ObjKind::Graph => {
                host.apply(g, ObjRef::Graph(g), true, &mut |h: &mut S, _, view| {
                    self.delete(h, view, name).map(|_| ())
                })?;
            }
            ObjKind::Node | ObjKind::OutEdge | ObjKind::InEdge => {
                let mut node = host.first_node(g);
                while let Some(n) = node {
                    if kind == ObjKind::Node {
                        self.delete(host, ObjRef::Node(n), name)?;
                    } else {
                        let mut edge = host.first_out(g, n);
                        while let Some(e) = edge {
                            self.delete(host, ObjRef::OutEdge(e), name)?;
                            edge = host.next_out(g, e);
                        }
                    }
                    node = host.next_node(g, n);
                }
            }
        }
        Ok(())
    }

    /// Tears down the records of every graph, node and edge reachable from the
    /// root. Returns the number of records released.
    pub fn close<S: Structure>(&mut self, host: &mut S) -> Result<usize> {
        let root = host.root();
        let mut released = 0;
        let mut node = host.first_node(root);
        while let Some(n) = node {
            let mut edge = host.first_out(root, n);
            while let Some(e) = edge {
                released += self.teardown(host, ObjRef::OutEdge(e))?;
                // Only matters for hosts that keep one header per direction.
                released += self.teardown(host, ObjRef::InEdge(e))?;
                edge = host.next_out(root, e);
            }
            released += self.teardown(host, ObjRef::Node(n))?;
            node = host.next_node(root, n);
        }
        released += self.teardown_graphs(host, root)?;
        debug!(released, "rec.close");
        Ok(released)
    }

    fn teardown_graphs<S: Structure>(&mut self, host: &mut S, g: GraphId) -> Result<usize> {
        let mut released = 0;
        let mut sub = host.first_subgraph(g);
        while let Some(s) = sub {
            released += self.teardown_graphs(host, s)?;
            sub = host.next_subgraph(s);
        }
        Ok(released + self.teardown(host, ObjRef::Graph(g))?)
    }
}
