use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::Structure;
use crate::storage::record::RecHeader;
use crate::types::{EdgeId, GraphId, NodeId, ObjRef, RecError, Result};

#[derive(Debug, Default)]
struct GraphData {
    parent: Option<GraphId>,
    /// Position among the parent's subgraphs.
    sibling_pos: usize,
    subgraphs: Vec<GraphId>,
    nodes: Vec<NodeId>,
    node_pos: FxHashMap<NodeId, usize>,
    edges: FxHashSet<EdgeId>,
    recs: RecHeader,
}

#[derive(Debug, Default)]
struct NodeData {
    out: SmallVec<[EdgeId; 4]>,
    recs: RecHeader,
}

#[derive(Debug)]
struct EdgeData {
    tail: NodeId,
    head: NodeId,
    /// Position in the tail's out list.
    out_pos: usize,
    /// Shared by the out-edge and in-edge views.
    recs: RecHeader,
}

/// In-memory graph hierarchy: a root graph, nested subgraphs, and nodes and
/// edges that belong to the root and to any subgraphs they were added to.
///
/// Each edge carries a single [`RecHeader`], so its two views alias one record
/// list.
#[derive(Debug)]
pub struct MemGraph {
    graphs: Vec<GraphData>,
    nodes: Vec<NodeData>,
    edges: Vec<EdgeData>,
}

impl Default for MemGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemGraph {
    pub fn new() -> Self {
        Self {
            graphs: vec![GraphData::default()],
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_subgraph(&mut self, parent: GraphId) -> Result<GraphId> {
        let id = GraphId(self.graphs.len() as u32);
        let parent_data = self.graph_mut(parent)?;
        let sibling_pos = parent_data.subgraphs.len();
        parent_data.subgraphs.push(id);
        self.graphs.push(GraphData {
            parent: Some(parent),
            sibling_pos,
            ..GraphData::default()
        });
        Ok(id)
    }

    /// Creates a node in `g` and every graph above it.
    pub fn add_node(&mut self, g: GraphId) -> Result<NodeId> {
        self.graph(g)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::default());
        self.insert_node(g, id)?;
        Ok(id)
    }

    /// Makes an existing node a member of `g` and every graph above it.
    pub fn insert_node(&mut self, g: GraphId, n: NodeId) -> Result<()> {
        if n.0 as usize >= self.nodes.len() {
            return Err(RecError::NotFound);
        }
        let mut cur = Some(g);
        while let Some(id) = cur {
            let data = self.graph_mut(id)?;
            if data.node_pos.contains_key(&n) {
                break;
            }
            data.node_pos.insert(n, data.nodes.len());
            data.nodes.push(n);
            cur = data.parent;
        }
        Ok(())
    }

    /// Creates an edge `tail -> head` in `g` and every graph above it, adding
    /// either endpoint to `g` when it is not already a member.
    pub fn add_edge(&mut self, g: GraphId, tail: NodeId, head: NodeId) -> Result<EdgeId> {
        self.insert_node(g, tail)?;
        self.insert_node(g, head)?;
        let id = EdgeId(self.edges.len() as u32);
        let tail_data = &mut self.nodes[tail.0 as usize];
        let out_pos = tail_data.out.len();
        tail_data.out.push(id);
        self.edges.push(EdgeData {
            tail,
            head,
            out_pos,
            recs: RecHeader::EMPTY,
        });
        let mut cur = Some(g);
        while let Some(gid) = cur {
            let data = self.graph_mut(gid)?;
            data.edges.insert(id);
            cur = data.parent;
        }
        Ok(id)
    }

    pub fn parent(&self, g: GraphId) -> Option<GraphId> {
        self.graphs.get(g.0 as usize).and_then(|data| data.parent)
    }

    pub fn endpoints(&self, e: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(e.0 as usize).map(|data| (data.tail, data.head))
    }

    pub fn node_count(&self, g: GraphId) -> usize {
        self.graphs.get(g.0 as usize).map_or(0, |data| data.nodes.len())
    }

    pub fn edge_count(&self, g: GraphId) -> usize {
        self.graphs.get(g.0 as usize).map_or(0, |data| data.edges.len())
    }

    pub fn contains(&self, g: GraphId, obj: ObjRef) -> bool {
        let Some(data) = self.graphs.get(g.0 as usize) else {
            return false;
        };
        match obj {
            ObjRef::Graph(other) => other == g,
            ObjRef::Node(n) => data.node_pos.contains_key(&n),
            ObjRef::OutEdge(e) | ObjRef::InEdge(e) => data.edges.contains(&e),
        }
    }

    fn graph(&self, g: GraphId) -> Result<&GraphData> {
        self.graphs.get(g.0 as usize).ok_or(RecError::NotFound)
    }

    fn graph_mut(&mut self, g: GraphId) -> Result<&mut GraphData> {
        self.graphs.get_mut(g.0 as usize).ok_or(RecError::NotFound)
    }

    fn out_from(&self, g: GraphId, tail: NodeId, start: usize) -> Option<EdgeId> {
        let data = self.graphs.get(g.0 as usize)?;
        self.nodes
            .get(tail.0 as usize)?
            .out
            .iter()
            .skip(start)
            .copied()
            .find(|e| data.edges.contains(e))
    }
}

impl Structure for MemGraph {
    fn root(&self) -> GraphId {
        GraphId(0)
    }

    fn first_node(&self, g: GraphId) -> Option<NodeId> {
        self.graphs.get(g.0 as usize)?.nodes.first().copied()
    }

    fn next_node(&self, g: GraphId, n: NodeId) -> Option<NodeId> {
        let data = self.graphs.get(g.0 as usize)?;
        let pos = *data.node_pos.get(&n)?;
        data.nodes.get(pos + 1).copied()
    }

    fn first_out(&self, g: GraphId, n: NodeId) -> Option<EdgeId> {
        self.out_from(g, n, 0)
    }

    fn next_out(&self, g: GraphId, e: EdgeId) -> Option<EdgeId> {
        let edge = self.edges.get(e.0 as usize)?;
        self.out_from(g, edge.tail, edge.out_pos + 1)
    }

    fn first_subgraph(&self, g: GraphId) -> Option<GraphId> {
        self.graphs.get(g.0 as usize)?.subgraphs.first().copied()
    }

    fn next_subgraph(&self, g: GraphId) -> Option<GraphId> {
        let data = self.graphs.get(g.0 as usize)?;
        let parent = self.graphs.get(data.parent?.0 as usize)?;
        parent.subgraphs.get(data.sibling_pos + 1).copied()
    }

    fn view_in(&self, g: GraphId, obj: ObjRef) -> Option<ObjRef> {
        match obj {
            ObjRef::Graph(_) => self
                .graphs
                .get(g.0 as usize)
                .map(|_| ObjRef::Graph(g)),
            other => self.contains(g, other).then_some(other),
        }
    }

    fn header(&self, obj: ObjRef) -> Option<&RecHeader> {
        match obj {
            ObjRef::Graph(g) => self.graphs.get(g.0 as usize).map(|d| &d.recs),
            ObjRef::Node(n) => self.nodes.get(n.0 as usize).map(|d| &d.recs),
            ObjRef::OutEdge(e) | ObjRef::InEdge(e) => {
                self.edges.get(e.0 as usize).map(|d| &d.recs)
            }
        }
    }

    fn header_mut(&mut self, obj: ObjRef) -> Option<&mut RecHeader> {
        match obj {
            ObjRef::Graph(g) => self.graphs.get_mut(g.0 as usize).map(|d| &mut d.recs),
            ObjRef::Node(n) => self.nodes.get_mut(n.0 as usize).map(|d| &mut d.recs),
            ObjRef::OutEdge(e) | ObjRef::InEdge(e) => {
                self.edges.get_mut(e.0 as usize).map(|d| &mut d.recs)
            }
        }
    }
}
