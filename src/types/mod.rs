#![forbid(unsafe_code)]

//! Identifiers, entity handles and the crate-wide error type.

use std::fmt;

use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct GraphId(pub u32);
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct NodeId(pub u32);
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct EdgeId(pub u32);
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct StrId(pub u32);

/// Stable handle to a record in a [`crate::storage::RecStore`].
///
/// The generation changes every time the arena slot is recycled, so a handle
/// to a deleted record never aliases a newer one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub struct RecId {
    pub index: u32,
    pub generation: u32,
}

/// The four entity variants records can be attached to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjKind {
    Graph,
    Node,
    OutEdge,
    InEdge,
}

impl ObjKind {
    pub const fn is_edge(self) -> bool {
        matches!(self, ObjKind::OutEdge | ObjKind::InEdge)
    }
}

/// Handle to one graph entity.
///
/// `OutEdge(e)` and `InEdge(e)` are the two traversal views of the same edge
/// and always observe the same record list.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ObjRef {
    Graph(GraphId),
    Node(NodeId),
    OutEdge(EdgeId),
    InEdge(EdgeId),
}

impl ObjRef {
    pub const fn kind(self) -> ObjKind {
        match self {
            ObjRef::Graph(_) => ObjKind::Graph,
            ObjRef::Node(_) => ObjKind::Node,
            ObjRef::OutEdge(_) => ObjKind::OutEdge,
            ObjRef::InEdge(_) => ObjKind::InEdge,
        }
    }

    /// Returns the other direction of an edge view; graphs and nodes map to themselves.
    pub const fn flipped(self) -> ObjRef {
        match self {
            ObjRef::OutEdge(e) => ObjRef::InEdge(e),
            ObjRef::InEdge(e) => ObjRef::OutEdge(e),
            other => other,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RecError {
    #[error("allocation of {requested} bytes failed (limit {limit:?})")]
    AllocFailed { requested: u32, limit: Option<u64> },
    #[error("corruption: {0}")]
    Corruption(&'static str),
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    #[error("not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, RecError>;

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjRef::Graph(g) => write!(f, "graph#{g}"),
            ObjRef::Node(n) => write!(f, "node#{n}"),
            ObjRef::OutEdge(e) => write!(f, "out-edge#{e}"),
            ObjRef::InEdge(e) => write!(f, "in-edge#{e}"),
        }
    }
}

impl From<GraphId> for ObjRef {
    fn from(value: GraphId) -> Self {
        ObjRef::Graph(value)
    }
}

impl From<NodeId> for ObjRef {
    fn from(value: NodeId) -> Self {
        ObjRef::Node(value)
    }
}
