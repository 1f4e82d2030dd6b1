use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::types::ObjRef;

/// Advisory condition noticed by the record store.
///
/// Reporting one never changes store state; the operation that noticed it
/// carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A promoting lookup found a record on a locked entity that is not its front.
    LockInconsistency { obj: ObjRef, name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LockInconsistency { obj, name } => {
                write!(f, "move to front lock inconsistency on {obj} (record {name:?})")
            }
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagSink: Send + Sync {
    fn report(&self, diag: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at warn level.
#[derive(Default)]
pub struct TracingSink;

impl DiagSink for TracingSink {
    fn report(&self, diag: &Diagnostic) {
        warn!(target: "recgraph::diag", %diag, "record store diagnostic");
    }
}

/// Keeps every reported diagnostic in memory.
#[derive(Default)]
pub struct CollectSink {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// Drains and returns everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl DiagSink for CollectSink {
    fn report(&self, diag: &Diagnostic) {
        self.seen.lock().push(diag.clone());
    }
}

pub fn default_sink() -> Arc<dyn DiagSink> {
    Arc::new(TracingSink)
}
