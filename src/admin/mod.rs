#![forbid(unsafe_code)]

//! Record store maintenance utilities.

pub(crate) mod verify;

/// Record list integrity verification.
///
/// Walks entity record lists and reports broken cycles, duplicate names,
/// released records still linked in, and edge views that disagree.
pub use verify::{
    verify_entity, verify_graph, VerifyCounts, VerifyFinding, VerifyReport, VerifySeverity,
};
