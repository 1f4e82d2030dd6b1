//! Collaborator seams the record store is built against.
//!
//! Payload storage and the diagnostic channel are both pluggable so a host
//! graph can supply its own.

/// Payload allocation.
///
/// The [`alloc::RecAlloc`] trait and a heap implementation with an optional byte budget.
pub mod alloc;

/// Advisory diagnostics.
pub mod diag;
