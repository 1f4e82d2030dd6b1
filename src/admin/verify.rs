use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;

use crate::storage::{check_mirror, RecStore, Structure};
use crate::types::{GraphId, ObjRef, RecId};

const MAX_FINDINGS: usize = 32;

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Non-critical issue that may indicate a problem.
    Warning,
    /// Broken record-list invariant.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Entity the finding is about.
    pub obj: ObjRef,
    /// Human-readable description of the issue.
    pub message: String,
}

/// Statistics collected during the verification process.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// Entities whose headers were examined.
    pub entities: u64,
    /// Records reached by walking entity lists.
    pub records: u64,
    /// Entities that are locked.
    pub locked: u64,
}

/// Complete report of a verification pass.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// Whether verification passed without finding any errors.
    pub success: bool,
    /// List of issues discovered during verification, capped at a fixed count.
    pub findings: Vec<VerifyFinding>,
    /// Statistics about the entities examined.
    pub counts: VerifyCounts,
}

impl VerifyReport {
    fn finish(findings: Vec<VerifyFinding>, counts: VerifyCounts) -> Self {
        Self {
            success: findings.iter().all(|f| f.severity != VerifySeverity::Error),
            findings,
            counts,
        }
    }
}

fn push(
    findings: &mut Vec<VerifyFinding>,
    severity: VerifySeverity,
    obj: ObjRef,
    message: impl Into<String>,
) {
    if findings.len() < MAX_FINDINGS {
        findings.push(VerifyFinding {
            severity,
            obj,
            message: message.into(),
        });
    }
}

/// Checks the record list of one entity.
///
/// The list must close into a cycle through live records, carry each name at
/// most once, and, for an edge view, match the header of the opposite view.
pub fn verify_entity<S: Structure>(store: &RecStore, host: &S, obj: ObjRef) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();
    check_entity(store, host, obj, &mut findings, &mut counts);
    VerifyReport::finish(findings, counts)
}

/// Checks every graph, node and edge view reachable from the root, and that
/// the number of records reached equals the number of records the store holds.
pub fn verify_graph<S: Structure>(store: &RecStore, host: &S) -> VerifyReport {
    let mut findings = Vec::new();
    let mut counts = VerifyCounts::default();
    let root = host.root();
    let mut graphs: SmallVec<[GraphId; 8]> = SmallVec::new();
    collect_graphs(host, root, &mut graphs);
    for g in &graphs {
        check_entity(store, host, ObjRef::Graph(*g), &mut findings, &mut counts);
    }
    let mut node = host.first_node(root);
    while let Some(n) = node {
        check_entity(store, host, ObjRef::Node(n), &mut findings, &mut counts);
        let mut edge = host.first_out(root, n);
        while let Some(e) = edge {
            check_entity(store, host, ObjRef::OutEdge(e), &mut findings, &mut counts);
            // The in-edge view shares the list; check it without counting its records twice.
            let mut shadow = VerifyCounts::default();
            check_entity(store, host, ObjRef::InEdge(e), &mut findings, &mut shadow);
            counts.entities += shadow.entities;
            edge = host.next_out(root, e);
        }
        node = host.next_node(root, n);
    }
    if counts.records != store.record_count() as u64 {
        push(
            &mut findings,
            VerifySeverity::Warning,
            ObjRef::Graph(root),
            format!(
                "{} records reachable but store holds {}",
                counts.records,
                store.record_count()
            ),
        );
    }
    VerifyReport::finish(findings, counts)
}

fn collect_graphs<S: Structure>(host: &S, g: GraphId, out: &mut SmallVec<[GraphId; 8]>) {
    out.push(g);
    let mut sub = host.first_subgraph(g);
    while let Some(s) = sub {
        collect_graphs(host, s, out);
        sub = host.next_subgraph(s);
    }
}

fn check_entity<S: Structure>(
    store: &RecStore,
    host: &S,
    obj: ObjRef,
    findings: &mut Vec<VerifyFinding>,
    counts: &mut VerifyCounts,
) {
    let Some(header) = host.header(obj).copied() else {
        push(findings, VerifySeverity::Error, obj, "entity has no record header");
        return;
    };
    counts.entities += 1;
    if header.locked {
        counts.locked += 1;
    }
    if !check_mirror(host, obj) {
        push(
            findings,
            VerifySeverity::Error,
            obj,
            "edge views disagree on record header",
        );
    }
    let Some(first) = header.front else {
        return;
    };
    let mut seen_names = FxHashSet::default();
    let mut seen_recs: FxHashSet<RecId> = FxHashSet::default();
    let mut cur = first;
    loop {
        let (Some(name), Some(next)) = (store.name(cur), store.next(cur)) else {
            push(
                findings,
                VerifySeverity::Error,
                obj,
                format!("list references released record {cur}"),
            );
            return;
        };
        if !seen_recs.insert(cur) {
            push(findings, VerifySeverity::Error, obj, "record list is not circular");
            return;
        }
        counts.records += 1;
        if !seen_names.insert(name) {
            push(
                findings,
                VerifySeverity::Error,
                obj,
                format!("duplicate record name {name:?}"),
            );
        }
        if next == first {
            return;
        }
        cur = next;
    }
}
