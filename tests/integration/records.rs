use std::sync::Arc;

use recgraph::admin::{verify_entity, verify_graph};
use recgraph::primitives::diag::CollectSink;
use recgraph::storage::{check_mirror, CounterMetrics, MemGraph, RecOptions, RecStore, Structure};
use recgraph::types::{ObjRef, Result};

fn store() -> RecStore {
    RecStore::new(RecOptions::new().verify_on_mutation(true))
}

#[test]
fn bind_then_get_returns_same_record() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let node = ObjRef::Node(graph.add_node(root)?);
    let mut recs = store();

    let bound = recs.bind(&mut graph, node, "x", 16, false)?.expect("bound");
    assert_eq!(recs.get(&mut graph, node, "x", false), Some(bound));
    assert_eq!(recs.payload(bound).map(<[u8]>::len), Some(16));

    assert!(recs.delete(&mut graph, node, "x")?);
    assert_eq!(recs.get(&mut graph, node, "x", false), None);
    assert_eq!(recs.payload(bound), None, "handle is stale after delete");
    Ok(())
}

#[test]
fn edge_views_observe_the_same_record() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let a = graph.add_node(root)?;
    let b = graph.add_node(root)?;
    let e = graph.add_edge(root, a, b)?;
    let (out, inn) = (ObjRef::OutEdge(e), ObjRef::InEdge(e));
    let mut recs = store();

    let w = recs.bind(&mut graph, out, "w", 8, true)?.expect("bound");
    recs.payload_mut(w).expect("payload")[0] = 0xAB;
    let seen = recs.get(&mut graph, inn, "w", false).expect("mirrored");
    assert_eq!(seen, w);
    assert_eq!(
        recs.payload(seen).map(<[u8]>::as_ptr),
        recs.payload(w).map(<[u8]>::as_ptr),
        "both views must reach one payload, not a copy"
    );
    assert_eq!(recs.payload(seen).map(|p| p[0]), Some(0xAB));
    assert!(recs.is_locked(&graph, inn));
    assert!(check_mirror(&graph, out));

    recs.bind(&mut graph, inn, "v", 4, false)?;
    assert_eq!(recs.len(&graph, out), 2);
    assert_eq!(recs.front(&graph, out), recs.front(&graph, inn));

    assert!(recs.delete(&mut graph, inn, "w")?);
    assert_eq!(recs.get(&mut graph, out, "w", false), None);
    assert_eq!(recs.front(&graph, out), recs.front(&graph, inn));
    assert_eq!(recs.is_locked(&graph, out), recs.is_locked(&graph, inn));
    assert!(verify_entity(&recs, &graph, out).success);
    Ok(())
}

#[test]
fn deleting_node_record_refreshes_every_subgraph_view() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let sub = graph.add_subgraph(root)?;
    let deeper = graph.add_subgraph(sub)?;
    let n = ObjRef::Node(graph.add_node(deeper)?);
    let mut recs = store();

    let keep = recs.bind(&mut graph, n, "keep", 4, false)?;
    recs.bind(&mut graph, n, "drop", 4, true)?;
    assert!(recs.delete(&mut graph, n, "drop")?);
    assert_eq!(recs.front(&graph, n), keep);
    for g in [root, sub, deeper] {
        let view = graph.view_in(g, n).expect("member");
        assert_eq!(recs.front(&graph, view), keep);
    }
    assert!(verify_graph(&recs, &graph).success);
    Ok(())
}

#[test]
fn graph_records_are_independent_of_subgraph_records() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let sub = graph.add_subgraph(root)?;
    let mut recs = store();
    recs.bind(&mut graph, ObjRef::Graph(root), "meta", 4, false)?;
    recs.bind(&mut graph, ObjRef::Graph(sub), "meta", 4, false)?;
    assert!(recs.delete(&mut graph, ObjRef::Graph(root), "meta")?);
    assert_eq!(recs.front(&graph, ObjRef::Graph(root)), None);
    assert!(recs.get(&mut graph, ObjRef::Graph(sub), "meta", false).is_some());
    assert_eq!(recs.name_count(), 1);
    Ok(())
}

#[test]
fn locked_promotion_reports_through_sink() -> Result<()> {
    let sink = Arc::new(CollectSink::new());
    let metrics = Arc::new(CounterMetrics::default());
    let mut graph = MemGraph::new();
    let root = graph.root();
    let node = ObjRef::Node(graph.add_node(root)?);
    let mut recs = RecStore::new(
        RecOptions::new()
            .diagnostics(sink.clone())
            .metrics(metrics.clone()),
    );
    recs.bind(&mut graph, node, "first", 1, true)?;
    recs.bind(&mut graph, node, "second", 1, true)?;
    assert_eq!(sink.len(), 1);
    let first = recs.get(&mut graph, node, "first", false);
    assert_eq!(recs.front(&graph, node), first);
    assert_eq!(metrics.snapshot().lock_inconsistencies, 1);
    Ok(())
}

#[test]
fn close_releases_everything() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let sub = graph.add_subgraph(root)?;
    let a = graph.add_node(root)?;
    let b = graph.add_node(sub)?;
    let e = graph.add_edge(sub, a, b)?;
    let mut recs = store();
    recs.bind(&mut graph, ObjRef::Graph(root), "g", 2, false)?;
    recs.bind(&mut graph, ObjRef::Graph(sub), "g", 2, false)?;
    recs.bind(&mut graph, ObjRef::Node(a), "n", 2, false)?;
    recs.bind(&mut graph, ObjRef::Node(b), "n", 2, false)?;
    recs.bind(&mut graph, ObjRef::OutEdge(e), "e", 2, false)?;
    recs.bind(&mut graph, ObjRef::InEdge(e), "e2", 2, false)?;
    assert!(verify_graph(&recs, &graph).success);

    assert_eq!(recs.close(&mut graph)?, 6);
    assert_eq!(recs.record_count(), 0);
    assert_eq!(recs.name_count(), 0);
    let report = verify_graph(&recs, &graph);
    assert!(report.success);
    assert_eq!(report.counts.records, 0);
    Ok(())
}

#[test]
fn verify_report_serializes() -> Result<()> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let node = ObjRef::Node(graph.add_node(root)?);
    let mut recs = store();
    recs.bind(&mut graph, node, "x", 1, true)?;
    let report = verify_graph(&recs, &graph);
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["counts"]["records"], 1);
    assert_eq!(json["counts"]["locked"], 1);
    Ok(())
}
