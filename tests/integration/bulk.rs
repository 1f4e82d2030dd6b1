use recgraph::admin::verify_graph;
use recgraph::storage::{InitSpec, MemGraph, RecOptions, RecStore, Structure};
use recgraph::types::{EdgeId, GraphId, NodeId, ObjKind, ObjRef, Result};

struct Fixture {
    graph: MemGraph,
    recs: RecStore,
    root: GraphId,
    sub: GraphId,
    deeper: GraphId,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

/// root { a b c ; sub { b c ; deeper { c } } } with edges a->b, b->c (in sub), c->a.
fn fixture() -> Result<Fixture> {
    let mut graph = MemGraph::new();
    let root = graph.root();
    let sub = graph.add_subgraph(root)?;
    let deeper = graph.add_subgraph(sub)?;
    let a = graph.add_node(root)?;
    let b = graph.add_node(sub)?;
    let c = graph.add_node(deeper)?;
    let edges = vec![
        graph.add_edge(root, a, b)?,
        graph.add_edge(sub, b, c)?,
        graph.add_edge(root, c, a)?,
    ];
    Ok(Fixture {
        graph,
        recs: RecStore::new(RecOptions::new().verify_on_mutation(true)),
        root,
        sub,
        deeper,
        nodes: vec![a, b, c],
        edges,
    })
}

fn has(fx: &mut Fixture, obj: ObjRef, name: &str) -> bool {
    fx.recs.get(&mut fx.graph, obj, name, false).is_some()
}

#[test]
fn init_graph_class_non_recursive_binds_only_the_graph() -> Result<()> {
    let mut fx = fixture()?;
    let (root, sub) = (fx.root, fx.sub);
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Graph, "g", InitSpec::new(8), false)?;
    assert!(has(&mut fx, ObjRef::Graph(root), "g"));
    assert!(!has(&mut fx, ObjRef::Graph(sub), "g"));
    assert_eq!(fx.recs.record_count(), 1);
    Ok(())
}

#[test]
fn init_graph_class_recursive_reaches_every_subgraph() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    fx.recs.init(
        &mut fx.graph,
        root,
        ObjKind::Graph,
        "g",
        InitSpec::from_signed(-8),
        true,
    )?;
    for g in [fx.root, fx.sub, fx.deeper] {
        let obj = ObjRef::Graph(g);
        let rec = fx.recs.get(&mut fx.graph, obj, "g", false).expect("bound");
        assert_eq!(fx.recs.payload(rec).map(<[u8]>::len), Some(8));
        assert!(fx.recs.is_locked(&fx.graph, obj));
    }
    Ok(())
}

#[test]
fn init_node_class_respects_subgraph_membership() -> Result<()> {
    let mut fx = fixture()?;
    let sub = fx.sub;
    fx.recs
        .init(&mut fx.graph, sub, ObjKind::Node, "n", InitSpec::new(4), false)?;
    let [a, b, c] = [fx.nodes[0], fx.nodes[1], fx.nodes[2]];
    assert!(!has(&mut fx, ObjRef::Node(a), "n"));
    assert!(has(&mut fx, ObjRef::Node(b), "n"));
    assert!(has(&mut fx, ObjRef::Node(c), "n"));
    Ok(())
}

#[test]
fn init_edge_class_covers_both_views() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::InEdge, "e", InitSpec::new(2), false)?;
    for e in fx.edges.clone() {
        assert!(has(&mut fx, ObjRef::OutEdge(e), "e"));
        assert!(has(&mut fx, ObjRef::InEdge(e), "e"));
    }
    assert_eq!(fx.recs.record_count(), fx.edges.len());
    assert!(verify_graph(&fx.recs, &fx.graph).success);
    Ok(())
}

#[test]
fn init_is_idempotent() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    for _ in 0..3 {
        fx.recs
            .init(&mut fx.graph, root, ObjKind::Node, "n", InitSpec::new(4), false)?;
    }
    assert_eq!(fx.recs.record_count(), fx.nodes.len());
    assert_eq!(fx.recs.name_count(), 1);
    Ok(())
}

#[test]
fn zero_size_init_creates_nothing() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Node, "n", InitSpec::new(0), true)?;
    assert_eq!(fx.recs.record_count(), 0);
    Ok(())
}

#[test]
fn clean_graph_class_sweeps_subgraph_tree() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    let spec = InitSpec::new(8).recursive(true);
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Graph, "g", spec, false)?;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Graph, "other", InitSpec::new(8), false)?;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Node, "g", InitSpec::new(8), false)?;

    let (sub, deeper) = (fx.sub, fx.deeper);
    fx.recs.clean(&mut fx.graph, sub, ObjKind::Graph, "g")?;
    assert!(has(&mut fx, ObjRef::Graph(root), "g"));
    assert!(!has(&mut fx, ObjRef::Graph(sub), "g"));
    assert!(!has(&mut fx, ObjRef::Graph(deeper), "g"));

    fx.recs.clean(&mut fx.graph, root, ObjKind::Graph, "g")?;
    assert!(!has(&mut fx, ObjRef::Graph(root), "g"));
    assert!(has(&mut fx, ObjRef::Graph(root), "other"));
    let a = fx.nodes[0];
    assert!(has(&mut fx, ObjRef::Node(a), "g"), "node records are a separate class");
    assert!(verify_graph(&fx.recs, &fx.graph).success);
    Ok(())
}

#[test]
fn clean_node_and_edge_classes() -> Result<()> {
    let mut fx = fixture()?;
    let root = fx.root;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::Node, "x", InitSpec::new(1), false)?;
    fx.recs
        .init(&mut fx.graph, root, ObjKind::OutEdge, "x", InitSpec::new(1), false)?;
    assert_eq!(fx.recs.record_count(), 6);

    fx.recs.clean(&mut fx.graph, root, ObjKind::OutEdge, "x")?;
    assert_eq!(fx.recs.record_count(), 3);
    for e in fx.edges.clone() {
        assert_eq!(fx.recs.front(&fx.graph, ObjRef::InEdge(e)), None);
    }

    let sub = fx.sub;
    fx.recs.clean(&mut fx.graph, sub, ObjKind::Node, "x")?;
    assert_eq!(fx.recs.record_count(), 1);
    fx.recs.clean(&mut fx.graph, root, ObjKind::Node, "x")?;
    assert_eq!(fx.recs.record_count(), 0);
    assert_eq!(fx.recs.name_count(), 0);
    Ok(())
}
