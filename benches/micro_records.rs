#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use recgraph::storage::{MemGraph, RecOptions, RecStore, Structure};
use recgraph::types::ObjRef;

const NODE_COUNT: usize = 1_024;
const NAMES: [&str; 8] = [
    "layout", "rank", "order", "weight", "label", "pos", "mark", "scratch",
];

fn micro_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro/records");
    group.sample_size(60);
    let mut harness = RecordHarness::new(NODE_COUNT);

    group.throughput(Throughput::Elements(1));
    group.bench_function("get_hit", |b| {
        b.iter(|| black_box(harness.get(false)));
    });

    group.throughput(Throughput::Elements(1));
    group.bench_function("get_promote", |b| {
        b.iter(|| black_box(harness.get(true)));
    });

    group.throughput(Throughput::Elements(1));
    group.bench_function("get_miss", |b| {
        b.iter(|| black_box(harness.miss()));
    });

    group.throughput(Throughput::Elements(1));
    group.bench_function("bind_delete_cycle", |b| {
        b.iter(|| black_box(harness.churn()));
    });

    group.finish();
}

struct RecordHarness {
    graph: MemGraph,
    recs: RecStore,
    nodes: Vec<ObjRef>,
    rng: ChaCha8Rng,
}

impl RecordHarness {
    fn new(node_count: usize) -> Self {
        let mut graph = MemGraph::new();
        let root = graph.root();
        let mut recs = RecStore::new(RecOptions::new().verify_on_mutation(false));
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let node = ObjRef::Node(graph.add_node(root).expect("node"));
            for name in NAMES {
                recs.bind(&mut graph, node, name, 16, false).expect("bind");
            }
            nodes.push(node);
        }
        Self {
            graph,
            recs,
            nodes,
            rng: ChaCha8Rng::seed_from_u64(0xC0FFEE),
        }
    }

    fn pick(&mut self) -> (ObjRef, &'static str) {
        let node = self.nodes[self.rng.gen_range(0..self.nodes.len())];
        (node, NAMES[self.rng.gen_range(0..NAMES.len())])
    }

    fn get(&mut self, promote: bool) -> bool {
        let (node, name) = self.pick();
        self.recs.get(&mut self.graph, node, name, promote).is_some()
    }

    fn miss(&mut self) -> bool {
        let (node, _) = self.pick();
        self.recs.get(&mut self.graph, node, "absent", false).is_some()
    }

    fn churn(&mut self) -> bool {
        let (node, _) = self.pick();
        self.recs
            .bind(&mut self.graph, node, "transient", 32, false)
            .expect("bind");
        self.recs
            .delete(&mut self.graph, node, "transient")
            .expect("delete")
    }
}

criterion_group!(benches, micro_records);
criterion_main!(benches);
