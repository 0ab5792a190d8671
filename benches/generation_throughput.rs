/// Benchmark for adset generation throughput
///
/// Measures repeated generation over a wide tree with the result cache on
/// and off, and the cost of invalidation after a mutation.
use adset::storage::StoredNodeStore;
use adset::{AdsetConfig, AdsetFilter, AdsetService, CacheConfig, NewNode, WeightedSampler};
use adset::cache::MemoryKeyValueCache;
use std::sync::Arc;
use std::time::Instant;
use tempfile::tempdir;

const BRANCHING: usize = 8;
const DEPTH: usize = 4;

fn build_tree(service: &AdsetService) -> usize {
    let root = service
        .create_node(NewNode::new("root", 1.0))
        .expect("Failed to create root");

    let mut level = vec![root.id()];
    let mut created = 1;
    for depth in 1..=DEPTH {
        let mut next = Vec::with_capacity(level.len() * BRANCHING);
        for parent in &level {
            for i in 0..BRANCHING {
                let region = if i % 2 == 0 { "us" } else { "eu" };
                let node = service
                    .create_node(
                        NewNode::new(format!("n{}_{}", depth, i), (i + 1) as f64 / 10.0)
                            .with_condition("region", region)
                            .with_parent(*parent),
                    )
                    .expect("Failed to create node");
                next.push(node.id());
                created += 1;
            }
        }
        level = next;
    }
    created
}

fn measure(label: &str, iterations: usize, mut op: impl FnMut()) {
    let start = Instant::now();
    for _ in 0..iterations {
        op();
    }
    let elapsed = start.elapsed();
    println!("📊 {}", label);
    println!("  Iterations: {}", iterations);
    println!("  Time: {:?}", elapsed);
    println!(
        "  Throughput: {:.0} ops/sec\n",
        iterations as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    println!("=== Adset Generation Throughput Benchmark ===\n");

    let temp_dir = tempdir().unwrap();
    let config = AdsetConfig {
        data_path: temp_dir.path().join("bench_db"),
        ..AdsetConfig::default()
    };
    let cached = AdsetService::from_config(&config).expect("Failed to open service");
    let nodes = build_tree(&cached);
    println!("📋 Setup: {} nodes, branching {}, depth {}\n", nodes, BRANCHING, DEPTH);

    let filter = AdsetFilter::new().with("region", "us");
    let iterations = 2_000;

    measure("generate_adset - result cache on", iterations, || {
        cached.generate_adset(&filter, None).unwrap();
    });

    let uncached = AdsetService::new(
        Arc::new(StoredNodeStore::in_memory().unwrap()),
        Arc::new(MemoryKeyValueCache::new()),
        &CacheConfig {
            result_ttl_secs: 0,
            ..CacheConfig::default()
        },
        WeightedSampler::seeded(1),
    );
    build_tree(&uncached);
    measure("generate_adset - result cache off (memory store)", iterations, || {
        uncached.generate_adset(&filter, None).unwrap();
    });

    let root = cached.get_root().unwrap();
    measure("update + regenerate (invalidation)", 100, || {
        cached
            .update_node(
                root.id(),
                adset::NodePatch {
                    name: Some("root".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        cached.generate_adset(&filter, None).unwrap();
    });

    println!("{:?}", cached.stats());
}
