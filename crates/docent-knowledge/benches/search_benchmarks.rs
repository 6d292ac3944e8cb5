//! Benchmark for the knowledge search engine.
//!
//! The store is brute-force per query (every candidate is scored), so search
//! cost grows linearly with entry count. This benchmark uses 1,000 entries,
//! an order of magnitude above the expected seed-set size, to keep a margin
//! visible in the numbers.

use criterion::{criterion_group, criterion_main, Criterion};

use docent_core::types::Category;
use docent_knowledge::{KnowledgeStore, NewEntry, SearchEngine, SearchOptions};

const ENTRY_COUNT: usize = 1_000;

fn build_store() -> KnowledgeStore {
    let store = KnowledgeStore::new();
    let categories = Category::ALL;
    for i in 0..ENTRY_COUNT {
        let category = categories[i % categories.len()];
        store
            .add(NewEntry::new(
                category,
                format!("How does feature {i} of the platform work?"),
                format!(
                    "Feature {i} is configured from the dashboard and applies \
                     to every published project page immediately."
                ),
                &["feature", "dashboard", "configuration"],
            ))
            .expect("bench entry insert");
    }
    store
}

fn bench_search(c: &mut Criterion) {
    let store = build_store();
    let engine = SearchEngine::new();

    c.bench_function("search_all_categories", |b| {
        b.iter(|| {
            engine
                .search(&store, "configure dashboard feature", &SearchOptions::default())
                .expect("search")
        })
    });

    c.bench_function("search_category_filtered", |b| {
        let options = SearchOptions {
            category: Some(Category::Faq),
            ..SearchOptions::default()
        };
        b.iter(|| {
            engine
                .search(&store, "configure dashboard feature", &options)
                .expect("search")
        })
    });

    c.bench_function("search_no_match", |b| {
        b.iter(|| {
            engine
                .search(&store, "zzzz qqqq xxxx", &SearchOptions::default())
                .expect("search")
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
