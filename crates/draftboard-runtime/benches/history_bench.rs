//! Benchmarks for draft history and the draft operators.
//!
//! Run with: cargo bench -p draftboard-runtime --bench history_bench
//!
//! Performance budgets:
//! - push at the depth limit (100 snapshots): < 1µs
//! - undo/redo: < 50ns (cursor move plus Arc clone)
//! - is_dirty on a 200-key selection: < 10µs
//! - reduce_drop of 10 items onto 500 placed items: < 50µs

use std::collections::BTreeSet;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use draftboard_core::{Buckets, FieldSelection, ItemDescriptor, Tier, TransferPayload};
use draftboard_runtime::{DraftHistory, HistoryConfig, reduce_drop};

fn wide_selection(keys: usize) -> FieldSelection {
    FieldSelection::from_grants((0..keys).map(|k| {
        let subkeys: Vec<String> = (0..8).map(|s| format!("field_{s}")).collect();
        (format!("Entity{k}"), subkeys)
    }))
}

fn placed_buckets(per_tier: u64) -> Buckets {
    Buckets::from_assignments(Tier::ALL.into_iter().enumerate().map(|(i, tier)| {
        let start = i as u64 * per_tier;
        let items = (start..start + per_tier)
            .map(|id| ItemDescriptor::new(id, format!("item-{id}")))
            .collect();
        (tier, items)
    }))
}

// =============================================================================
// History operations
// =============================================================================

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history/ops");

    // Steady state: every push evicts one snapshot.
    group.bench_function("push_at_depth_limit", |b| {
        let mut history = DraftHistory::new(0u64, HistoryConfig::default());
        for v in 1..=100 {
            history.push(v);
        }
        let mut next = 101u64;
        b.iter(|| {
            history.push(black_box(next));
            next += 1;
        })
    });

    group.bench_function("undo_redo_pair", |b| {
        let mut history = DraftHistory::new(0u64, HistoryConfig::default());
        for v in 1..=50 {
            history.push(v);
        }
        b.iter(|| {
            black_box(history.undo());
            black_box(history.redo());
        })
    });

    for keys in [10usize, 200] {
        group.bench_with_input(BenchmarkId::new("is_dirty", keys), &keys, |b, &keys| {
            let baseline = wide_selection(keys);
            let mut history = DraftHistory::new(baseline.clone(), HistoryConfig::default());
            history.push(baseline.with_key_toggled("Entity0", false));
            history.push(baseline);
            b.iter(|| black_box(history.is_dirty()))
        });
    }

    group.finish();
}

// =============================================================================
// Draft operators
// =============================================================================

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("draft/operators");

    group.bench_function("with_selected_keys_200", |b| {
        let selection = wide_selection(200);
        let keys: BTreeSet<String> = (0..100).map(|k| format!("Entity{k}")).collect();
        b.iter(|| black_box(selection.with_selected_keys(black_box(keys.clone()))))
    });

    group.bench_function("reduce_drop_10_onto_500", |b| {
        let buckets = placed_buckets(100);
        let payload = TransferPayload::List {
            items: (1000..1010)
                .map(|id| ItemDescriptor::new(id, format!("new-{id}")))
                .collect(),
        }
        .to_transfer_string()
        .unwrap();
        b.iter(|| black_box(reduce_drop(&buckets, Tier::Epic, Some(black_box(payload.as_str())))))
    });

    group.bench_function("reduce_duplicate_drop", |b| {
        let buckets = placed_buckets(100);
        let payload = TransferPayload::Single {
            item: ItemDescriptor::new(42, "item-42"),
        }
        .to_transfer_string()
        .unwrap();
        b.iter(|| black_box(reduce_drop(&buckets, Tier::Rare, Some(black_box(payload.as_str())))))
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_history, bench_operators);

criterion_main!(benches);
