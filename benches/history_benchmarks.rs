use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use fortytwo_monitor::models::{Address, Amount, BalanceSnapshot};
use fortytwo_monitor::store::HistoryStore;

fn create_test_address(id: u64) -> Address {
    Address::parse(&format!("0x{:040x}", id + 1)).expect("valid address")
}

fn create_test_snapshot(id: u64, round: u128) -> BalanceSnapshot {
    BalanceSnapshot::new(
        create_test_address(id),
        Amount::from_wei((id as u128 + 1) * 1_000_000_000_000_000_000 + round),
        if id % 3 == 0 { Amount::Unavailable } else { Amount::from_wei(round) },
    )
}

fn bench_record_and_diff_in_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_in_memory");

    for size in [1u64, 10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("record_and_diff", size), size, |b, &size| {
            let mut store = HistoryStore::new_in_memory();
            let mut round = 0u128;
            b.iter(|| {
                round += 1;
                for i in 0..size {
                    let _ = store.record_and_diff(black_box(&create_test_snapshot(i, round)));
                }
            });
        });
    }

    group.finish();
}

fn bench_record_and_diff_persisted(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut group = c.benchmark_group("history_persisted");
    group.sample_size(20);

    for entries in [10u64, 100].iter() {
        let path = temp_dir.path().join(format!("history_{}.json", entries));
        let mut store = HistoryStore::load(&path).expect("Failed to load history");
        for i in 0..*entries {
            store
                .record_and_diff(&create_test_snapshot(i, 0))
                .expect("Failed to prepopulate history");
        }

        group.bench_with_input(BenchmarkId::new("flush_per_update", entries), entries, |b, _| {
            let mut round = 0u128;
            b.iter(|| {
                round += 1;
                let _ = store.record_and_diff(black_box(&create_test_snapshot(0, round)));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record_and_diff_in_memory, bench_record_and_diff_persisted);
criterion_main!(benches);
