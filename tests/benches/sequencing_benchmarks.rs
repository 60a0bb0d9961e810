//! # Lot Sequencing Benchmarks
//!
//! | Operation | Scale |
//! |-----------|-------|
//! | reorder (full auction) | 100 / 500 / 1000 lots |
//! | renumber (pairwise swaps) | 100 / 500 / 1000 lots |
//! | list | 1000 lots |

use ah_01_lot_sequencing::{
    CreateLot, InMemoryKVStore, KvLotRepository, LotNumberMapping, LotSequencingApi,
    LotSequencingDependencies, LotSequencingService, RenumberLots, ReorderLots, SequencingConfig,
    SystemClock,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use tokio::runtime::Runtime;

type Service = LotSequencingService<
    KvLotRepository<InMemoryKVStore>,
    KvLotRepository<InMemoryKVStore>,
    SystemClock,
>;

fn service() -> Service {
    let repository = KvLotRepository::new(InMemoryKVStore::new());
    LotSequencingService::new(
        LotSequencingDependencies {
            repository: repository.clone(),
            audit: repository,
            clock: SystemClock,
        },
        SequencingConfig::default(),
    )
}

/// A service holding `size` lots numbered 1..=size, and their ids.
fn seeded(rt: &Runtime, size: usize) -> (Service, Vec<String>) {
    let service = service();
    let ids = rt.block_on(async {
        let mut ids = Vec::with_capacity(size);
        for number in 1..=size {
            let lot = service
                .create_lot(CreateLot {
                    auction_id: "bench".into(),
                    lot_number: number.to_string(),
                    title: format!("Lot {number}"),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(lot.id.to_string());
        }
        ids
    });
    (service, ids)
}

fn bench_reorder(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("ah-01-reorder");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 500, 1000] {
        let (service, mut ids) = seeded(&rt, size);
        ids.reverse();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("full_auction", size), &ids, |b, ids| {
            b.iter(|| {
                rt.block_on(service.reorder_lots(ReorderLots {
                    auction_id: "bench".into(),
                    order: black_box(ids.clone()),
                    ..Default::default()
                }))
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_renumber(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("ah-01-renumber");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 500, 1000] {
        let (service, _) = seeded(&rt, size);
        // Swapping each odd number with its successor is its own inverse,
        // so every iteration starts from a valid state.
        let mappings: Vec<LotNumberMapping> = (1..size)
            .step_by(2)
            .flat_map(|n| {
                [
                    LotNumberMapping {
                        original_lot_number: n.to_string(),
                        new_lot_number: (n + 1).to_string(),
                    },
                    LotNumberMapping {
                        original_lot_number: (n + 1).to_string(),
                        new_lot_number: n.to_string(),
                    },
                ]
            })
            .collect();

        group.throughput(Throughput::Elements(mappings.len() as u64));
        group.bench_with_input(BenchmarkId::new("pairwise_swaps", size), &mappings, |b, mappings| {
            b.iter(|| {
                rt.block_on(service.renumber_lots(RenumberLots {
                    auction_id: "bench".into(),
                    mappings: black_box(mappings.clone()),
                    user_id: None,
                }))
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, _) = seeded(&rt, 1000);

    c.bench_function("ah-01-list/1000", |b| {
        b.iter(|| rt.block_on(service.list_lots(black_box("bench"))).unwrap())
    });
}

criterion_group!(benches, bench_reorder, bench_renumber, bench_list);
criterion_main!(benches);
