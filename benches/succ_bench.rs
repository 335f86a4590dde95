use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quasi_succinct::{BitBuffer, EliasFano, SparseRankSelect, UniformlyPartitionedEliasFano};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

fn bench_rank_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_select");
    let mut bits = BitBuffer::new();
    for _ in 0..1000 {
        bits.append_bits(0xAAAAAAAAAAAAAAAAu64, 64); // 64000 bits, 50% density
    }
    let rs = SparseRankSelect::new(bits);

    group.bench_function("rank1", |b| {
        b.iter(|| {
            for i in 0..64000 {
                black_box(rs.rank1(i));
            }
        })
    });

    group.bench_function("select1", |b| {
        b.iter(|| {
            for k in 0..32000 {
                black_box(rs.select1(k).ok());
            }
        })
    });
}

fn bench_elias_fano(c: &mut Criterion) {
    let mut rng = ChaChaRng::seed_from_u64(7);
    let mut values: Vec<u64> = (0..100_000).map(|_| rng.gen_range(0..1u64 << 32)).collect();
    values.sort_unstable();
    let probes: Vec<u64> = (0..10_000).map(|_| rng.gen_range(0..1u64 << 32)).collect();

    let ef = EliasFano::new(&values).unwrap();
    let upef = UniformlyPartitionedEliasFano::new(&values, 128).unwrap();

    let mut group = c.benchmark_group("elias_fano");
    group.bench_function("ef_select", |b| {
        b.iter(|| {
            for i in (0..values.len()).step_by(10) {
                black_box(ef.select(i).ok());
            }
        })
    });
    group.bench_function("ef_next_geq", |b| {
        b.iter(|| {
            for &x in &probes {
                black_box(ef.next_geq(x).ok());
            }
        })
    });
    group.bench_function("upef_select", |b| {
        b.iter(|| {
            for i in (0..values.len()).step_by(10) {
                black_box(upef.select(i).ok());
            }
        })
    });
    group.bench_function("upef_next_geq", |b| {
        b.iter(|| {
            for &x in &probes {
                black_box(upef.next_geq(x).ok());
            }
        })
    });
    group.bench_function("ef_iter", |b| b.iter(|| black_box(ef.iter().sum::<u64>())));
}

criterion_group!(benches, bench_rank_select, bench_elias_fano);
criterion_main!(benches);
