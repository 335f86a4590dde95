use quasi_succinct::{EliasFano, MonotoneSequence, UniformlyPartitionedEliasFano};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

/// n distinct-ish sorted values drawn uniformly from [0, universe).
fn uniform(rng: &mut ChaChaRng, n: usize, universe: u64) -> Vec<u64> {
    let mut values: Vec<u64> = (0..n).map(|_| rng.gen_range(0..universe)).collect();
    values.sort_unstable();
    values
}

fn ceil_log2_ratio(universe: u64, n: usize) -> usize {
    let ratio = universe.div_ceil(n as u64);
    if ratio <= 1 {
        0
    } else {
        (64 - (ratio - 1).leading_zeros()) as usize
    }
}

#[test]
fn payload_stays_within_elias_fano_bound() {
    let mut rng = ChaChaRng::seed_from_u64(0x5eed);
    for &n in &[10usize, 100, 1_000, 10_000, 100_000] {
        for &universe in &[n as u64, (n as u64) * 10, 1 << 32, 1 << 50, u64::MAX] {
            let values = uniform(&mut rng, n, universe);
            let ef = EliasFano::with_universe(&values, universe).unwrap();

            let bound = 2 * n + n * ceil_log2_ratio(universe, n);
            // The unary part can reach 3n + 1 bits; that slack is the O(n) term.
            assert!(
                ef.bit_length() <= bound + n + 1,
                "n={n} universe={universe}: {} > {}",
                ef.bit_length(),
                bound + n + 1
            );
            // The rank/select directory adds a constant fraction of the upper bits.
            let upper = ef.bit_length() - n * ef.low_len();
            assert!(ef.directory_bits() <= upper / 2 + 512);

            let plain = n * (64 - (universe - 1).leading_zeros()) as usize;
            assert!(ef.bit_length() <= plain + 3 * n + 1);
        }
    }
}

#[test]
fn partitioned_matches_classical_on_random_data() {
    let mut rng = ChaChaRng::seed_from_u64(42);
    let values = uniform(&mut rng, 20_000, 1 << 36);
    let ef = EliasFano::new(&values).unwrap();
    for block_size in [1, 37, 128, values.len()] {
        let upef = UniformlyPartitionedEliasFano::new(&values, block_size).unwrap();
        assert!(upef.iter().eq(ef.iter()));
        for _ in 0..2_000 {
            let x = rng.gen_range(0..1u64 << 37);
            assert_eq!(upef.rank(x), ef.rank(x));
            assert_eq!(upef.next_geq(x).ok(), ef.next_geq(x).ok());
            assert_eq!(upef.next_leq(x).ok(), ef.next_leq(x).ok());
            let i = rng.gen_range(0..values.len());
            assert_eq!(upef.select(i).unwrap(), ef.select(i).unwrap());
        }
    }
}

#[test]
fn classical_and_partitioned_behind_one_interface() {
    fn summarize(seq: &impl MonotoneSequence) -> (usize, u64, u64, usize) {
        (
            seq.len(),
            seq.next_geq(1_000).unwrap_or(0),
            seq.next_leq(1_000).unwrap_or(0),
            seq.rank(1_000),
        )
    }
    let values: Vec<u64> = (0..5_000).map(|i| i * i).collect();
    let ef = EliasFano::new(&values).unwrap();
    let upef = UniformlyPartitionedEliasFano::new(&values, 64).unwrap();
    assert_eq!(summarize(&ef), (5_000, 1_024, 961, 32));
    assert_eq!(summarize(&ef), summarize(&upef));
}
