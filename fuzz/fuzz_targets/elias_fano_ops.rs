#![no_main]
use libfuzzer_sys::fuzz_target;
use quasi_succinct::{EliasFano, UniformlyPartitionedEliasFano};

fuzz_target!(|data: (Vec<u64>, u8, Vec<u64>)| {
    let (mut values, block_size, probes) = data;
    values.retain(|&v| v < u64::MAX);
    values.sort_unstable();

    let ef = EliasFano::new(&values).unwrap();
    let upef = UniformlyPartitionedEliasFano::new(&values, block_size as usize).unwrap();

    for &x in &probes {
        let expected_rank = values.partition_point(|&v| v < x);
        assert_eq!(ef.rank(x), expected_rank);
        assert_eq!(upef.rank(x), expected_rank);
        assert_eq!(ef.next_geq(x).ok(), upef.next_geq(x).ok());
        assert_eq!(ef.next_leq(x).ok(), upef.next_leq(x).ok());
    }

    // Decoding arbitrary bytes must never panic.
    let _ = EliasFano::from_bytes(&probes.iter().flat_map(|p| p.to_le_bytes()).collect::<Vec<_>>());
    assert_eq!(EliasFano::from_bytes(&ef.to_bytes()).unwrap(), ef);
});
