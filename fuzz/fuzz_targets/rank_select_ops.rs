#![no_main]
use libfuzzer_sys::fuzz_target;
use quasi_succinct::{BitBuffer, SparseRankSelect};

fuzz_target!(|data: (Vec<u64>, usize)| {
    let (words, len_raw) = data;
    if words.is_empty() {
        return;
    }

    let len = len_raw % (words.len() * 64);
    if len == 0 {
        return;
    }

    let mut bits = BitBuffer::new();
    for (i, &w) in words.iter().enumerate() {
        bits.append_bits(w, len.saturating_sub(i * 64).min(64));
    }
    let rs = SparseRankSelect::new(bits);

    // Check total rank
    let mut expected_total = 0;
    for i in 0..len {
        if (words[i / 64] >> (i % 64)) & 1 == 1 {
            expected_total += 1;
        }
    }

    assert_eq!(rs.rank1(len), expected_total);

    // Check select1 for a derived rank
    if expected_total > 0 {
        let k = (len_raw / 13) % expected_total;
        match rs.select1(k) {
            Ok(pos) => {
                assert!(pos < len);
                assert_eq!(rs.rank1(pos + 1), k + 1);
                assert_eq!(rs.rank1(pos), k);
            }
            Err(e) => panic!("select1({k}) failed for expected_total={expected_total}: {e}"),
        }
    }

    // And select0 for the complementary rank
    let zeros = len - expected_total;
    if zeros > 0 {
        let k = (len_raw / 7) % zeros;
        let pos = rs.select0(k).expect("select0 within range");
        assert!(!rs.get(pos));
        assert_eq!(rs.rank0(pos), k);
    }
});
