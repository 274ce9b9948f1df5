// Unit tests for src/split.rs: output shape, stability on uniform data, and
// split detection on inputs with a sharp statistics change.

use zdeflate::matchfinder::{Match, MatchFinder, NMATCHES_PER_OFFSET};
use zdeflate::split::{split_block, MAX_SPLITS};

fn matches_for(data: &[u8]) -> Vec<Match> {
    let mut mf = MatchFinder::new(data.len()).unwrap();
    mf.rebuild(data);
    let mut out = vec![Match::default(); data.len() * NMATCHES_PER_OFFSET];
    mf.find_all(0..data.len(), data.len(), &mut out);
    out
}

fn splits_for(data: &[u8]) -> Vec<usize> {
    let matches = matches_for(data);
    let mut splits = Vec::new();
    split_block(data, &matches, 0, data.len(), &mut splits);
    splits
}

fn lcg_bytes(len: usize, mut state: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((state >> 24) as u8);
    }
    out
}

#[test]
fn splits_end_with_block_end_and_are_ordered() {
    let data = lcg_bytes(40_000, 5);
    let splits = splits_for(&data);
    assert_eq!(*splits.last().unwrap(), data.len());
    assert!(splits.windows(2).all(|w| w[0] < w[1]));
    assert!(splits.len() <= MAX_SPLITS);
    assert!(splits.iter().all(|&s| s > 0 && s <= data.len()));
}

#[test]
fn small_blocks_never_split() {
    let data = lcg_bytes(4_096, 9);
    let splits = splits_for(&data);
    assert_eq!(splits, vec![data.len()]);
}

#[test]
fn uniform_data_does_not_split() {
    // One statistical regime end to end; a split would only add table cost.
    let data: Vec<u8> = b"all work and no play makes jack a dull boy. "
        .iter()
        .copied()
        .cycle()
        .take(64_000)
        .collect();
    let splits = splits_for(&data);
    assert_eq!(splits, vec![data.len()]);
}

#[test]
fn sharp_regime_change_is_detected() {
    // Half compressible ASCII text, half incompressible noise: the two
    // halves want very different code tables.
    let mut data: Vec<u8> = b"what a piece of work is man how noble in reason "
        .iter()
        .copied()
        .cycle()
        .take(40_000)
        .collect();
    data.extend_from_slice(&lcg_bytes(40_000, 77));
    let splits = splits_for(&data);
    assert!(
        splits.len() >= 2,
        "expected at least one split between text and noise, got {splits:?}"
    );
    // The found boundary should sit near the regime change.
    let boundary = splits[0];
    assert!(
        (30_000..=50_000).contains(&boundary),
        "split at {boundary} is far from the 40000 boundary"
    );
}

#[test]
fn split_offsets_partition_the_block() {
    let mut data = lcg_bytes(30_000, 3);
    data.extend(std::iter::repeat(b'z').take(30_000));
    let splits = splits_for(&data);
    let mut prev = 0usize;
    for &s in &splits {
        assert!(s > prev);
        prev = s;
    }
    assert_eq!(prev, data.len());
}
