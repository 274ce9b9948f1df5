// Unit tests for src/parse.rs: greedy walks, the backward optimal parse,
// exact consumption, and the match downgrade pass.

use zdeflate::huffman::HuffmanEncoder;
use zdeflate::matchfinder::{Match, MatchFinder, NMATCHES_PER_OFFSET};
use zdeflate::parse::{
    count_parse, downgrade_matches, greedy_count, greedy_steps, optimal_parse, Step,
};
use zdeflate::tables::{
    NUM_DIST_SYMS, NUM_LITLEN_SYMS, STATIC_DIST_LENGTHS, STATIC_LITLEN_LENGTHS,
};

fn find_matches(data: &[u8]) -> Vec<Match> {
    let mut mf = MatchFinder::new(data.len()).unwrap();
    mf.rebuild(data);
    let mut out = vec![Match::default(); data.len() * NMATCHES_PER_OFFSET];
    mf.find_all(0..data.len(), data.len(), &mut out);
    out
}

fn static_encoders() -> (HuffmanEncoder, HuffmanEncoder) {
    let mut lit = HuffmanEncoder::new(NUM_LITLEN_SYMS, 15, 9);
    lit.set_lengths(&STATIC_LITLEN_LENGTHS);
    let mut dist = HuffmanEncoder::new(NUM_DIST_SYMS, 15, 6);
    dist.set_lengths(&STATIC_DIST_LENGTHS);
    (lit, dist)
}

/// Walks a parse and checks it covers the range exactly; returns the steps.
fn walk(best: &[Match], n: usize) -> Vec<(usize, Match)> {
    let mut steps = Vec::new();
    let mut i = 0usize;
    while i < n {
        let m = best[i];
        steps.push((i, m));
        i += (m.length as usize).max(1);
    }
    assert_eq!(i, n, "parse must consume exactly the staged bytes");
    steps
}

#[test]
fn greedy_steps_cover_range() {
    let data = b"abcabcabcabcabcabc".to_vec();
    let matches = find_matches(&data);
    let mut covered = 0usize;
    for (pos, step) in greedy_steps(&data, &matches, 0, 0, data.len()) {
        assert_eq!(pos, covered);
        covered += match step {
            Step::Literal(_) => 1,
            Step::Match { length, .. } => length,
        };
    }
    assert_eq!(covered, data.len());
}

#[test]
fn greedy_count_counts_end_of_block() {
    let data = b"xyz".to_vec();
    let matches = find_matches(&data);
    let (mut lit, mut dist) = static_encoders();
    lit.reset();
    dist.reset();
    greedy_count(&data, &matches, 0, 0, data.len(), &mut lit, &mut dist);
    assert_eq!(lit.freq[256], 1);
    assert_eq!(lit.freq[b'x' as usize], 1);
    assert_eq!(dist.freq.iter().sum::<u32>(), 0);
}

#[test]
fn parse_of_tiny_input_is_all_literals() {
    let data = b"ab".to_vec();
    let matches = find_matches(&data);
    let (lit, dist) = static_encoders();
    let mut cost = Vec::new();
    let mut best = vec![Match::default(); data.len()];
    optimal_parse(&data, &matches, 0, 0, data.len(), &lit, &dist, &mut cost, &mut best);
    assert!(best.iter().all(|m| m.length == 0));
}

#[test]
fn parse_picks_matches_on_repetitive_input() {
    let data: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(800).collect();
    let matches = find_matches(&data);
    let (lit, dist) = static_encoders();
    let mut cost = Vec::new();
    let mut best = vec![Match::default(); data.len()];
    optimal_parse(&data, &matches, 0, 0, data.len(), &lit, &dist, &mut cost, &mut best);
    let steps = walk(&best, data.len());
    let matched: usize = steps
        .iter()
        .map(|(_, m)| if m.length >= 3 { m.length as usize } else { 0 })
        .sum();
    assert!(
        matched > data.len() / 2,
        "expected most of a periodic input to be matched, got {matched}"
    );
    // Every chosen match must reproduce the text it stands for.
    for (pos, m) in steps {
        if m.length >= 3 {
            let len = m.length as usize;
            let off = m.offset as usize;
            assert_eq!(&data[pos - off..pos - off + len], &data[pos..pos + len]);
        }
    }
}

#[test]
fn last_position_stays_literal() {
    let data = vec![b'Q'; 500];
    let matches = find_matches(&data);
    let (lit, dist) = static_encoders();
    let mut cost = Vec::new();
    let mut best = vec![Match::default(); data.len()];
    optimal_parse(&data, &matches, 0, 0, data.len(), &lit, &dist, &mut cost, &mut best);
    let steps = walk(&best, data.len());
    let (last_pos, last) = steps[steps.len() - 1];
    assert_eq!(last.length, 0, "the final byte is always a literal");
    assert_eq!(last_pos, data.len() - 1);
}

#[test]
fn count_parse_matches_walked_steps() {
    let data: Vec<u8> = b"mississippi mississippi".to_vec();
    let matches = find_matches(&data);
    let (lit, dist) = static_encoders();
    let mut cost = Vec::new();
    let mut best = vec![Match::default(); data.len()];
    optimal_parse(&data, &matches, 0, 0, data.len(), &lit, &dist, &mut cost, &mut best);

    let mut lit2 = HuffmanEncoder::new(NUM_LITLEN_SYMS, 15, 9);
    let mut dist2 = HuffmanEncoder::new(NUM_DIST_SYMS, 15, 6);
    count_parse(&data, &best, 0, data.len(), &mut lit2, &mut dist2);
    assert_eq!(lit2.freq[256], 1);
    let steps = walk(&best, data.len());
    let nmatches = steps.iter().filter(|(_, m)| m.length >= 3).count() as u32;
    assert_eq!(dist2.freq.iter().sum::<u32>(), nmatches);
}

#[test]
fn downgrade_demotes_overpriced_matches() {
    let data: Vec<u8> = b"abcXabcYabcZabc!".to_vec();
    let matches = find_matches(&data);
    let (lit, mut dist) = static_encoders();
    let mut cost = Vec::new();
    let mut best = vec![Match::default(); data.len()];
    optimal_parse(&data, &matches, 0, 0, data.len(), &lit, &dist, &mut cost, &mut best);

    // Make every distance cost painful, then check the survivor invariant:
    // a kept match never prices above the literals it replaces.
    use zdeflate::tables::{
        dist_extra_bits, dist_symbol, length_extra_bits, length_symbol,
    };
    dist.set_lengths(&[15u8; NUM_DIST_SYMS]);
    downgrade_matches(&data, &mut best, 0, data.len(), &lit, &dist);
    for (pos, m) in walk(&best, data.len()) {
        if m.length >= 3 {
            let len = m.length as usize;
            let lsym = length_symbol(len);
            let dsym = dist_symbol(m.offset as usize);
            let match_cost = lit.code_len[lsym] as u32
                + length_extra_bits(lsym)
                + dist.code_len[dsym] as u32
                + dist_extra_bits(dsym);
            let lits_cost: u32 = data[pos..pos + len]
                .iter()
                .map(|&b| lit.code_len[b as usize] as u32)
                .sum();
            assert!(
                match_cost <= lits_cost,
                "surviving match at {pos} prices {match_cost} over literals {lits_cost}"
            );
        }
    }
}

#[test]
fn parse_consumes_exactly_with_sub_ranges() {
    let data: Vec<u8> = (0..200u8).chain(0..200u8).chain(0..100u8).collect();
    let matches = find_matches(&data);
    let (lit, dist) = static_encoders();
    let mut cost = Vec::new();
    // Parse an interior sub-range as the block encoder does per sub-block.
    let (start, end) = (100usize, 420usize);
    let mut best = vec![Match::default(); end - start];
    optimal_parse(&data, &matches, 0, start, end, &lit, &dist, &mut cost, &mut best);
    walk(&best, end - start);
}
