//! Cost-driven match selection.
//!
//! [`optimal_parse`] runs a backward dynamic program over a sub-block: for
//! each position, the cheapest continuation is either a literal or one of
//! the candidate matches at that position, priced under the current
//! literal/length and distance code lengths (RFC 1951 §3.2.5 symbols plus
//! extra bits). Long candidates are taken at full length only; short ones
//! are tried at every length down to `MIN_MATCH`, which is where most of the
//! ratio win over greedy parsing comes from.
//!
//! [`greedy_steps`] walks a range taking the longest candidate at each
//! position; it seeds the first frequency estimate and feeds the block
//! splitter. [`downgrade_matches`] post-processes a final parse, demoting
//! matches that price worse than their bytes as literals.

use crate::huffman::HuffmanEncoder;
use crate::matchfinder::{Match, LAST_LITERALS, NMATCHES_PER_OFFSET};
use crate::tables::{
    dist_extra_bits, dist_symbol, length_extra_bits, length_symbol, EOB_SYM, MIN_MATCH,
};

/// Candidates at least this long are only considered at full length.
pub const LEAVE_ALONE: usize = 40;

/// Price in bits of emitting a match of `len` at `offset`.
#[inline]
fn match_price(len: usize, offset: usize, lit: &HuffmanEncoder, dist: &HuffmanEncoder) -> u32 {
    let lsym = length_symbol(len);
    let dsym = dist_symbol(offset);
    lit.code_len[lsym] as u32
        + length_extra_bits(lsym)
        + dist.code_len[dsym] as u32
        + dist_extra_bits(dsym)
}

/// One step of a greedy longest-match walk.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Literal(u8),
    Match { length: usize, offset: usize },
}

/// Iterator over greedy longest-match steps of `[start, end)`.
///
/// `matches` holds [`NMATCHES_PER_OFFSET`] slots per position relative to
/// `block_start`; slot 0 is the longest candidate. Matches are clamped so
/// they never run past `end - LAST_LITERALS`.
pub struct GreedySteps<'a> {
    window: &'a [u8],
    matches: &'a [Match],
    block_start: usize,
    pos: usize,
    end: usize,
}

pub fn greedy_steps<'a>(
    window: &'a [u8],
    matches: &'a [Match],
    block_start: usize,
    start: usize,
    end: usize,
) -> GreedySteps<'a> {
    GreedySteps {
        window,
        matches,
        block_start,
        pos: start,
        end,
    }
}

impl Iterator for GreedySteps<'_> {
    type Item = (usize, Step);

    fn next(&mut self) -> Option<(usize, Step)> {
        if self.pos >= self.end {
            return None;
        }
        let pos = self.pos;
        let limit = self.end - LAST_LITERALS;
        let cand = self.matches[(pos - self.block_start) * NMATCHES_PER_OFFSET];
        let mut len = cand.length as usize;
        if pos < limit {
            len = len.min(limit - pos);
        } else {
            len = 0;
        }
        let step = if len >= MIN_MATCH {
            self.pos += len;
            Step::Match {
                length: len,
                offset: cand.offset as usize,
            }
        } else {
            self.pos += 1;
            Step::Literal(self.window[pos])
        };
        Some((pos, step))
    }
}

/// Accumulates symbol frequencies (including the end-of-block symbol) from a
/// greedy walk of `[start, end)`.
pub fn greedy_count(
    window: &[u8],
    matches: &[Match],
    block_start: usize,
    start: usize,
    end: usize,
    lit: &mut HuffmanEncoder,
    dist: &mut HuffmanEncoder,
) {
    for (_, step) in greedy_steps(window, matches, block_start, start, end) {
        match step {
            Step::Literal(b) => lit.add(b as usize),
            Step::Match { length, offset } => {
                lit.add(length_symbol(length));
                dist.add(dist_symbol(offset));
            }
        }
    }
    lit.add(EOB_SYM);
}

/// Backward shortest-path parse of `[start, end)` under the code lengths in
/// `lit` / `dist`. Fills `best[i - start]` with the chosen step per position
/// (`length == 0` for a literal) and uses `cost` as scratch.
///
/// Every symbol a candidate could use must have a nonzero code length;
/// callers inject default lengths for unused symbols before parsing.
#[allow(clippy::too_many_arguments)]
pub fn optimal_parse(
    window: &[u8],
    matches: &[Match],
    block_start: usize,
    start: usize,
    end: usize,
    lit: &HuffmanEncoder,
    dist: &HuffmanEncoder,
    cost: &mut Vec<u32>,
    best: &mut [Match],
) {
    let n = end - start;
    debug_assert!(n > 0);
    debug_assert!(best.len() >= n);
    cost.clear();
    cost.resize(n + 1, 0);
    let limit = n - LAST_LITERALS;

    for i in (0..n).rev() {
        let wpos = start + i;
        let b = window[wpos] as usize;
        debug_assert!(lit.code_len[b] > 0, "literal without a price");
        let mut best_cost = lit.code_len[b] as u32 + cost[i + 1];
        let mut chosen = Match::default();

        if i + MIN_MATCH <= limit {
            let slots =
                &matches[(wpos - block_start) * NMATCHES_PER_OFFSET..][..NMATCHES_PER_OFFSET];
            for cand in slots {
                if cand.length == 0 {
                    break;
                }
                let offset = cand.offset as usize;
                let max_k = (cand.length as usize).min(limit - i);
                if max_k < MIN_MATCH {
                    continue;
                }
                if cand.length as usize >= LEAVE_ALONE {
                    let k = max_k;
                    let c = match_price(k, offset, lit, dist) + cost[i + k];
                    if c < best_cost {
                        best_cost = c;
                        chosen = Match {
                            length: k as u16,
                            offset: cand.offset,
                        };
                    }
                } else {
                    for k in MIN_MATCH..=max_k {
                        let c = match_price(k, offset, lit, dist) + cost[i + k];
                        if c < best_cost {
                            best_cost = c;
                            chosen = Match {
                                length: k as u16,
                                offset: cand.offset,
                            };
                        }
                    }
                }
            }
        }

        cost[i] = best_cost;
        best[i] = chosen;
    }
}

/// Recounts symbol frequencies (including end-of-block) from a parse.
pub fn count_parse(
    window: &[u8],
    best: &[Match],
    start: usize,
    end: usize,
    lit: &mut HuffmanEncoder,
    dist: &mut HuffmanEncoder,
) {
    let mut i = 0usize;
    let n = end - start;
    while i < n {
        let m = best[i];
        if (m.length as usize) >= MIN_MATCH {
            lit.add(length_symbol(m.length as usize));
            dist.add(dist_symbol(m.offset as usize));
            i += m.length as usize;
        } else {
            lit.add(window[start + i] as usize);
            i += 1;
        }
    }
    debug_assert_eq!(i, n, "parse does not cover the range exactly");
    lit.add(EOB_SYM);
}

/// With the final code lengths fixed, demotes any match whose emission costs
/// more bits than spelling its bytes as literals. Matches whose bytes lack a
/// literal code are kept.
pub fn downgrade_matches(
    window: &[u8],
    best: &mut [Match],
    start: usize,
    end: usize,
    lit: &HuffmanEncoder,
    dist: &HuffmanEncoder,
) {
    let n = end - start;
    let mut i = 0usize;
    while i < n {
        let m = best[i];
        let len = m.length as usize;
        if len < MIN_MATCH {
            i += 1;
            continue;
        }
        let mut lits_cost: u32 = 0;
        let mut priceable = true;
        for j in 0..len {
            let l = lit.code_len[window[start + i + j] as usize];
            if l == 0 {
                priceable = false;
                break;
            }
            lits_cost += l as u32;
        }
        if priceable && match_price(len, m.offset as usize, lit, dist) > lits_cost {
            for slot in &mut best[i..i + len] {
                *slot = Match::default();
            }
        }
        i += len;
    }
}
