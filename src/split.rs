//! Huffman-table block splitting.
//!
//! Switching to fresh Huffman tables pays a fixed header cost, so a split
//! is only worth taking where the symbol statistics genuinely shift. The
//! splitter walks a block in greedy steps, bucketing each step into one of
//! 18 features (16 literal buckets keyed by two high and two low bits of the
//! byte, plus short-match and long-match buckets). Chunks of at least 256
//! features spanning at least 512 bytes are compared against the running
//! accumulation; when the summed proportional delta exceeds 45% of the chunk
//! total, the boundary becomes a split candidate. Candidates are then
//! verified against an actual dynamic-cost estimate of both halves and only
//! the largest genuine saving is kept, recursively, up to [`MAX_SPLITS`]
//! offsets and six levels deep.

use crate::huffman::HuffmanEncoder;
use crate::matchfinder::Match;
use crate::parse::{greedy_steps, Step};
use crate::tables::{
    dist_extra_bits, dist_symbol, length_extra_bits, length_symbol, EOB_SYM, MAX_CODE_LENGTH,
    NUM_DIST_SYMS, NUM_LITLEN_SYMS,
};

/// Upper bound on the number of split offsets (including the block end).
pub const MAX_SPLITS: usize = 64;

const MIN_SPLIT_SIZE: usize = 8_192;
const MAX_DEPTH: usize = 6;
const NFEATURES: usize = 18;
const CHUNK_MIN_FEATURES: u64 = 256;
const CHUNK_MIN_BYTES: usize = 512;
/// A match of at least this length counts as a long-match feature.
const LONG_MATCH: usize = 9;

#[inline]
fn feature_of(step: Step) -> usize {
    match step {
        Step::Literal(b) => (((b >> 6) & 3) << 2 | (b & 3)) as usize,
        Step::Match { length, .. } => {
            if length < LONG_MATCH {
                16
            } else {
                17
            }
        }
    }
}

/// Frequency snapshot of a candidate's left side.
struct Candidate {
    offset: usize,
    lit_freq: Vec<u32>,
    dist_freq: Vec<u32>,
}

/// Scratch shared across the recursion.
struct Splitter<'a> {
    window: &'a [u8],
    matches: &'a [Match],
    block_start: usize,
    lit: HuffmanEncoder,
    dist: HuffmanEncoder,
}

impl Splitter<'_> {
    /// Approximate cost in bits of a dynamic block with the given symbol
    /// frequencies: entropy-coded body plus a rough per-defined-symbol table
    /// charge. Exactness is unnecessary; both sides of every comparison use
    /// the same estimate.
    fn dynamic_cost(&mut self, lit_freq: &[u32], dist_freq: &[u32]) -> u64 {
        self.lit.reset();
        self.lit.freq.copy_from_slice(lit_freq);
        self.lit.freq[EOB_SYM] += 1;
        self.lit.estimate_dynamic_codelens();
        self.dist.reset();
        self.dist.freq.copy_from_slice(dist_freq);
        self.dist.estimate_dynamic_codelens();

        let mut bits: u64 = 17; // block header plus HLIT/HDIST/HCLEN
        let mut defined = 0u64;
        for (sym, (&f, &l)) in self
            .lit
            .freq
            .iter()
            .zip(self.lit.code_len.iter())
            .enumerate()
        {
            if l > 0 {
                defined += 1;
            }
            if f > 0 && sym > EOB_SYM {
                bits += f as u64 * length_extra_bits(sym) as u64;
            }
            bits += f as u64 * l as u64;
        }
        for (sym, (&f, &l)) in self
            .dist
            .freq
            .iter()
            .zip(self.dist.code_len.iter())
            .enumerate()
        {
            if l > 0 {
                defined += 1;
            }
            bits += f as u64 * (l as u64 + dist_extra_bits(sym) as u64);
        }
        // Each defined symbol costs roughly one code-length-table entry.
        bits + defined * 3
    }

    fn count_range(&self, start: usize, end: usize, lit_freq: &mut [u32], dist_freq: &mut [u32]) {
        for (_, step) in greedy_steps(self.window, self.matches, self.block_start, start, end) {
            match step {
                Step::Literal(b) => lit_freq[b as usize] += 1,
                Step::Match { length, offset } => {
                    lit_freq[length_symbol(length)] += 1;
                    dist_freq[dist_symbol(offset)] += 1;
                }
            }
        }
    }

    fn split_range(&mut self, start: usize, end: usize, depth: usize, splits: &mut Vec<usize>) {
        if depth >= MAX_DEPTH || end - start < MIN_SPLIT_SIZE || splits.len() >= MAX_SPLITS - 1 {
            return;
        }

        // Pass 1: scan for boundaries where the feature distribution moves.
        let mut acc = [0u64; NFEATURES];
        let mut acc_total: u64 = 0;
        let mut cur = [0u64; NFEATURES];
        let mut cur_total: u64 = 0;
        let mut chunk_start = start;
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut lit_freq = vec![0u32; NUM_LITLEN_SYMS];
        let mut dist_freq = vec![0u32; NUM_DIST_SYMS];

        for (pos, step) in greedy_steps(self.window, self.matches, self.block_start, start, end) {
            let step_len = match step {
                Step::Literal(b) => {
                    lit_freq[b as usize] += 1;
                    1
                }
                Step::Match { length, offset } => {
                    lit_freq[length_symbol(length)] += 1;
                    dist_freq[dist_symbol(offset)] += 1;
                    length
                }
            };
            cur[feature_of(step)] += 1;
            cur_total += 1;
            let boundary = pos + step_len;

            if cur_total >= CHUNK_MIN_FEATURES && boundary - chunk_start >= CHUNK_MIN_BYTES {
                if acc_total > 0 {
                    let mut delta: u64 = 0;
                    for f in 0..NFEATURES {
                        let expected = acc[f] * cur_total / acc_total;
                        delta += expected.abs_diff(cur[f]);
                    }
                    if delta * 100 > cur_total * 45 && candidates.len() < 2 * MAX_SPLITS {
                        candidates.push(Candidate {
                            offset: boundary,
                            lit_freq: lit_freq.clone(),
                            dist_freq: dist_freq.clone(),
                        });
                    }
                }
                for f in 0..NFEATURES {
                    acc[f] += cur[f];
                }
                acc_total += cur_total;
                cur = [0u64; NFEATURES];
                cur_total = 0;
                chunk_start = boundary;
            }
        }

        if candidates.is_empty() {
            return;
        }

        // Pass 2: verify candidates against real cost estimates. The right
        // side's frequencies come from subtracting the snapshot from the
        // range totals.
        let mut total_lit = vec![0u32; NUM_LITLEN_SYMS];
        let mut total_dist = vec![0u32; NUM_DIST_SYMS];
        self.count_range(start, end, &mut total_lit, &mut total_dist);
        let whole = self.dynamic_cost(&total_lit, &total_dist);

        let mut best_offset = 0usize;
        let mut best_saving: i64 = 0;
        let mut right_lit = vec![0u32; NUM_LITLEN_SYMS];
        let mut right_dist = vec![0u32; NUM_DIST_SYMS];
        for cand in &candidates {
            if cand.offset <= start || cand.offset >= end {
                continue;
            }
            for (r, (&t, &l)) in right_lit
                .iter_mut()
                .zip(total_lit.iter().zip(cand.lit_freq.iter()))
            {
                *r = t - l;
            }
            for (r, (&t, &l)) in right_dist
                .iter_mut()
                .zip(total_dist.iter().zip(cand.dist_freq.iter()))
            {
                *r = t - l;
            }
            let cost = self.dynamic_cost(&cand.lit_freq, &cand.dist_freq)
                + self.dynamic_cost(&right_lit, &right_dist);
            let saving = whole as i64 - cost as i64;
            if saving > best_saving {
                best_saving = saving;
                best_offset = cand.offset;
            }
        }

        if best_saving <= 0 {
            return;
        }

        self.split_range(start, best_offset, depth + 1, splits);
        if splits.len() < MAX_SPLITS - 1 {
            splits.push(best_offset);
        }
        self.split_range(best_offset, end, depth + 1, splits);
    }
}

/// Returns the ordered split offsets for `[block_start, block_end)`, always
/// ending with `block_end` and holding at most [`MAX_SPLITS`] entries.
pub fn split_block(
    window: &[u8],
    matches: &[Match],
    block_start: usize,
    block_end: usize,
    splits: &mut Vec<usize>,
) {
    splits.clear();
    let mut splitter = Splitter {
        window,
        matches,
        block_start,
        lit: HuffmanEncoder::new(NUM_LITLEN_SYMS, MAX_CODE_LENGTH, 0),
        dist: HuffmanEncoder::new(NUM_DIST_SYMS, MAX_CODE_LENGTH, 0),
    };
    splitter.split_range(block_start, block_end, 0, splits);
    splits.push(block_end);
    debug_assert!(splits.windows(2).all(|w| w[0] < w[1]));
}
