//! DEFLATE block encoding.
//!
//! One [`BlockEncoder`] drives each sub-block through:
//!
//! 1. A greedy frequency seed and a static-versus-dynamic cost estimate.
//! 2. For dynamic blocks, a convergence loop: assign default lengths to
//!    unused symbols, run the optimal parser, recount, rebuild tables, and
//!    repeat a fixed number of passes (code lengths and the parse depend on
//!    each other, so neither can be computed in one shot).
//! 3. A match-to-literal downgrade pass under the final code lengths, an
//!    RLE-friendly frequency variant kept only when it prices smaller, and
//!    the HLIT/HDIST/HCLEN header with the mask-searched code-length table.
//! 4. Body emission, closed by the end-of-block symbol.
//! 5. A size check against the raw bytes: a compressed sub-block that fails
//!    to beat them is rewound via the bit writer checkpoint and re-emitted
//!    as stored blocks of at most 65,535 bytes each.
//!
//! Dynamic blocks always define at least two distance codes; several widely
//! deployed decoders reject a table with fewer.

use crate::bitio::BitWriter;
use crate::error::StreamError;
use crate::huffman::{
    optimize_frequencies_for_rle, plan_code_length_table, write_code_length_table, HuffmanEncoder,
};
use crate::matchfinder::Match;
use crate::parse::{count_parse, downgrade_matches, greedy_count, optimal_parse};
use crate::tables::{
    dist_extra_bits, dist_extra_value, dist_symbol, length_extra_bits, length_extra_value,
    length_symbol, EOB_SYM, MAX_CODE_LENGTH, MAX_PRECODE_LENGTH, MAX_STORED_BLOCK, MIN_MATCH,
    NUM_DIST_SYMS, NUM_LITLEN_SYMS, NUM_PRECODE_SYMS, STATIC_DIST_LENGTHS, STATIC_LITLEN_LENGTHS,
};

/// Default length injected for unused literal/length symbols before a parse.
const DEFAULT_LITLEN_LENGTH: u8 = 9;
/// Default length injected for unused distance symbols before a parse.
const DEFAULT_DIST_LENGTH: u8 = 6;
/// Optimal-parse refinement passes after the first parse.
const EXTRA_PARSE_PASSES: usize = 3;

pub struct BlockEncoder {
    lit: HuffmanEncoder,
    dist: HuffmanEncoder,
    precode: HuffmanEncoder,
    cost: Vec<u32>,
    best: Vec<Match>,
}

impl BlockEncoder {
    pub fn new(max_block: usize) -> Result<BlockEncoder, StreamError> {
        let mut best = Vec::new();
        best.try_reserve_exact(max_block)
            .map_err(|_| StreamError::Memory)?;
        let mut cost = Vec::new();
        cost.try_reserve_exact(max_block + 1)
            .map_err(|_| StreamError::Memory)?;
        Ok(BlockEncoder {
            lit: HuffmanEncoder::new(NUM_LITLEN_SYMS, MAX_CODE_LENGTH, DEFAULT_LITLEN_LENGTH),
            dist: HuffmanEncoder::new(NUM_DIST_SYMS, MAX_CODE_LENGTH, DEFAULT_DIST_LENGTH),
            precode: HuffmanEncoder::new(NUM_PRECODE_SYMS, MAX_PRECODE_LENGTH, 0),
            cost,
            best,
        })
    }

    /// Encodes one input block, already partitioned by the splitter into the
    /// sub-block boundaries in `splits` (each entry an exclusive end offset,
    /// the last one `block_end`). `is_final` marks the very last block of
    /// the stream; only its last sub-block carries BFINAL.
    pub fn encode_block(
        &mut self,
        w: &mut BitWriter,
        window: &[u8],
        block_start: usize,
        matches: &[Match],
        splits: &[usize],
        is_final: bool,
    ) -> Result<(), StreamError> {
        let mut sub_start = block_start;
        for (i, &sub_end) in splits.iter().enumerate() {
            let final_sub = is_final && i == splits.len() - 1;
            self.encode_sub_block(w, window, block_start, sub_start, sub_end, matches, final_sub)?;
            sub_start = sub_end;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_sub_block(
        &mut self,
        w: &mut BitWriter,
        window: &[u8],
        block_start: usize,
        start: usize,
        end: usize,
        matches: &[Match],
        final_sub: bool,
    ) -> Result<(), StreamError> {
        debug_assert!(start < end);
        let raw_len = end - start;
        let start_bits = w.bit_len();
        let cp = w.checkpoint();

        // Greedy seed and the static/dynamic decision.
        self.lit.reset();
        self.dist.reset();
        greedy_count(window, matches, block_start, start, end, &mut self.lit, &mut self.dist);
        ensure_two_dist_codes(&mut self.dist);

        let static_bits = self.static_cost();
        self.lit.build_dynamic_codewords();
        self.dist.build_dynamic_codewords();
        let dynamic_bits = self.dynamic_cost_estimate();

        if dynamic_bits < static_bits {
            self.encode_dynamic(w, window, block_start, start, end, matches, final_sub)?;
        } else {
            self.encode_static(w, window, block_start, start, end, matches, final_sub)?;
        }

        // Anything not strictly smaller than the raw bytes becomes stored.
        let used = w.bit_len() - start_bits;
        if used >= raw_len as u64 * 8 {
            w.restore(cp);
            self.emit_stored(w, window, start, end, final_sub)?;
        }
        Ok(())
    }

    fn encode_static(
        &mut self,
        w: &mut BitWriter,
        window: &[u8],
        block_start: usize,
        start: usize,
        end: usize,
        matches: &[Match],
        final_sub: bool,
    ) -> Result<(), StreamError> {
        self.lit.set_lengths(&STATIC_LITLEN_LENGTHS);
        self.lit.build_static_codewords();
        self.dist.set_lengths(&STATIC_DIST_LENGTHS);
        self.dist.build_static_codewords();

        let n = end - start;
        self.best.clear();
        self.best.resize(n, Match::default());
        optimal_parse(
            window,
            matches,
            block_start,
            start,
            end,
            &self.lit,
            &self.dist,
            &mut self.cost,
            &mut self.best,
        );
        downgrade_matches(window, &mut self.best, start, end, &self.lit, &self.dist);

        w.put_bits(final_sub as u32, 1)?;
        w.put_bits(0b01, 2)?;
        self.emit_body(w, window, start, end)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_dynamic(
        &mut self,
        w: &mut BitWriter,
        window: &[u8],
        block_start: usize,
        start: usize,
        end: usize,
        matches: &[Match],
        final_sub: bool,
    ) -> Result<(), StreamError> {
        let n = end - start;
        self.best.clear();
        self.best.resize(n, Match::default());

        // Convergence: the parse depends on the code lengths and vice versa.
        for _ in 0..=EXTRA_PARSE_PASSES {
            self.lit.assign_default_lengths();
            self.dist.assign_default_lengths();
            optimal_parse(
                window,
                matches,
                block_start,
                start,
                end,
                &self.lit,
                &self.dist,
                &mut self.cost,
                &mut self.best,
            );
            self.lit.reset();
            self.dist.reset();
            count_parse(window, &self.best, start, end, &mut self.lit, &mut self.dist);
            ensure_two_dist_codes(&mut self.dist);
            self.lit.build_dynamic_codewords();
            self.dist.build_dynamic_codewords();
        }

        // Final lengths are now fixed; demote matches that priced themselves
        // out, then rebuild pruned tables from the final step sequence.
        downgrade_matches(window, &mut self.best, start, end, &self.lit, &self.dist);
        self.lit.reset();
        self.dist.reset();
        count_parse(window, &self.best, start, end, &mut self.lit, &mut self.dist);
        ensure_two_dist_codes(&mut self.dist);
        self.lit.build_dynamic_codewords();
        self.dist.build_dynamic_codewords();

        // RLE-friendly variant: rebuild both tables from massaged counts and
        // keep the variant only if body plus table gets smaller.
        let plain_lit_lens = self.lit.code_len.clone();
        let plain_dist_lens = self.dist.code_len.clone();
        let plain_bits = self.table_and_body_bits(&plain_lit_lens, &plain_dist_lens);

        let lit_freq = self.lit.freq.clone();
        let dist_freq = self.dist.freq.clone();
        optimize_frequencies_for_rle(&mut self.lit.freq);
        optimize_frequencies_for_rle(&mut self.dist.freq);
        self.lit.build_dynamic_codewords();
        self.dist.build_dynamic_codewords();
        self.lit.freq.copy_from_slice(&lit_freq);
        self.dist.freq.copy_from_slice(&dist_freq);
        let rle_lit_lens = self.lit.code_len.clone();
        let rle_dist_lens = self.dist.code_len.clone();
        let rle_bits = self.table_and_body_bits(&rle_lit_lens, &rle_dist_lens);

        if plain_bits <= rle_bits {
            self.lit.set_lengths(&plain_lit_lens);
            self.lit.build_static_codewords();
            self.dist.set_lengths(&plain_dist_lens);
            self.dist.build_static_codewords();
        }

        let hlit = self.lit.defined_count(257);
        let hdist = self.dist.defined_count(1);
        debug_assert!(hlit - 257 <= 29 && hdist - 1 <= 29);
        debug_assert!(self.dist.code_len.iter().filter(|&&l| l > 0).count() >= 2);

        let plan = plan_code_length_table(
            &mut self.precode,
            &self.lit.code_len[..hlit],
            &self.dist.code_len[..hdist],
        );

        w.put_bits(final_sub as u32, 1)?;
        w.put_bits(0b10, 2)?;
        w.put_bits((hlit - 257) as u32, 5)?;
        w.put_bits((hdist - 1) as u32, 5)?;
        w.put_bits((plan.raw_count - 4) as u32, 4)?;
        write_code_length_table(
            &self.precode,
            w,
            &self.lit.code_len[..hlit],
            &self.dist.code_len[..hdist],
            plan,
        )?;
        self.emit_body(w, window, start, end)
    }

    /// Emits the parsed steps of `[start, end)` followed by end-of-block.
    fn emit_body(
        &self,
        w: &mut BitWriter,
        window: &[u8],
        start: usize,
        end: usize,
    ) -> Result<(), StreamError> {
        let n = end - start;
        let mut i = 0usize;
        while i < n {
            let m = self.best[i];
            let len = m.length as usize;
            if len >= MIN_MATCH {
                let offset = m.offset as usize;
                let lsym = length_symbol(len);
                self.lit.write_codeword(lsym, w)?;
                let lbits = length_extra_bits(lsym);
                if lbits > 0 {
                    w.put_bits(length_extra_value(len), lbits)?;
                }
                let dsym = dist_symbol(offset);
                self.dist.write_codeword(dsym, w)?;
                let dbits = dist_extra_bits(dsym);
                if dbits > 0 {
                    w.put_bits(dist_extra_value(offset), dbits)?;
                }
                i += len;
            } else {
                self.lit.write_codeword(window[start + i] as usize, w)?;
                i += 1;
            }
        }
        if i != n {
            return Err(StreamError::Compression("block body emission"));
        }
        self.lit.write_codeword(EOB_SYM, w)
    }

    /// Stored-block fallback: byte-aligned chunks of at most
    /// [`MAX_STORED_BLOCK`] bytes, BFINAL only on the last when the
    /// sub-block itself was final.
    fn emit_stored(
        &self,
        w: &mut BitWriter,
        window: &[u8],
        start: usize,
        end: usize,
        final_sub: bool,
    ) -> Result<(), StreamError> {
        let mut off = start;
        loop {
            let n = (end - off).min(MAX_STORED_BLOCK);
            let last_chunk = off + n == end;
            w.put_bits((final_sub && last_chunk) as u32, 1)?;
            w.put_bits(0b00, 2)?;
            w.flush_bits()?;
            w.put_bits(n as u32, 16)?;
            w.put_bits(!(n as u32) & 0xFFFF, 16)?;
            w.put_bytes(&window[off..off + n])?;
            off += n;
            if last_chunk {
                return Ok(());
            }
        }
    }

    /// Static-block cost under the fixed code lengths, including the 3-bit
    /// header, for the frequencies currently loaded.
    fn static_cost(&self) -> u64 {
        let mut bits: u64 = 3;
        for (sym, &f) in self.lit.freq.iter().enumerate() {
            if f == 0 {
                continue;
            }
            let mut per = STATIC_LITLEN_LENGTHS[sym] as u64;
            if sym > EOB_SYM {
                per += length_extra_bits(sym) as u64;
            }
            bits += f as u64 * per;
        }
        for (sym, &f) in self.dist.freq.iter().enumerate() {
            bits += f as u64 * (STATIC_DIST_LENGTHS[sym] as u64 + dist_extra_bits(sym) as u64);
        }
        bits
    }

    /// Dynamic-block cost estimate for the current lengths and frequencies:
    /// 3-bit header, 14 bits of counts, the planned code-length table, and
    /// the entropy-coded body.
    fn dynamic_cost_estimate(&mut self) -> u64 {
        let hlit = self.lit.defined_count(257);
        let hdist = self.dist.defined_count(1);
        let plan = plan_code_length_table(
            &mut self.precode,
            &self.lit.code_len[..hlit],
            &self.dist.code_len[..hdist],
        );
        3 + 14 + plan.bits + self.body_bits()
    }

    fn body_bits(&self) -> u64 {
        let mut bits: u64 = 0;
        for (sym, (&f, &l)) in self.lit.freq.iter().zip(self.lit.code_len.iter()).enumerate() {
            if f == 0 {
                continue;
            }
            let mut per = l as u64;
            if sym > EOB_SYM {
                per += length_extra_bits(sym) as u64;
            }
            bits += f as u64 * per;
        }
        for (sym, (&f, &l)) in self.dist.freq.iter().zip(self.dist.code_len.iter()).enumerate() {
            bits += f as u64 * (l as u64 + dist_extra_bits(sym) as u64);
        }
        bits
    }

    /// Table-plus-body bits for a candidate pair of length assignments under
    /// the current (true) frequencies.
    fn table_and_body_bits(&mut self, lit_lens: &[u8], dist_lens: &[u8]) -> u64 {
        let mut hlit = lit_lens.len();
        while hlit > 257 && lit_lens[hlit - 1] == 0 {
            hlit -= 1;
        }
        let mut hdist = dist_lens.len();
        while hdist > 1 && dist_lens[hdist - 1] == 0 {
            hdist -= 1;
        }
        let plan =
            plan_code_length_table(&mut self.precode, &lit_lens[..hlit], &dist_lens[..hdist]);
        let mut bits = plan.bits + 14;
        for (sym, (&f, &l)) in self.lit.freq.iter().zip(lit_lens.iter()).enumerate() {
            if f == 0 {
                continue;
            }
            let mut per = l as u64;
            if sym > EOB_SYM {
                per += length_extra_bits(sym) as u64;
            }
            bits += f as u64 * per;
        }
        for (sym, (&f, &l)) in self.dist.freq.iter().zip(dist_lens.iter()).enumerate() {
            bits += f as u64 * (l as u64 + dist_extra_bits(sym) as u64);
        }
        bits
    }
}

/// Guarantees at least two distance symbols carry nonzero frequency before a
/// table build, so every emitted dynamic table defines at least two distance
/// codes.
fn ensure_two_dist_codes(dist: &mut HuffmanEncoder) {
    let mut first: Option<usize> = None;
    for (sym, &f) in dist.freq.iter().enumerate() {
        if f > 0 {
            if first.is_some() {
                return;
            }
            first = Some(sym);
        }
    }
    match first {
        Some(0) => dist.freq[1] = 1,
        Some(_) => dist.freq[0] = 1,
        None => {
            dist.freq[0] = 1;
            dist.freq[1] = 1;
        }
    }
}

/// Emits a final static block containing only the end-of-block symbol. Used
/// for empty streams and for finalization landing exactly on a block
/// boundary.
pub fn emit_empty_static_block(w: &mut BitWriter) -> Result<(), StreamError> {
    w.put_bits(1, 1)?;
    w.put_bits(0b01, 2)?;
    // End-of-block in the fixed code: seven zero bits.
    w.put_bits(0, 7)?;
    Ok(())
}
