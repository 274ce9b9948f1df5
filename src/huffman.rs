//! Canonical Huffman code construction and code-length-table encoding.
//!
//! [`HuffmanEncoder`] carries per-symbol frequency, code length, and (bit
//! reversed) codeword state for one alphabet. Dynamic code lengths are
//! computed with the in-place Moffat-Katajainen method over the frequency
//! array, then length-limited by a Kraft-sum adjustment so no codeword
//! exceeds the configured maximum (15 for literal/length and distance codes,
//! 7 for the code-length alphabet). The resulting code is always complete:
//! the Kraft sum of the emitted lengths is exactly one.
//!
//! The second half of the module encodes a symbol-length sequence with the
//! 19-symbol code-length alphabet of RFC 1951 §3.2.7, using run symbols
//! 16 (copy previous, 3..=6), 17 (zero run, 3..=10) and 18 (zero run,
//! 11..=138). Which run symbols may be used, and whether a 7-repeat or
//! 8-repeat is rewritten as two copy runs of 4+3 / 4+4, is controlled by an
//! enablement mask; [`plan_code_length_table`] searches a small set of masks
//! and keeps the cheapest. The estimator and the emitter drive the same run
//! enumerator, so a planned cost is always the emitted cost.

use crate::bitio::BitWriter;
use crate::error::StreamError;
use crate::tables::{NUM_PRECODE_SYMS, PRECODE_PERMUTATION};

// ─────────────────────────────────────────────────────────────────────────────
// Encoder state
// ─────────────────────────────────────────────────────────────────────────────

/// Frequency, code-length, and codeword state for one Huffman alphabet.
pub struct HuffmanEncoder {
    /// Per-symbol occurrence counts for the current block.
    pub freq: Vec<u32>,
    /// Per-symbol code lengths; zero marks an unused symbol.
    pub code_len: Vec<u8>,
    /// Bit-reversed canonical codewords, ready for LSB-first emission.
    code: Vec<u16>,
    alphabet_size: usize,
    max_code_len: u8,
    default_len: u8,
    // Scratch reused by the length builder across blocks.
    order: Vec<(u32, u16)>,
    work: Vec<u64>,
}

impl HuffmanEncoder {
    /// `default_len` is the length assigned to unused symbols when the
    /// optimal parser needs every symbol to be priceable; see
    /// [`assign_default_lengths`](Self::assign_default_lengths).
    pub fn new(alphabet_size: usize, max_code_len: u8, default_len: u8) -> HuffmanEncoder {
        HuffmanEncoder {
            freq: vec![0; alphabet_size],
            code_len: vec![0; alphabet_size],
            code: vec![0; alphabet_size],
            alphabet_size,
            max_code_len,
            default_len,
            order: Vec::with_capacity(alphabet_size),
            work: Vec::with_capacity(alphabet_size),
        }
    }

    /// Clears frequencies, lengths, and codewords.
    pub fn reset(&mut self) {
        self.freq.fill(0);
        self.code_len.fill(0);
        self.code.fill(0);
    }

    /// Records one occurrence of `sym`.
    #[inline]
    pub fn add(&mut self, sym: usize) {
        self.freq[sym] += 1;
    }

    /// Replaces the code lengths wholesale (used for the fixed codes of
    /// RFC 1951 §3.2.6).
    pub fn set_lengths(&mut self, lens: &[u8]) {
        self.code_len[..lens.len()].copy_from_slice(lens);
        for l in &mut self.code_len[lens.len()..] {
            *l = 0;
        }
    }

    /// Generates canonical reversed codewords from pre-filled code lengths.
    pub fn build_static_codewords(&mut self) {
        self.make_canonical_codes();
    }

    /// Computes length-limited canonical code lengths from the current
    /// frequencies. Symbols with zero frequency get length zero; when the
    /// alphabet holds zero or one used symbols, the single symbol gets
    /// length one.
    pub fn estimate_dynamic_codelens(&mut self) {
        self.compute_lengths();
    }

    /// Computes code lengths as per
    /// [`estimate_dynamic_codelens`](Self::estimate_dynamic_codelens), then
    /// issues canonical reversed codewords.
    pub fn build_dynamic_codewords(&mut self) {
        self.compute_lengths();
        self.make_canonical_codes();
    }

    /// Emits the codeword of `sym`.
    #[inline]
    pub fn write_codeword(&self, sym: usize, w: &mut BitWriter) -> Result<(), StreamError> {
        let len = self.code_len[sym];
        debug_assert!(len > 0, "writing symbol without a code");
        w.put_bits(self.code[sym] as u32, len as u32)?;
        Ok(())
    }

    /// Bit-reversed codeword of `sym` (test hook).
    #[inline]
    pub fn codeword(&self, sym: usize) -> (u16, u8) {
        (self.code[sym], self.code_len[sym])
    }

    /// Number of leading symbols that must be transmitted once trailing
    /// zero-length symbols are trimmed, but never fewer than `min`.
    pub fn defined_count(&self, min: usize) -> usize {
        let mut n = self.alphabet_size;
        while n > min && self.code_len[n - 1] == 0 {
            n -= 1;
        }
        n
    }

    /// Gives every unused symbol the configured default length so the
    /// optimal parser may still consider it. The next
    /// [`build_dynamic_codewords`](Self::build_dynamic_codewords) re-prunes
    /// symbols that stayed unused.
    pub fn assign_default_lengths(&mut self) {
        for (f, l) in self.freq.iter().zip(self.code_len.iter_mut()) {
            if *f == 0 {
                *l = self.default_len;
            }
        }
    }

    // ── Length computation ───────────────────────────────────────────────────

    fn compute_lengths(&mut self) {
        self.code_len.fill(0);
        self.order.clear();
        for (sym, &f) in self.freq.iter().enumerate() {
            if f > 0 {
                self.order.push((f, sym as u16));
            }
        }
        let m = self.order.len();
        if m == 0 {
            return;
        }
        if m == 1 {
            self.code_len[self.order[0].1 as usize] = 1;
            return;
        }
        self.order.sort_unstable();

        self.work.clear();
        self.work.extend(self.order.iter().map(|&(f, _)| f as u64));
        minimum_redundancy(&mut self.work);

        // Clamp to the maximum and repair the Kraft sum: lengthening the
        // shortest symbols drains an overfull code, shortening the longest
        // symbols tops an underfull one up to exactly 2^max.
        let maxl = self.max_code_len as usize;
        let mut hist = vec![0u32; maxl + 1];
        for d in &self.work {
            let l = (*d as usize).min(maxl).max(1);
            hist[l] += 1;
        }
        let cap: u64 = 1 << maxl;
        let mut k: u64 = 0;
        for (l, &n) in hist.iter().enumerate().skip(1) {
            k += (n as u64) << (maxl - l);
        }
        while k > cap {
            let s = (1..maxl).find(|&l| hist[l] > 0).expect("overfull code with no short symbol");
            hist[s] -= 1;
            hist[s + 1] += 1;
            k -= 1 << (maxl - s - 1);
        }
        while k < cap {
            let l = (2..=maxl)
                .rev()
                .find(|&l| hist[l] > 0)
                .expect("underfull code with no long symbol");
            hist[l] -= 1;
            hist[l - 1] += 1;
            k += 1 << (maxl - l);
        }

        // Hand the final lengths back out, longest codes to the least
        // frequent symbols; `order` is sorted ascending by frequency.
        let mut idx = 0usize;
        for l in (1..=maxl).rev() {
            for _ in 0..hist[l] {
                self.code_len[self.order[idx].1 as usize] = l as u8;
                idx += 1;
            }
        }
        debug_assert_eq!(idx, m);
    }

    fn make_canonical_codes(&mut self) {
        let mut len_count = [0u32; 16];
        for &l in &self.code_len {
            if l > 0 {
                len_count[l as usize] += 1;
            }
        }
        let mut next_code = [0u16; 16];
        let mut code = 0u32;
        for bits in 1..16 {
            code = (code + len_count[bits - 1]) << 1;
            next_code[bits] = code as u16;
        }
        for sym in 0..self.alphabet_size {
            let l = self.code_len[sym] as usize;
            if l > 0 {
                let c = next_code[l];
                next_code[l] = c + 1;
                self.code[sym] = c.reverse_bits() >> (16 - l);
            }
        }
    }
}

/// In-place minimum-redundancy code length computation (Moffat-Katajainen).
///
/// `a` must hold at least two weights sorted ascending; on return `a[i]` is
/// the code length of the i-th smallest weight.
fn minimum_redundancy(a: &mut [u64]) {
    let n = a.len();
    debug_assert!(n >= 2);

    // Phase 1: left to right, building tree weights and parent indices.
    a[0] += a[1];
    let mut root = 0usize;
    let mut leaf = 2usize;
    for next in 1..n - 1 {
        if leaf >= n || a[root] < a[leaf] {
            a[next] = a[root];
            a[root] = next as u64;
            root += 1;
        } else {
            a[next] = a[leaf];
            leaf += 1;
        }
        if leaf >= n || (root < next && a[root] < a[leaf]) {
            a[next] += a[root];
            a[root] = next as u64;
            root += 1;
        } else {
            a[next] += a[leaf];
            leaf += 1;
        }
    }

    // Phase 2: right to left, converting parent indices to internal depths.
    a[n - 2] = 0;
    for next in (0..n.saturating_sub(2)).rev() {
        a[next] = a[a[next] as usize] + 1;
    }

    // Phase 3: right to left, expanding internal depths into leaf depths.
    let mut avail: i64 = 1;
    let mut used: i64 = 0;
    let mut depth: u64 = 0;
    let mut root_i: isize = n as isize - 2;
    let mut next_i: isize = n as isize - 1;
    while avail > 0 {
        while root_i >= 0 && a[root_i as usize] == depth {
            used += 1;
            root_i -= 1;
        }
        while avail > used {
            a[next_i as usize] = depth;
            next_i -= 1;
            avail -= 1;
        }
        avail = 2 * used;
        depth += 1;
        used = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Code-length-table encoding (RFC 1951 §3.2.7)
// ─────────────────────────────────────────────────────────────────────────────

/// Run-symbol enablement masks tried by [`plan_code_length_table`].
///
/// Bit 0 enables symbol 16, bit 1 symbol 17, bit 2 symbol 18. Bit 3 set
/// disables the 7-repeat = 4+3 rewrite, bit 4 set disables the 8-repeat =
/// 4+4 rewrite; both rewrites only matter when symbol 16 is enabled, so the
/// upper masks are only paired with bit 0 set.
pub const RLE_MASKS: [u32; 20] = [
    0, 1, 2, 3, 4, 5, 6, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31,
];

/// Enumerates the code-length-alphabet operations encoding `seq` under
/// `mask`, invoking `sink(symbol, extra_bit_count, extra_value)` per
/// operation. The estimator and emitter both run through here, so they can
/// never disagree on the run decomposition.
fn enumerate_rle(seq: &[u8], mask: u32, sink: &mut dyn FnMut(u8, u32, u32)) {
    let use16 = mask & 1 != 0;
    let use17 = mask & 2 != 0;
    let use18 = mask & 4 != 0;
    let split7 = mask & 8 == 0;
    let split8 = mask & 16 == 0;

    let mut i = 0usize;
    while i < seq.len() {
        let l = seq[i];
        if l == 0 {
            let mut run = 1usize;
            while i + run < seq.len() && seq[i + run] == 0 {
                run += 1;
            }
            i += run;
            while run > 0 {
                if use18 && run >= 11 {
                    let n = run.min(138);
                    sink(18, 7, (n - 11) as u32);
                    run -= n;
                } else if use17 && run >= 3 {
                    let n = run.min(10);
                    sink(17, 3, (n - 3) as u32);
                    run -= n;
                } else {
                    sink(0, 0, 0);
                    run -= 1;
                }
            }
        } else {
            sink(l, 0, 0);
            let mut run = 0usize;
            while i + 1 + run < seq.len() && seq[i + 1 + run] == l {
                run += 1;
            }
            i += 1 + run;
            if use16 {
                while run >= 3 {
                    if run == 7 && split7 {
                        sink(16, 2, 1);
                        sink(16, 2, 0);
                        run = 0;
                    } else if run == 8 && split8 {
                        sink(16, 2, 1);
                        sink(16, 2, 1);
                        run = 0;
                    } else {
                        let n = run.min(6);
                        sink(16, 2, (n - 3) as u32);
                        run -= n;
                    }
                }
            }
            while run > 0 {
                sink(l, 0, 0);
                run -= 1;
            }
        }
    }
}

/// Number of code-length-alphabet entries that must be transmitted in the
/// DEFLATE permutation order, trimming trailing zero lengths but never below
/// four (HCLEN + 4).
pub fn raw_precode_count(lens: &[u8]) -> usize {
    debug_assert!(lens.len() >= NUM_PRECODE_SYMS);
    let mut n = NUM_PRECODE_SYMS;
    while n > 4 && lens[PRECODE_PERMUTATION[n - 1] as usize] == 0 {
        n -= 1;
    }
    n
}

/// Result of the enablement-mask search: the winning mask and the cost in
/// bits of the whole table (three-bit length list plus both encoded
/// sequences), excluding the fixed 14-bit HLIT/HDIST/HCLEN fields.
#[derive(Debug, Clone, Copy)]
pub struct TablePlan {
    pub mask: u32,
    pub bits: u64,
    pub raw_count: usize,
}

/// Searches [`RLE_MASKS`] for the cheapest encoding of the two symbol-length
/// sequences and leaves `precode` holding the frequencies, lengths, and
/// codewords of the winning mask.
pub fn plan_code_length_table(
    precode: &mut HuffmanEncoder,
    lit_lens: &[u8],
    dist_lens: &[u8],
) -> TablePlan {
    let mut best = TablePlan {
        mask: 0,
        bits: u64::MAX,
        raw_count: NUM_PRECODE_SYMS,
    };
    for &mask in &RLE_MASKS {
        precode.reset();
        let mut extra: u64 = 0;
        {
            let freq = &mut precode.freq;
            let mut count = |sym: u8, nbits: u32, _val: u32| {
                freq[sym as usize] += 1;
                extra += nbits as u64;
            };
            enumerate_rle(lit_lens, mask, &mut count);
            enumerate_rle(dist_lens, mask, &mut count);
        }
        precode.estimate_dynamic_codelens();
        let raw_count = raw_precode_count(&precode.code_len);
        let mut bits = 3 * raw_count as u64 + extra;
        for (f, l) in precode.freq.iter().zip(precode.code_len.iter()) {
            bits += *f as u64 * *l as u64;
        }
        if bits < best.bits {
            best = TablePlan {
                mask,
                bits,
                raw_count,
            };
        }
    }

    // Rebuild the precode for the winning mask so the caller can emit with it.
    precode.reset();
    {
        let freq = &mut precode.freq;
        let mut count = |sym: u8, _nbits: u32, _val: u32| {
            freq[sym as usize] += 1;
        };
        enumerate_rle(lit_lens, best.mask, &mut count);
        enumerate_rle(dist_lens, best.mask, &mut count);
    }
    precode.build_dynamic_codewords();
    debug_assert_eq!(raw_precode_count(&precode.code_len), best.raw_count);
    best
}

/// Writes the code-length table planned by [`plan_code_length_table`]: the
/// HCLEN+4 three-bit lengths in permutation order, then both symbol-length
/// sequences under the winning mask.
pub fn write_code_length_table(
    precode: &HuffmanEncoder,
    w: &mut BitWriter,
    lit_lens: &[u8],
    dist_lens: &[u8],
    plan: TablePlan,
) -> Result<(), StreamError> {
    for &p in PRECODE_PERMUTATION.iter().take(plan.raw_count) {
        w.put_bits(precode.code_len[p as usize] as u32, 3)?;
    }
    let mut err: Option<StreamError> = None;
    {
        let mut emit = |sym: u8, nbits: u32, val: u32| {
            if err.is_some() {
                return;
            }
            if let Err(e) = precode.write_codeword(sym as usize, w) {
                err = Some(e);
                return;
            }
            if nbits > 0 {
                if let Err(e) = w.put_bits(val, nbits) {
                    err = Some(e.into());
                }
            }
        };
        enumerate_rle(lit_lens, plan.mask, &mut emit);
        enumerate_rle(dist_lens, plan.mask, &mut emit);
    }
    match err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RLE-friendly frequency massage
// ─────────────────────────────────────────────────────────────────────────────

/// Smooths population counts so the resulting code-length sequence compresses
/// better under the run symbols, at a small cost in body entropy. Callers
/// build lengths from both the original and the massaged counts and keep
/// whichever total (body plus table) is smaller.
///
/// Zero counts stay zero runs where they already favor symbols 17/18; strides
/// of four or more similar counts collapse to their rounded mean, clamped to
/// at least one so no used symbol loses its code.
pub fn optimize_frequencies_for_rle(counts: &mut [u32]) {
    // Trim trailing zeros from consideration.
    let mut n = counts.len();
    while n > 0 && counts[n - 1] == 0 {
        n -= 1;
    }
    if n == 0 {
        return;
    }
    let counts = &mut counts[..n];

    // Mark spans already good for RLE verbatim: long zero runs and long runs
    // of one repeated nonzero count.
    let mut good = vec![false; n];
    let mut i = 0usize;
    while i < n {
        let v = counts[i];
        let mut run = 1usize;
        while i + run < n && counts[i + run] == v {
            run += 1;
        }
        if (v == 0 && run >= 11) || (v != 0 && run >= 7) {
            good[i..i + run].fill(true);
        }
        i += run;
    }

    let mut stride = 0usize;
    let mut scratch = counts[0] as u64;
    let mut sum: u64 = 0;
    for i in 0..=n {
        let boundary = i == n
            || good[i]
            || (counts[i] as u64).abs_diff(scratch) >= 4;
        if boundary {
            if sum > 0 && stride >= 4 {
                let v = (((sum + stride as u64 / 2) / stride as u64) as u32).max(1);
                counts[i - stride..i].fill(v);
            }
            stride = 0;
            sum = 0;
            if i + 3 < n {
                // Weighted average of the next few counts seeds the new run.
                scratch = (counts[i] as u64
                    + counts[i + 1] as u64
                    + counts[i + 2] as u64
                    + counts[i + 3] as u64
                    + 2)
                    / 4;
            } else if i < n {
                scratch = counts[i] as u64;
            }
        }
        if i < n {
            stride += 1;
            sum += counts[i] as u64;
        }
    }
}
