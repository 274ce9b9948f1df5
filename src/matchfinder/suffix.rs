//! Linear-time suffix array construction by induced sorting, plus the
//! permuted-LCP computation used to derive the LCP array.
//!
//! The builder appends a virtual sentinel (smaller than every real symbol)
//! so the classic two-stage induced-sorting recurrence applies unchanged:
//! classify suffixes as L or S, seed the buckets with the leftmost-S
//! positions, induce L then S, name the LMS substrings, recurse on the
//! reduced string when names collide, and induce once more from the sorted
//! LMS order. Recursion operates on `u32` symbols throughout; window sizes
//! are bounded well below `u32` range by the stream layer.

const EMPTY: u32 = u32::MAX;

/// Builds the suffix array of `text` into `sa` (cleared and refilled).
pub fn build_suffix_array(text: &[u8], sa: &mut Vec<u32>) {
    sa.clear();
    let n = text.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        sa.push(0);
        return;
    }
    // Shift the alphabet up by one and append the unique smallest sentinel.
    let mut s: Vec<u32> = Vec::with_capacity(n + 1);
    s.extend(text.iter().map(|&b| b as u32 + 1));
    s.push(0);
    let mut sa1 = vec![EMPTY; n + 1];
    sais(&s, 257, &mut sa1);
    // Drop the sentinel suffix, which always sorts first.
    debug_assert_eq!(sa1[0] as usize, n);
    sa.extend_from_slice(&sa1[1..]);
}

/// Suffix array of `s` over alphabet `0..k`. `s` must end with a unique
/// smallest sentinel (value 0 occurring exactly once, at the end).
fn sais(s: &[u32], k: usize, sa: &mut [u32]) {
    let n = s.len();
    debug_assert_eq!(sa.len(), n);
    if n == 1 {
        sa[0] = 0;
        return;
    }
    if n == 2 {
        sa[0] = 1;
        sa[1] = 0;
        return;
    }

    // Suffix types: S when strictly smaller than the successor suffix.
    let mut stype = vec![false; n];
    stype[n - 1] = true;
    for i in (0..n - 1).rev() {
        stype[i] = s[i] < s[i + 1] || (s[i] == s[i + 1] && stype[i + 1]);
    }

    let mut bkt = vec![0u32; k];
    for &c in s {
        bkt[c as usize] += 1;
    }

    // Stage 1: seed every LMS position at its bucket tail (order within a
    // bucket is irrelevant here), then induce. The induced order sorts the
    // LMS substrings.
    sa.fill(EMPTY);
    {
        let mut tails = bucket_tails(&bkt);
        for i in 1..n {
            if stype[i] && !stype[i - 1] {
                let c = s[i] as usize;
                tails[c] -= 1;
                sa[tails[c] as usize] = i as u32;
            }
        }
    }
    induce(s, sa, &bkt, &stype);

    // Collect LMS positions in induced (substring-sorted) order and name the
    // substrings; equal neighbors share a name.
    let mut lms_sorted: Vec<u32> = Vec::new();
    for &p in sa.iter() {
        let p = p as usize;
        if p > 0 && stype[p] && !stype[p - 1] {
            lms_sorted.push(p as u32);
        }
    }
    let m = lms_sorted.len();
    let mut names = vec![EMPTY; n];
    let mut name = 0u32;
    let mut prev = EMPTY;
    for &p in &lms_sorted {
        if prev != EMPTY && !lms_substrings_equal(s, &stype, prev as usize, p as usize) {
            name += 1;
        }
        names[p as usize] = name;
        prev = p;
    }
    let num_names = name as usize + 1;

    // Reduced string: LMS names in text order. Its last symbol is the
    // sentinel's name (0), unique and smallest, so the recursion invariant
    // holds.
    let mut lms_pos: Vec<u32> = Vec::with_capacity(m);
    let mut s1: Vec<u32> = Vec::with_capacity(m);
    for i in 1..n {
        if stype[i] && !stype[i - 1] {
            lms_pos.push(i as u32);
            s1.push(names[i]);
        }
    }

    let mut sa1 = vec![EMPTY; m];
    if num_names < m {
        sais(&s1, num_names, &mut sa1);
    } else {
        for (i, &nm) in s1.iter().enumerate() {
            sa1[nm as usize] = i as u32;
        }
    }

    // Stage 2: seed the now fully sorted LMS suffixes right to left at the
    // bucket tails and induce the final order.
    sa.fill(EMPTY);
    {
        let mut tails = bucket_tails(&bkt);
        for &r in sa1.iter().rev() {
            let p = lms_pos[r as usize];
            let c = s[p as usize] as usize;
            tails[c] -= 1;
            sa[tails[c] as usize] = p;
        }
    }
    induce(s, sa, &bkt, &stype);
}

fn bucket_heads(bkt: &[u32]) -> Vec<u32> {
    let mut heads = Vec::with_capacity(bkt.len());
    let mut sum = 0u32;
    for &c in bkt {
        heads.push(sum);
        sum += c;
    }
    heads
}

fn bucket_tails(bkt: &[u32]) -> Vec<u32> {
    let mut tails = Vec::with_capacity(bkt.len());
    let mut sum = 0u32;
    for &c in bkt {
        sum += c;
        tails.push(sum);
    }
    tails
}

/// Induces L suffixes left to right from the seeded entries, then S suffixes
/// right to left.
fn induce(s: &[u32], sa: &mut [u32], bkt: &[u32], stype: &[bool]) {
    let n = s.len();
    {
        let mut heads = bucket_heads(bkt);
        for j in 0..n {
            let p = sa[j];
            if p == EMPTY || p == 0 {
                continue;
            }
            let i = (p - 1) as usize;
            if !stype[i] {
                let c = s[i] as usize;
                sa[heads[c] as usize] = i as u32;
                heads[c] += 1;
            }
        }
    }
    {
        let mut tails = bucket_tails(bkt);
        for j in (0..n).rev() {
            let p = sa[j];
            if p == EMPTY || p == 0 {
                continue;
            }
            let i = (p - 1) as usize;
            if stype[i] {
                let c = s[i] as usize;
                tails[c] -= 1;
                sa[tails[c] as usize] = i as u32;
            }
        }
    }
}

/// Compares the LMS substrings starting at `a` and `b`: equal when their
/// characters match position for position up to and including the next LMS
/// boundary on both sides.
fn lms_substrings_equal(s: &[u32], stype: &[bool], a: usize, b: usize) -> bool {
    let n = s.len();
    if a == b {
        return true;
    }
    let mut i = 0usize;
    loop {
        let ai = a + i;
        let bi = b + i;
        if ai >= n || bi >= n {
            return false;
        }
        if s[ai] != s[bi] {
            return false;
        }
        if i > 0 {
            let a_lms = stype[ai] && !stype[ai - 1];
            let b_lms = stype[bi] && !stype[bi - 1];
            if a_lms != b_lms {
                return false;
            }
            if a_lms {
                return true;
            }
        }
        i += 1;
    }
}

/// Computes the permuted LCP array into `plcp` using the previous-suffix
/// links in `phi` (both are cleared and refilled to `text.len()` entries).
///
/// Comparisons stop at `scan_cap`, so a stored value of `scan_cap` means
/// "at least this long"; callers clamp to the same cap anyway.
pub fn build_plcp(text: &[u8], sa: &[u32], phi: &mut Vec<u32>, plcp: &mut Vec<u32>, scan_cap: usize) {
    let n = text.len();
    phi.clear();
    phi.resize(n, EMPTY);
    plcp.clear();
    plcp.resize(n, 0);
    if n == 0 {
        return;
    }
    for r in 1..n {
        phi[sa[r] as usize] = sa[r - 1];
    }
    let mut l = 0usize;
    for i in 0..n {
        if phi[i] == EMPTY {
            plcp[i] = 0;
            l = 0;
            continue;
        }
        let j = phi[i] as usize;
        let lim = scan_cap.min(n - i.max(j));
        while l < lim && text[i + l] == text[j + l] {
            l += 1;
        }
        plcp[i] = l as u32;
        l = l.saturating_sub(1);
    }
}
