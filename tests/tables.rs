// Unit tests for src/tables.rs: symbol assignment must follow RFC 1951
// §3.2.5 exactly, across both the direct and the shifted distance ranges.

use zdeflate::tables::{
    dist_extra_bits, dist_extra_value, dist_symbol, length_extra_bits, length_extra_value,
    length_symbol, DIST_BASE, DIST_EXTRA, LENGTH_BASE, LENGTH_EXTRA, MAX_MATCH, MAX_OFFSET,
    MIN_MATCH,
};

#[test]
fn length_symbol_boundaries() {
    assert_eq!(length_symbol(3), 257);
    assert_eq!(length_symbol(4), 258);
    assert_eq!(length_symbol(10), 264);
    assert_eq!(length_symbol(11), 265);
    assert_eq!(length_symbol(12), 265);
    assert_eq!(length_symbol(13), 266);
    assert_eq!(length_symbol(130), 280);
    assert_eq!(length_symbol(257), 284);
    assert_eq!(length_symbol(258), 285);
}

#[test]
fn length_extra_bits_and_values_cover_every_length() {
    for len in MIN_MATCH..=MAX_MATCH {
        let sym = length_symbol(len);
        assert!((257..=285).contains(&sym), "length {len} -> symbol {sym}");
        let base = LENGTH_BASE[sym - 257] as usize;
        let extra = LENGTH_EXTRA[sym - 257] as u32;
        assert_eq!(length_extra_bits(sym), extra);
        let value = length_extra_value(len);
        assert_eq!(base + value as usize, len);
        assert!(value < (1 << extra).max(1));
    }
    // Length 258 must use the dedicated extra-bit-free symbol, not 284+31.
    assert_eq!(length_extra_bits(285), 0);
}

#[test]
fn dist_symbol_boundaries() {
    assert_eq!(dist_symbol(1), 0);
    assert_eq!(dist_symbol(2), 1);
    assert_eq!(dist_symbol(3), 2);
    assert_eq!(dist_symbol(4), 3);
    assert_eq!(dist_symbol(5), 4);
    assert_eq!(dist_symbol(6), 4);
    assert_eq!(dist_symbol(7), 5);
    assert_eq!(dist_symbol(256), 15);
    assert_eq!(dist_symbol(257), 16);
    assert_eq!(dist_symbol(384), 16);
    assert_eq!(dist_symbol(385), 17);
    assert_eq!(dist_symbol(24_576), 28);
    assert_eq!(dist_symbol(24_577), 29);
    assert_eq!(dist_symbol(MAX_OFFSET), 29);
}

#[test]
fn dist_extra_bits_and_values_cover_every_offset() {
    // Exhaustive below the table switch, sampled above it.
    for off in 1..=256usize {
        let sym = dist_symbol(off);
        let base = DIST_BASE[sym] as usize;
        let extra = DIST_EXTRA[sym] as u32;
        assert_eq!(dist_extra_bits(sym), extra);
        assert_eq!(base + dist_extra_value(off) as usize, off);
    }
    for off in (257..=MAX_OFFSET).step_by(97) {
        let sym = dist_symbol(off);
        let base = DIST_BASE[sym] as usize;
        let count = 1usize << DIST_EXTRA[sym];
        assert!(off >= base && off < base + count, "offset {off} outside symbol {sym}");
        assert_eq!(base + dist_extra_value(off) as usize, off);
    }
    assert_eq!(
        dist_symbol(MAX_OFFSET),
        29,
        "largest offset must use the last symbol"
    );
}

#[test]
fn dist_symbols_are_monotonic() {
    let mut prev = 0usize;
    for off in 1..=MAX_OFFSET {
        let sym = dist_symbol(off);
        assert!(sym >= prev, "distance symbols must be non-decreasing");
        prev = sym;
    }
}
