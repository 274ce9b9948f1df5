// Unit tests for src/bitio.rs: LSB-first packing, alignment, checkpointing,
// and overflow reporting.

use zdeflate::bitio::BitWriter;

#[test]
fn bits_fill_lsb_first() {
    let mut w = BitWriter::with_capacity(16);
    // 1, then 0b01 (BTYPE static), mirroring a block header.
    w.put_bits(1, 1).unwrap();
    w.put_bits(0b01, 2).unwrap();
    w.put_bits(0, 5).unwrap();
    assert_eq!(w.as_slice(), &[0b0000_0011]);
}

#[test]
fn bytes_spill_as_they_accumulate() {
    let mut w = BitWriter::with_capacity(16);
    w.put_bits(0xABCD, 16).unwrap();
    assert_eq!(w.as_slice(), &[0xCD, 0xAB]);
    assert!(w.is_aligned());
}

#[test]
fn partial_byte_stays_buffered_until_flush() {
    let mut w = BitWriter::with_capacity(16);
    w.put_bits(0b101, 3).unwrap();
    assert_eq!(w.byte_len(), 0, "no partial byte may reach the output");
    assert_eq!(w.bit_len(), 3);
    w.flush_bits().unwrap();
    assert_eq!(w.as_slice(), &[0b0000_0101]);
    assert_eq!(w.bit_len(), 8);
}

#[test]
fn flush_on_aligned_writer_is_noop() {
    let mut w = BitWriter::with_capacity(16);
    w.put_bits(0xFF, 8).unwrap();
    w.flush_bits().unwrap();
    w.flush_bits().unwrap();
    assert_eq!(w.as_slice(), &[0xFF]);
}

#[test]
fn checkpoint_restore_rewinds_bits_and_bytes() {
    let mut w = BitWriter::with_capacity(64);
    w.put_bits(0b11, 2).unwrap();
    let cp = w.checkpoint();
    w.put_bits(0x3FFF, 14).unwrap();
    w.put_bits(0xAA, 8).unwrap();
    assert!(w.byte_len() > 0);
    w.restore(cp);
    assert_eq!(w.bit_len(), 2);
    // Continue writing after the rewind; earlier bits are preserved.
    w.put_bits(0, 6).unwrap();
    assert_eq!(w.as_slice(), &[0b0000_0011]);
}

#[test]
fn overflow_is_reported_not_wrapped() {
    let mut w = BitWriter::with_capacity(2);
    w.put_bits(0xFFFF, 16).unwrap();
    assert!(w.put_bits(0xFF, 8).is_err());
    // The failed write must not have produced a third byte.
    assert_eq!(w.byte_len(), 2);
}

#[test]
fn put_bytes_requires_capacity() {
    let mut w = BitWriter::with_capacity(4);
    w.put_bytes(&[1, 2, 3]).unwrap();
    assert!(w.put_bytes(&[4, 5]).is_err());
    assert_eq!(w.as_slice(), &[1, 2, 3]);
}

#[test]
fn take_bytes_keeps_pending_bits() {
    let mut w = BitWriter::with_capacity(16);
    w.put_bits(0x1FF, 9).unwrap();
    let drained = w.take_bytes();
    assert_eq!(drained, vec![0xFF]);
    assert_eq!(w.bit_len(), 1);
    w.flush_bits().unwrap();
    assert_eq!(w.as_slice(), &[0x01]);
}
