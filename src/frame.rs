//! Envelope byte layouts: zlib (RFC 1950) and gzip (RFC 1952).
//!
//! The compressed body between header and trailer is identical for every
//! framing; only the wrapper bytes and the checksum algorithm differ. Raw
//! DEFLATE output carries no wrapper at all.

/// zlib CMF byte: CM = 8 (deflate), CINFO = 7 (32 KiB window).
const ZLIB_CMF: u8 = 0x78;

/// zlib FLEVEL field for a slow, maximally compressing encoder.
const ZLIB_FLEVEL_BEST: u8 = 3;

/// Builds the 2-byte zlib header, extended by the 4-byte big-endian
/// dictionary Adler-32 when `dict_id` is set (which also sets FDICT).
///
/// FCHECK is chosen so that `(CMF * 256 + FLG) % 31 == 0`.
pub fn zlib_header(dict_id: Option<u32>) -> Vec<u8> {
    let mut flg = (ZLIB_FLEVEL_BEST << 6) | ((dict_id.is_some() as u8) << 5);
    let rem = ((ZLIB_CMF as u16) * 256 + flg as u16) % 31;
    if rem != 0 {
        flg += (31 - rem) as u8;
    }
    let mut header = vec![ZLIB_CMF, flg];
    if let Some(id) = dict_id {
        header.extend_from_slice(&id.to_be_bytes());
    }
    header
}

/// Big-endian Adler-32 trailer.
pub fn zlib_trailer(adler: u32) -> [u8; 4] {
    adler.to_be_bytes()
}

/// Minimal 10-byte gzip header: magic, CM = 8, no flags, zero MTIME,
/// XFL = 2 (maximum compression), OS = 255 (unknown).
pub fn gzip_header() -> [u8; 10] {
    [0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 2, 0xFF]
}

/// Little-endian CRC-32 followed by little-endian ISIZE (input length modulo
/// 2^32).
pub fn gzip_trailer(crc: u32, input_len: u64) -> [u8; 8] {
    let mut t = [0u8; 8];
    t[..4].copy_from_slice(&crc.to_le_bytes());
    t[4..].copy_from_slice(&((input_len & 0xFFFF_FFFF) as u32).to_le_bytes());
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_header_checkable() {
        for dict in [None, Some(0xDEAD_BEEF)] {
            let h = zlib_header(dict);
            assert_eq!(h[0], 0x78);
            assert_eq!(((h[0] as u16) * 256 + h[1] as u16) % 31, 0);
            if dict.is_some() {
                assert_eq!(h.len(), 6);
                assert_ne!(h[1] & 0x20, 0, "FDICT must be set");
            } else {
                assert_eq!(h.len(), 2);
                assert_eq!(h[1] & 0x20, 0, "FDICT must be clear");
            }
        }
    }

    #[test]
    fn gzip_header_magic_and_fields() {
        let h = gzip_header();
        assert_eq!(&h[..3], &[0x1F, 0x8B, 8]);
        assert_eq!(h[8], 2);
        assert_eq!(h[9], 0xFF);
    }

    #[test]
    fn gzip_trailer_wraps_isize() {
        let t = gzip_trailer(0x1234_5678, (1u64 << 32) + 5);
        assert_eq!(&t[..4], &0x1234_5678u32.to_le_bytes());
        assert_eq!(&t[4..], &5u32.to_le_bytes());
    }
}
