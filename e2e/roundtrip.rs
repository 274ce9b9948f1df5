// End-to-end round-trips: every framing, one-shot API, decoded back with
// two independent decoders (flate2 and zune-inflate) and byte-compared.

use std::io::Read;

use zdeflate::stream::{memory_compress, memory_compress_bound, Format};

fn compress(data: &[u8], format: Format) -> Vec<u8> {
    let mut out = vec![0u8; memory_compress_bound(data.len(), format, 0)];
    let n = memory_compress(data, &mut out, format, 0).expect("compression failed");
    out.truncate(n);
    out
}

fn flate2_decode(data: &[u8], format: Format) -> Vec<u8> {
    let mut out = Vec::new();
    match format {
        Format::Deflate => {
            flate2::read::DeflateDecoder::new(data)
                .read_to_end(&mut out)
                .expect("flate2 deflate decode");
        }
        Format::Zlib => {
            flate2::read::ZlibDecoder::new(data)
                .read_to_end(&mut out)
                .expect("flate2 zlib decode");
        }
        Format::Gzip => {
            flate2::read::GzDecoder::new(data)
                .read_to_end(&mut out)
                .expect("flate2 gzip decode");
        }
    }
    out
}

fn zune_decode(data: &[u8], format: Format) -> Vec<u8> {
    let mut decoder = zune_inflate::DeflateDecoder::new(data);
    match format {
        Format::Deflate => decoder.decode_deflate(),
        Format::Zlib => decoder.decode_zlib(),
        Format::Gzip => decoder.decode_gzip(),
    }
    .expect("zune-inflate decode")
}

fn roundtrip_all_formats(data: &[u8]) {
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        let compressed = compress(data, format);
        assert_eq!(flate2_decode(&compressed, format), data, "flate2 mismatch");
        assert_eq!(zune_decode(&compressed, format), data, "zune mismatch");
    }
}

fn lcg_bytes(len: usize, mut state: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((state >> 24) as u8);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Boundary inputs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_input_roundtrips() {
    roundtrip_all_formats(b"");
}

#[test]
fn empty_zlib_envelope_shape() {
    let compressed = compress(b"", Format::Zlib);
    // Header (2) + one empty final block + big-endian Adler-32 of "" == 1.
    assert!(compressed.len() >= 2 + 4);
    assert_eq!(&compressed[compressed.len() - 4..], &1u32.to_be_bytes());
}

#[test]
fn single_byte_roundtrips() {
    roundtrip_all_formats(b"z");
}

#[test]
fn input_below_min_match_is_all_literals() {
    roundtrip_all_formats(b"ab");
    // Two bytes cannot beat the stored-block overhead; the raw stream is a
    // single stored block (1 header byte + LEN/NLEN + 2 payload bytes).
    let compressed = compress(b"ab", Format::Deflate);
    assert!(compressed.len() <= 8, "got {} bytes", compressed.len());
}

#[test]
fn pseudorandom_input_roundtrips_and_never_fakes_matches() {
    let data = lcg_bytes(50_000, 42);
    roundtrip_all_formats(&data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Concrete scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn run_of_a_compresses_to_under_512_bytes() {
    let data = vec![b'A'; 262_144];
    let compressed = compress(&data, Format::Gzip);
    assert_eq!(flate2_decode(&compressed, Format::Gzip), data);
    assert!(
        compressed.len() < 512,
        "256 KiB of 'A' compressed to {} bytes",
        compressed.len()
    );
}

#[test]
fn encoded_size_grows_sublinearly_for_runs() {
    let small = compress(&vec![b'A'; 65_536], Format::Deflate).len();
    let large = compress(&vec![b'A'; 262_144], Format::Deflate).len();
    assert!(large < small * 4, "run encoding must grow sublinearly");
}

#[test]
fn random_65537_bytes_stays_near_input_size() {
    let data = lcg_bytes(65_537, 7);
    let compressed = compress(&data, Format::Gzip);
    assert_eq!(flate2_decode(&compressed, Format::Gzip), data);
    // Stored fallback: gzip framing (18) plus 5 bytes per stored block.
    assert!(compressed.len() > data.len());
    assert!(compressed.len() <= data.len() + 18 + 5 * (data.len() / 65_535 + 2));
}

#[test]
fn text_compresses_better_than_stored() {
    let data: Vec<u8> = b"It was the best of times, it was the worst of times. "
        .iter()
        .copied()
        .cycle()
        .take(200_000)
        .collect();
    let compressed = compress(&data, Format::Zlib);
    assert_eq!(flate2_decode(&compressed, Format::Zlib), data);
    assert!(compressed.len() < data.len() / 10);
}

#[test]
fn mixed_content_roundtrips() {
    let mut data: Vec<u8> = b"header header header ".iter().copied().cycle().take(30_000).collect();
    data.extend_from_slice(&lcg_bytes(30_000, 3));
    data.extend(std::iter::repeat(0u8).take(30_000));
    data.extend_from_slice(b"trailer trailer trailer");
    roundtrip_all_formats(&data);
}

#[test]
fn multi_block_inputs_roundtrip_at_minimum_block_size() {
    // Forces several blocks through the per-block suffix-array machinery.
    let mut data: Vec<u8> = b"0123456789abcdef".iter().copied().cycle().take(100_000).collect();
    data.extend_from_slice(&lcg_bytes(40_000, 11));
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        let mut out = vec![0u8; memory_compress_bound(data.len(), format, 32_768)];
        let n = memory_compress(&data, &mut out, format, 32_768).unwrap();
        out.truncate(n);
        assert_eq!(flate2_decode(&out, format), data);
        assert_eq!(zune_decode(&out, format), data);
    }
}

#[test]
fn output_never_exceeds_bound() {
    for (len, seed) in [(0usize, 1u32), (1, 2), (1000, 3), (65_537, 4), (200_000, 5)] {
        let data = lcg_bytes(len, seed);
        for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
            let bound = memory_compress_bound(len, format, 0);
            let mut out = vec![0u8; bound];
            let n = memory_compress(&data, &mut out, format, 0).unwrap();
            assert!(n <= bound);
        }
    }
}

#[test]
fn incompressible_input_respects_bound_at_minimum_block_size() {
    // Every 32 KiB block falls back to its own stored frame; the bound must
    // charge that per-block overhead, not just one frame per 65,535 bytes.
    let data = lcg_bytes(350_000, 21);
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        let bound = memory_compress_bound(data.len(), format, 32_768);
        let mut out = vec![0u8; bound];
        let n = memory_compress(&data, &mut out, format, 32_768).unwrap();
        assert!(n <= bound, "{n} > bound {bound}");
        assert!(n > data.len(), "noise cannot shrink");
        out.truncate(n);
        assert_eq!(flate2_decode(&out, format), data);
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let data = lcg_bytes(80_000, 99);
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        assert_eq!(compress(&data, format), compress(&data, format));
    }
}
