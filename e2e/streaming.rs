// End-to-end streaming behavior: chunked feeding must match one-shot output
// byte for byte, and the stream must make progress under arbitrarily small
// input and output buffers.

use std::io::Read;

use zdeflate::stream::{memory_compress, memory_compress_bound, CompressStream, Format};

fn one_shot(data: &[u8], format: Format, block_size: usize) -> Vec<u8> {
    let mut out = vec![0u8; memory_compress_bound(data.len(), format, block_size)];
    let n = memory_compress(data, &mut out, format, block_size).unwrap();
    out.truncate(n);
    out
}

/// Streams `data` through `stream` in the given input chunk sizes, draining
/// into an output buffer of `out_chunk` bytes per call.
fn stream_in_chunks(
    data: &[u8],
    format: Format,
    block_size: usize,
    chunk_sizes: &[usize],
    out_chunk: usize,
) -> Vec<u8> {
    let mut stream = CompressStream::new(format, block_size).unwrap();
    let mut out = Vec::new();
    let mut buf = vec![0u8; out_chunk];
    let mut pos = 0usize;
    let mut chunk_idx = 0usize;
    loop {
        let chunk = chunk_sizes[chunk_idx % chunk_sizes.len()];
        chunk_idx += 1;
        let end = (pos + chunk).min(data.len());
        let finalize = end == data.len();
        let mut sub = &data[pos..end];
        loop {
            let (c, w) = stream.compress(sub, &mut buf, finalize).unwrap();
            sub = &sub[c..];
            out.extend_from_slice(&buf[..w]);
            if sub.is_empty() && (!finalize || stream.is_finished()) {
                break;
            }
            assert!(
                c > 0 || w > 0 || stream.is_finished(),
                "stream stalled with input pending"
            );
        }
        pos = end;
        if finalize && stream.is_finished() {
            return out;
        }
    }
}

#[test]
fn thirty_seven_chunks_match_one_shot() {
    // 10,000 bytes in 37 chunks of awkward sizes.
    let data: Vec<u8> = b"streaming equivalence "
        .iter()
        .copied()
        .cycle()
        .take(10_000)
        .collect();
    let chunk = data.len() / 37 + 1;
    let streamed = stream_in_chunks(&data, Format::Zlib, 0, &[chunk], 4096);
    assert_eq!(streamed, one_shot(&data, Format::Zlib, 0));
}

#[test]
fn irregular_chunk_sizes_match_one_shot() {
    let data: Vec<u8> = (0..60_000u32).map(|i| (i * 31 % 251) as u8).collect();
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        let streamed = stream_in_chunks(&data, format, 0, &[1, 7, 509, 4096, 13], 1024);
        assert_eq!(streamed, one_shot(&data, format, 0), "format {format:?}");
    }
}

#[test]
fn one_byte_output_buffer_still_completes() {
    let data: Vec<u8> = b"tiny out ".iter().copied().cycle().take(5_000).collect();
    let streamed = stream_in_chunks(&data, Format::Gzip, 0, &[997], 1);
    assert_eq!(streamed, one_shot(&data, Format::Gzip, 0));
}

#[test]
fn multi_block_streaming_matches_one_shot() {
    // More input than one minimum-size block; history must carry across
    // block boundaries identically in both paths.
    let data: Vec<u8> = b"carry the window forward "
        .iter()
        .copied()
        .cycle()
        .take(150_000)
        .collect();
    let streamed = stream_in_chunks(&data, Format::Zlib, 32_768, &[10_000], 8192);
    assert_eq!(streamed, one_shot(&data, Format::Zlib, 32_768));
}

#[test]
fn streamed_output_decodes() {
    let data: Vec<u8> = (0..90_000u32).map(|i| (i % 7 + i % 13) as u8).collect();
    let streamed = stream_in_chunks(&data, Format::Gzip, 32_768, &[1234], 777);
    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(&streamed[..])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn matches_can_reach_across_block_boundaries() {
    // The second block repeats the first block's content; history reuse
    // should make it much smaller than the first.
    let unit: Vec<u8> = (0..32_768u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
        .collect();
    let mut data = unit.clone();
    data.extend_from_slice(&unit[..16_384]);
    let compressed = one_shot(&data, Format::Deflate, 32_768);
    let baseline = one_shot(&unit, Format::Deflate, 32_768);
    assert!(
        compressed.len() < baseline.len() + 2_048,
        "repeated tail should mostly match into history: {} vs {}",
        compressed.len(),
        baseline.len()
    );
    let mut decoded = Vec::new();
    flate2::read::DeflateDecoder::new(&compressed[..])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, data);
}
