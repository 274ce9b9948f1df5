// End-to-end preset-dictionary behavior (zlib framing only): header shape,
// DICTID value, compression benefit, and a full decode through flate2 with
// the dictionary preset.

use flate2::{Decompress, FlushDecompress};

use zdeflate::checksum::adler32_oneshot;
use zdeflate::stream::{memory_compress, memory_compress_bound, CompressStream, Format};
use zdeflate::tables::HISTORY_SIZE;

fn compress_with_dict(data: &[u8], dict: &[u8]) -> Vec<u8> {
    let mut stream = CompressStream::new(Format::Zlib, 0).unwrap();
    stream.set_dictionary(dict).unwrap();
    let mut out = vec![0u8; memory_compress_bound(data.len(), Format::Zlib, 0) + 4];
    let mut consumed = 0;
    let mut written = 0;
    while !stream.is_finished() {
        let (c, w) = stream
            .compress(&data[consumed..], &mut out[written..], true)
            .unwrap();
        consumed += c;
        written += w;
        assert!(c > 0 || w > 0 || stream.is_finished());
    }
    out.truncate(written);
    out
}

fn compress_plain(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; memory_compress_bound(data.len(), Format::Zlib, 0)];
    let n = memory_compress(data, &mut out, Format::Zlib, 0).unwrap();
    out.truncate(n);
    out
}

/// Decodes the raw DEFLATE payload of a dictionary-bearing zlib stream with
/// the dictionary preset into a raw inflater.
fn decode_with_dict(compressed: &[u8], dict: &[u8], expected_len: usize) -> Vec<u8> {
    // 2 bytes CMF/FLG, 4 bytes DICTID, trailer is 4 bytes of Adler-32.
    let payload = &compressed[6..compressed.len() - 4];
    let mut inflater = Decompress::new(false);
    inflater.set_dictionary(dict).expect("set_dictionary");
    let mut out = vec![0u8; expected_len + 64];
    inflater
        .decompress(payload, &mut out, FlushDecompress::Finish)
        .expect("raw inflate with dictionary");
    out.truncate(inflater.total_out() as usize);
    out
}

#[test]
fn header_carries_fdict_and_dictid() {
    let dict = b"abcdefgh";
    let compressed = compress_with_dict(b"abcdefghabcdefgh", dict);
    assert_eq!(compressed[0], 0x78);
    assert_ne!(compressed[1] & 0x20, 0, "FDICT must be set");
    assert_eq!(
        ((compressed[0] as u16) * 256 + compressed[1] as u16) % 31,
        0,
        "FCHECK must hold with FDICT set"
    );
    let dictid = u32::from_be_bytes(compressed[2..6].try_into().unwrap());
    assert_eq!(dictid, adler32_oneshot(dict));
}

#[test]
fn stream_trailer_excludes_dictionary_bytes() {
    let dict = b"abcdefgh";
    let data = b"abcdefgh repeated payload abcdefgh";
    let compressed = compress_with_dict(data, dict);
    let adler = u32::from_be_bytes(
        compressed[compressed.len() - 4..].try_into().unwrap(),
    );
    assert_eq!(adler, adler32_oneshot(data));
}

#[test]
fn dictionary_roundtrip_via_reference_inflater() {
    let dict = b"abcdefgh";
    let data: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(8_000).collect();
    let compressed = compress_with_dict(&data, dict);
    let decoded = decode_with_dict(&compressed, dict, data.len());
    assert_eq!(decoded, data);
}

#[test]
fn dictionary_shrinks_the_payload() {
    // The first occurrence of the pattern can only be matched through the
    // dictionary, so the deflate payload (wrappers excluded) must shrink.
    let dict = b"abcdefgh";
    let data: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(8_000).collect();
    let with_dict = compress_with_dict(&data, dict);
    let without = compress_plain(&data);
    let payload_with = with_dict.len() - 6 - 4;
    let payload_without = without.len() - 2 - 4;
    assert!(
        payload_with <= payload_without,
        "dictionary made the payload larger: {payload_with} vs {payload_without}"
    );
}

#[test]
fn oversized_dictionary_keeps_trailing_window() {
    // Only the last HISTORY_SIZE bytes of the dictionary are usable; the
    // stream must still be decodable by an inflater holding the full
    // dictionary (which uses its own trailing window).
    let mut dict: Vec<u8> = vec![0u8; HISTORY_SIZE];
    dict.extend_from_slice(b"needle needle needle needle");
    let data: Vec<u8> = b"needle ".iter().copied().cycle().take(4_000).collect();
    let compressed = compress_with_dict(&data, &dict);
    let decoded = decode_with_dict(&compressed, &dict[dict.len() - HISTORY_SIZE..], data.len());
    assert_eq!(decoded, data);
}

#[test]
fn larger_corpus_with_dictionary_roundtrips() {
    let dict: Vec<u8> = (0..1024u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut data = dict.clone();
    data.extend((0..50_000u32).map(|i| (i * 13 % 241) as u8));
    let compressed = compress_with_dict(&data, &dict);
    let decoded = decode_with_dict(&compressed, &dict, data.len());
    assert_eq!(decoded, data);
}
