//! Built-in self-test: compresses a deterministic corpus across every
//! framing, one-shot and chunked, decodes each stream with the reference
//! decoder, and byte-compares. No files are touched.

use anyhow::{bail, Result};

use crate::displaylevel;
use crate::file::reference_decode;
use crate::stream::{memory_compress, memory_compress_bound, CompressStream, Format};

/// Deterministic pseudo-random bytes from a small multiplicative generator;
/// the self-test must produce identical streams on every run.
fn lcg_bytes(len: usize, mut state: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((state >> 24) as u8);
    }
    out
}

fn cyclic_text(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// (name, payload) pairs; `quick` restricts the sizes.
fn corpus(quick: bool) -> Vec<(&'static str, Vec<u8>)> {
    let mut cases: Vec<(&'static str, Vec<u8>)> = vec![
        ("empty", Vec::new()),
        ("one byte", vec![0x42]),
        ("below min match", b"ab".to_vec()),
        ("tiny text", b"hello hello hello".to_vec()),
        ("single run", vec![b'A'; 4096]),
        ("cyclic text", cyclic_text(20_000)),
        ("random", lcg_bytes(10_000, 1)),
    ];
    if !quick {
        cases.push(("long run", vec![b'A'; 262_144]));
        cases.push(("long cyclic", cyclic_text(300_000)));
        cases.push(("long random", lcg_bytes(65_537, 7)));
        let mut mixed = cyclic_text(100_000);
        mixed.extend_from_slice(&lcg_bytes(100_000, 3));
        mixed.extend_from_slice(&vec![0u8; 50_000]);
        cases.push(("mixed", mixed));
    }
    cases
}

const FORMATS: [Format; 3] = [Format::Deflate, Format::Zlib, Format::Gzip];

fn format_name(f: Format) -> &'static str {
    match f {
        Format::Deflate => "deflate",
        Format::Zlib => "zlib",
        Format::Gzip => "gzip",
    }
}

fn one_shot(data: &[u8], format: Format, block_size: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; memory_compress_bound(data.len(), format, block_size)];
    let n = memory_compress(data, &mut out, format, block_size)?;
    out.truncate(n);
    Ok(out)
}

/// Chunked streaming compression with deliberately awkward chunk sizes; the
/// result must be byte-identical to the one-shot path.
fn chunked(data: &[u8], format: Format, block_size: usize) -> Result<Vec<u8>> {
    let mut stream = CompressStream::new(format, block_size)?;
    let mut out = Vec::new();
    let mut buf = [0u8; 997];
    let mut pos = 0usize;
    let mut chunk = 1usize;
    loop {
        let end = (pos + chunk).min(data.len());
        let finalize = end == data.len();
        let mut sub = &data[pos..end];
        loop {
            let (c, w) = stream.compress(sub, &mut buf, finalize)?;
            sub = &sub[c..];
            out.extend_from_slice(&buf[..w]);
            if sub.is_empty() && (!finalize || stream.is_finished()) {
                break;
            }
            if c == 0 && w == 0 && stream.is_finished() {
                break;
            }
        }
        pos = end;
        if finalize && stream.is_finished() {
            return Ok(out);
        }
        chunk = chunk % 37 + 13;
    }
}

fn check_case(name: &str, data: &[u8], format: Format, block_size: usize) -> Result<()> {
    let bound = memory_compress_bound(data.len(), format, block_size);
    let compressed = one_shot(data, format, block_size)?;
    if compressed.len() > bound {
        bail!(
            "{name}/{}: output {} exceeds bound {bound}",
            format_name(format),
            compressed.len()
        );
    }

    let decoded = reference_decode(&compressed, format)?;
    if decoded != data {
        bail!("{name}/{}: round-trip mismatch", format_name(format));
    }

    let streamed = chunked(data, format, block_size)?;
    if streamed != compressed {
        bail!(
            "{name}/{}: streaming output differs from one-shot",
            format_name(format)
        );
    }

    // Same input, same parameters: byte-identical output.
    let again = one_shot(data, format, block_size)?;
    if again != compressed {
        bail!("{name}/{}: output is not deterministic", format_name(format));
    }

    displaylevel!(
        3,
        "  {name}/{}: {} -> {} bytes\n",
        format_name(format),
        data.len(),
        compressed.len()
    );
    Ok(())
}

/// Runs the self-test corpus. `quick` restricts it to the small cases.
pub fn run_self_test(quick: bool) -> Result<()> {
    let cases = corpus(quick);
    let block_sizes: &[usize] = if quick { &[0] } else { &[0, 32_768] };
    let mut ran = 0usize;
    for (name, data) in &cases {
        for &format in &FORMATS {
            for &bs in block_sizes {
                check_case(name, data, format, bs)?;
                ran += 1;
            }
        }
    }
    displaylevel!(2, "self-test passed ({ran} cases)\n");
    Ok(())
}
