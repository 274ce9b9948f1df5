//! Single-file operations built on the streaming API: compress a file,
//! optionally verify the result by decoding it back, and load preset
//! dictionaries.
//!
//! Errors carry the failing phase and file so the binary can print a terse
//! one-line diagnostic before exiting.

use std::fs::File;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};

use crate::displaylevel;
use crate::stream::{CompressStream, Format};
use crate::tables::HISTORY_SIZE;

/// Read granularity for the streaming file loop.
const IO_CHUNK: usize = 256 * 1024;

/// Byte counts and wall time of one compression run.
#[derive(Debug, Clone, Copy)]
pub struct CompressStats {
    pub in_bytes: u64,
    pub out_bytes: u64,
    pub elapsed: Duration,
}

/// Default output filename for `input` under `format`.
pub fn default_output_name(input: &str, format: Format) -> String {
    let ext = match format {
        Format::Deflate => ".zd",
        Format::Zlib => ".zz",
        Format::Gzip => ".gz",
    };
    format!("{input}{ext}")
}

/// Loads a preset dictionary file. Oversized dictionaries are meaningful
/// only in their trailing [`HISTORY_SIZE`] bytes, but the full content is
/// returned so the stream layer can checksum what the decompressor will be
/// handed.
pub fn load_dictionary(path: &str) -> Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("dictionary load: {path}"))?;
    if data.len() > HISTORY_SIZE {
        displaylevel!(
            3,
            "dictionary {path} is {} bytes; only the last {HISTORY_SIZE} are usable\n",
            data.len()
        );
    }
    Ok(data)
}

/// Compresses `input` into `output` through the streaming API with bounded
/// buffers.
pub fn compress_file(
    input: &str,
    output: &str,
    format: Format,
    block_size: usize,
    dictionary: Option<&[u8]>,
) -> Result<CompressStats> {
    let start = Instant::now();
    let mut src = File::open(input).with_context(|| format!("compress open: {input}"))?;
    let mut dst = File::create(output).with_context(|| format!("compress create: {output}"))?;

    let mut stream =
        CompressStream::new(format, block_size).with_context(|| format!("compress init: {input}"))?;
    if let Some(dict) = dictionary {
        stream
            .set_dictionary(dict)
            .with_context(|| format!("compress dictionary: {input}"))?;
    }

    let mut in_buf = vec![0u8; IO_CHUNK];
    let mut out_buf = vec![0u8; IO_CHUNK];
    let mut pending: usize = 0; // valid bytes in in_buf
    let mut pos: usize = 0;
    let mut eof = false;

    loop {
        if pos == pending && !eof {
            pending = src
                .read(&mut in_buf)
                .with_context(|| format!("compress read: {input}"))?;
            pos = 0;
            eof = pending == 0;
        }
        let (consumed, written) = stream
            .compress(&in_buf[pos..pending], &mut out_buf, eof)
            .with_context(|| format!("compress: {input}"))?;
        pos += consumed;
        if written > 0 {
            dst.write_all(&out_buf[..written])
                .with_context(|| format!("compress write: {output}"))?;
        }
        if stream.is_finished() {
            break;
        }
        if eof && consumed == 0 && written == 0 {
            bail!("compress stalled: {input}");
        }
    }
    dst.flush().with_context(|| format!("compress flush: {output}"))?;

    Ok(CompressStats {
        in_bytes: stream.total_in(),
        out_bytes: stream.total_out(),
        elapsed: start.elapsed(),
    })
}

/// Decodes a stream produced with `format` using the reference decoder.
/// Preset-dictionary zlib streams are not decodable here.
pub fn reference_decode(data: &[u8], format: Format) -> Result<Vec<u8>> {
    let mut decoder = zune_inflate::DeflateDecoder::new(data);
    let decoded = match format {
        Format::Deflate => decoder.decode_deflate(),
        Format::Zlib => decoder.decode_zlib(),
        Format::Gzip => decoder.decode_gzip(),
    };
    decoded.map_err(|e| anyhow!("reference decode failed: {e:?}"))
}

/// Compresses and then verifies: the output is decoded with the reference
/// decoder and byte-compared against the input file.
pub fn compress_and_verify_file(
    input: &str,
    output: &str,
    format: Format,
    block_size: usize,
    dictionary: Option<&[u8]>,
) -> Result<CompressStats> {
    if dictionary.is_some() {
        bail!("verify: preset-dictionary streams are not supported by the reference decoder");
    }
    let stats = compress_file(input, output, format, block_size, None)?;

    let original = std::fs::read(input).with_context(|| format!("verify read: {input}"))?;
    let compressed = std::fs::read(output).with_context(|| format!("verify read: {output}"))?;
    let decoded =
        reference_decode(&compressed, format).with_context(|| format!("verify decode: {output}"))?;
    if decoded != original {
        bail!("verify mismatch: {output} does not decode back to {input}");
    }
    displaylevel!(2, "{input}: verified OK ({} bytes)\n", original.len());
    Ok(stats)
}
