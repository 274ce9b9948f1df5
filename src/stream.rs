//! Streaming compression driver.
//!
//! [`CompressStream`] owns the whole per-stream state: the sliding window
//! (up to [`HISTORY_SIZE`] bytes of history followed by up to one block of
//! new bytes), the match finder, the block encoder, the bit writer, and the
//! running checksum. Each [`compress`](CompressStream::compress) call makes
//! as much progress as the supplied buffers allow and returns how many bytes
//! it consumed and produced; callers loop with refilled buffers until the
//! stream reports itself finished.
//!
//! The driver moves through a small state machine: header staging, body
//! (absorb input, encode a block per window fill), footer staging, done.
//! Every block drive is the same sequence: rebuild the match finder over
//! history plus new bytes, walk the history region to prime its visited
//! state, collect candidates for the new bytes, split, encode, then slide
//! the block tail into the history region.

use crate::bitio::BitWriter;
use crate::block::{emit_empty_static_block, BlockEncoder};
use crate::checksum::{Adler32State, Crc32State, adler32_oneshot};
use crate::error::StreamError;
use crate::frame;
use crate::matchfinder::{Match, MatchFinder, NMATCHES_PER_OFFSET};
use crate::split::{split_block, MAX_SPLITS};
use crate::tables::HISTORY_SIZE;

/// Smallest accepted block size.
pub const MIN_BLOCK_SIZE: usize = 32_768;
/// Largest accepted block size.
pub const MAX_BLOCK_SIZE: usize = 2_097_152;
/// Block size selected when the caller passes zero.
pub const DEFAULT_BLOCK_SIZE: usize = 1_048_576;

/// Output envelope selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw RFC 1951 bitstream, no wrapper.
    Deflate,
    /// RFC 1950 wrapper with an Adler-32 trailer.
    Zlib,
    /// RFC 1952 wrapper with CRC-32 and ISIZE trailer.
    Gzip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    HeaderPending,
    Body,
    FooterPending,
    Done,
}

enum RunningChecksum {
    None,
    Adler(Adler32State),
    Crc(Crc32State),
}

impl RunningChecksum {
    fn update(&mut self, data: &[u8]) {
        match self {
            RunningChecksum::None => {}
            RunningChecksum::Adler(s) => s.update(data),
            RunningChecksum::Crc(s) => s.update(data),
        }
    }

    fn value(&self) -> u32 {
        match self {
            RunningChecksum::None => 0,
            RunningChecksum::Adler(s) => s.finish(),
            RunningChecksum::Crc(s) => s.finish(),
        }
    }
}

/// One compression stream. Not reusable after an error or completion.
pub struct CompressStream {
    format: Format,
    max_block: usize,
    state: State,

    window: Vec<u8>,
    prev_size: usize,
    cur_in: usize,

    finder: MatchFinder,
    matches: Vec<Match>,
    splits: Vec<usize>,
    encoder: BlockEncoder,
    writer: BitWriter,

    staged: Vec<u8>,
    staged_pos: usize,

    checksum: RunningChecksum,
    dict_id: Option<u32>,

    total_in: u64,
    total_out: u64,
}

impl CompressStream {
    /// Creates a stream. `max_block_size` of zero selects
    /// [`DEFAULT_BLOCK_SIZE`]; other values clamp to
    /// `[MIN_BLOCK_SIZE, MAX_BLOCK_SIZE]`.
    pub fn new(format: Format, max_block_size: usize) -> Result<CompressStream, StreamError> {
        let max_block = effective_block_size(max_block_size);
        let window_cap = HISTORY_SIZE + max_block;

        let mut window = Vec::new();
        window
            .try_reserve_exact(window_cap)
            .map_err(|_| StreamError::Memory)?;
        let mut matches = Vec::new();
        matches
            .try_reserve_exact(max_block * NMATCHES_PER_OFFSET)
            .map_err(|_| StreamError::Memory)?;

        Ok(CompressStream {
            format,
            max_block,
            state: State::HeaderPending,
            window,
            prev_size: 0,
            cur_in: 0,
            finder: MatchFinder::new(window_cap)?,
            matches,
            splits: Vec::with_capacity(MAX_SPLITS),
            encoder: BlockEncoder::new(max_block)?,
            // Worst case before the stored fallback kicks in is a dynamic
            // attempt near two bits per input bit, plus table overhead.
            writer: BitWriter::with_capacity(2 * window_cap + 8192),
            staged: Vec::new(),
            staged_pos: 0,
            checksum: match format {
                Format::Deflate => RunningChecksum::None,
                Format::Zlib => RunningChecksum::Adler(Adler32State::new()),
                Format::Gzip => RunningChecksum::Crc(Crc32State::new()),
            },
            dict_id: None,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Installs a preset dictionary. Valid only for zlib framing and only
    /// before the first [`compress`](Self::compress) call. A dictionary
    /// longer than [`HISTORY_SIZE`] is silently reduced to its trailing
    /// [`HISTORY_SIZE`] bytes; the header's DICTID still covers the bytes
    /// passed in, matching what a decompressor is handed.
    pub fn set_dictionary(&mut self, dict: &[u8]) -> Result<(), StreamError> {
        if self.format != Format::Zlib || self.state != State::HeaderPending {
            return Err(StreamError::Dictionary);
        }
        let tail = &dict[dict.len().saturating_sub(HISTORY_SIZE)..];
        self.window.clear();
        self.window.extend_from_slice(tail);
        self.prev_size = tail.len();
        self.dict_id = Some(adler32_oneshot(dict));
        Ok(())
    }

    /// Advances the stream: drains staged output into `dst`, absorbs up to
    /// one block's worth of `src`, and encodes whenever the window fills or
    /// `finalize` is set with all of `src` consumed. Returns
    /// `(bytes_consumed, bytes_written)`.
    ///
    /// The call yields when it runs out of input or output space; keep
    /// calling with `finalize` until [`is_finished`](Self::is_finished).
    pub fn compress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        finalize: bool,
    ) -> Result<(usize, usize), StreamError> {
        let mut consumed = 0usize;
        let mut written = 0usize;

        if self.state == State::HeaderPending {
            self.stage_header();
            self.state = State::Body;
        }

        loop {
            written += self.drain_into(&mut dst[written..]);
            if self.staged_pos < self.staged.len() {
                break; // out of output space
            }

            match self.state {
                State::HeaderPending => unreachable!("header staged on entry"),
                State::Done => break,
                State::FooterPending => {
                    // Footer bytes fully drained above.
                    self.state = State::Done;
                    break;
                }
                State::Body => {
                    let room = self.max_block - self.cur_in;
                    let take = room.min(src.len() - consumed);
                    if take > 0 {
                        self.absorb(&src[consumed..consumed + take]);
                        consumed += take;
                    }
                    let last = finalize && consumed == src.len();
                    if self.cur_in == self.max_block && !last {
                        self.encode_block(false)?;
                        continue;
                    }
                    if last {
                        self.encode_block(true)?;
                        self.writer.flush_bits()?;
                        let tail = self.writer.take_bytes();
                        self.stage(&tail);
                        self.stage_footer();
                        self.state = State::FooterPending;
                        continue;
                    }
                    break; // need more input
                }
            }
        }

        Ok((consumed, written))
    }

    /// `true` once the footer has been fully drained.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done && self.staged_pos == self.staged.len()
    }

    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running checksum over the input consumed so far (Adler-32 for zlib,
    /// CRC-32 for gzip, zero for raw deflate).
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn absorb(&mut self, data: &[u8]) {
        self.checksum.update(data);
        self.window.extend_from_slice(data);
        self.cur_in += data.len();
        self.total_in += data.len() as u64;
    }

    fn stage(&mut self, bytes: &[u8]) {
        if self.staged_pos == self.staged.len() {
            self.staged.clear();
            self.staged_pos = 0;
        }
        self.staged.extend_from_slice(bytes);
    }

    fn drain_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.staged.len() - self.staged_pos);
        dst[..n].copy_from_slice(&self.staged[self.staged_pos..self.staged_pos + n]);
        self.staged_pos += n;
        self.total_out += n as u64;
        if self.staged_pos == self.staged.len() {
            self.staged.clear();
            self.staged_pos = 0;
        }
        n
    }

    fn stage_header(&mut self) {
        match self.format {
            Format::Deflate => {}
            Format::Zlib => {
                let h = frame::zlib_header(self.dict_id);
                self.stage(&h);
            }
            Format::Gzip => {
                let h = frame::gzip_header();
                self.stage(&h);
            }
        }
    }

    fn stage_footer(&mut self) {
        match self.format {
            Format::Deflate => {}
            Format::Zlib => {
                let t = frame::zlib_trailer(self.checksum.value());
                self.stage(&t);
            }
            Format::Gzip => {
                let t = frame::gzip_trailer(self.checksum.value(), self.total_in);
                self.stage(&t);
            }
        }
    }

    /// Runs one block through the encoder pipeline and slides the window.
    fn encode_block(&mut self, is_final: bool) -> Result<(), StreamError> {
        let block_start = self.prev_size;
        let block_end = self.prev_size + self.cur_in;

        if self.cur_in == 0 {
            // Finalization landed exactly on a block boundary (or the input
            // was empty): close the stream with an empty final block.
            debug_assert!(is_final);
            emit_empty_static_block(&mut self.writer)?;
            return Ok(());
        }

        self.finder.rebuild(&self.window);
        self.finder.skip(0..block_start);
        self.matches.clear();
        self.matches
            .resize(self.cur_in * NMATCHES_PER_OFFSET, Match::default());
        self.finder
            .find_all(block_start..block_end, block_end, &mut self.matches);

        split_block(
            &self.window,
            &self.matches,
            block_start,
            block_end,
            &mut self.splits,
        );

        self.encoder.encode_block(
            &mut self.writer,
            &self.window,
            block_start,
            &self.matches,
            &self.splits,
            is_final,
        )?;

        // Hand the finished whole bytes to the staging buffer; a partial
        // byte stays in the writer across blocks.
        let out = self.writer.take_bytes();
        self.stage(&out);

        if !is_final {
            // Keep the tail of the completed block as history.
            let keep = self.cur_in.min(HISTORY_SIZE);
            self.window.copy_within(block_end - keep..block_end, 0);
            self.window.truncate(keep);
            self.prev_size = keep;
            self.cur_in = 0;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compresses `src` into `dst` in one call. Returns the number of bytes
/// written; fails with [`StreamError::Destination`] when `dst` is too small
/// (size it with [`memory_compress_bound`]).
pub fn memory_compress(
    src: &[u8],
    dst: &mut [u8],
    format: Format,
    max_block_size: usize,
) -> Result<usize, StreamError> {
    let mut stream = CompressStream::new(format, max_block_size)?;
    let mut consumed = 0usize;
    let mut written = 0usize;
    loop {
        let (c, w) = stream.compress(&src[consumed..], &mut dst[written..], true)?;
        consumed += c;
        written += w;
        if stream.is_finished() {
            return Ok(written);
        }
        if c == 0 && w == 0 {
            return Err(StreamError::Destination);
        }
    }
}

/// Clamped block size actually used by a stream created with
/// `max_block_size` (zero selects the default).
fn effective_block_size(max_block_size: usize) -> usize {
    if max_block_size == 0 {
        DEFAULT_BLOCK_SIZE
    } else {
        max_block_size.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE)
    }
}

/// Upper bound on the output size of [`memory_compress`] for `src_len`
/// input bytes.
///
/// Worst case is every block hitting the stored fallback: each of the
/// `ceil(src_len / block_size)` blocks pays one 5-byte stored frame per
/// 65,535-byte chunk, so the frame count is bounded by
/// `src_len / 65_535 + src_len / block_size + 2` (the stream may cut blocks
/// smaller than a single stored chunk). The remainder covers the final
/// empty block, flush padding, and the envelope.
pub fn memory_compress_bound(src_len: usize, format: Format, max_block_size: usize) -> usize {
    let framing = match format {
        Format::Deflate => 0,
        Format::Zlib => 2 + 4,
        Format::Gzip => 10 + 8,
    };
    let block = effective_block_size(max_block_size);
    let stored_frames = src_len / 65_535 + src_len / block + 2;
    src_len + 5 * stored_frames + 16 + framing
}
