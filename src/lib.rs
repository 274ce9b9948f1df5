// zdeflate: near-optimal DEFLATE compressor

pub mod bitio;
pub mod block;
pub mod checksum;
pub mod cli;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod matchfinder;
pub mod parse;
pub mod split;
pub mod stream;
pub mod tables;

pub mod bench;
pub mod file;
pub mod selftest;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming compression context; feed input in chunks, drain output.
pub use stream::CompressStream;

/// Output envelope selection (raw deflate, zlib, or gzip).
pub use stream::Format;

/// One-shot in-memory compression.
pub use stream::memory_compress;

/// Upper bound on one-shot output size.
pub use stream::memory_compress_bound;

/// Stream-level error taxonomy.
pub use error::StreamError;

/// Block size limits and default.
pub use stream::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

// ─────────────────────────────────────────────────────────────────────────────
// Version API
// ─────────────────────────────────────────────────────────────────────────────

pub const VERSION_MAJOR: i32 = 0;
pub const VERSION_MINOR: i32 = 1;
pub const VERSION_RELEASE: i32 = 0;
pub const VERSION_STRING: &str = "0.1.0";
