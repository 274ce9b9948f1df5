//! Thin wrappers around the `simd-adler32` and `crc32fast` crates providing
//! the two checksums required by the stream envelopes: Adler-32 for zlib
//! (RFC 1950) and CRC-32 for gzip (RFC 1952).
//!
//! Both wrappers expose the same minimal surface: a streaming state with
//! `update`, and a one-shot function for small inputs such as dictionaries.

/// Streaming Adler-32 state.
pub struct Adler32State(simd_adler32::Adler32);

impl Adler32State {
    pub fn new() -> Adler32State {
        Adler32State(simd_adler32::Adler32::new())
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.0.write(data);
    }

    #[inline]
    pub fn finish(&self) -> u32 {
        self.0.finish()
    }
}

impl Default for Adler32State {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot Adler-32.
///
/// `adler32_oneshot(b"")` == `1`, the RFC 1950 initial value.
#[inline]
pub fn adler32_oneshot(data: &[u8]) -> u32 {
    simd_adler32::adler32(&data)
}

/// Streaming CRC-32 (IEEE, reflected) state.
pub struct Crc32State(crc32fast::Hasher);

impl Crc32State {
    pub fn new() -> Crc32State {
        Crc32State(crc32fast::Hasher::new())
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    #[inline]
    pub fn finish(&self) -> u32 {
        self.0.clone().finalize()
    }
}

impl Default for Crc32State {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot CRC-32. `crc32_oneshot(b"")` == `0`.
#[inline]
pub fn crc32_oneshot(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
