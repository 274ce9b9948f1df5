//! Stream-level error taxonomy.
//!
//! Every failure surfaced by the compression core maps onto one of these
//! cases. Once a stream has returned an error it must be dropped; no variant
//! is recoverable in place.

/// Errors surfaced by [`crate::stream::CompressStream`] and the one-shot
/// helpers built on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The input could not be read.
    Source,
    /// The output could not be written, or the bit writer overflowed its
    /// capacity.
    Destination,
    /// The dictionary was rejected: wrong framing, set after input was
    /// consumed, or unloadable.
    Dictionary,
    /// An internal allocation failed.
    Memory,
    /// An internal invariant was violated; the carried string names the
    /// failing phase.
    Compression(&'static str),
}

impl core::fmt::Display for StreamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StreamError::Source => write!(f, "input read failed"),
            StreamError::Destination => write!(f, "output write failed"),
            StreamError::Dictionary => write!(f, "dictionary rejected"),
            StreamError::Memory => write!(f, "allocation failed"),
            StreamError::Compression(phase) => write!(f, "compression failed in {phase}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<crate::bitio::BitOverflow> for StreamError {
    fn from(_: crate::bitio::BitOverflow) -> StreamError {
        StreamError::Destination
    }
}
