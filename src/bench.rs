//! In-memory compression benchmark: repeated one-shot runs over a file's
//! content, reporting the best throughput and the achieved ratio.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::displaylevel;
use crate::stream::{memory_compress, memory_compress_bound, Format};

/// Outcome of a benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct BenchResult {
    pub iterations: u32,
    pub in_bytes: u64,
    pub out_bytes: u64,
    /// Fastest single-iteration wall time, in nanoseconds.
    pub best_ns: u64,
}

impl BenchResult {
    pub fn ratio(&self) -> f64 {
        if self.out_bytes == 0 {
            return 0.0;
        }
        self.in_bytes as f64 / self.out_bytes as f64
    }

    pub fn throughput_mb_s(&self) -> f64 {
        if self.best_ns == 0 {
            return f64::INFINITY;
        }
        (self.in_bytes as f64 / (1 << 20) as f64) / (self.best_ns as f64 / 1e9)
    }
}

/// Compresses `data` `iterations` times into a reused buffer, timing each
/// run with the monotonic clock and keeping the fastest.
pub fn bench_memory(
    data: &[u8],
    format: Format,
    block_size: usize,
    iterations: u32,
) -> Result<BenchResult> {
    let iterations = iterations.max(1);
    let mut out = vec![0u8; memory_compress_bound(data.len(), format, block_size)];
    let mut best_ns = u64::MAX;
    let mut out_bytes = 0u64;
    for _ in 0..iterations {
        let t0 = Instant::now();
        let n = memory_compress(data, &mut out, format, block_size)
            .context("benchmark compression")?;
        let ns = t0.elapsed().as_nanos() as u64;
        best_ns = best_ns.min(ns.max(1));
        out_bytes = n as u64;
    }
    Ok(BenchResult {
        iterations,
        in_bytes: data.len() as u64,
        out_bytes,
        best_ns,
    })
}

/// Benchmarks one file and prints the report.
pub fn bench_file(path: &str, format: Format, block_size: usize, iterations: u32) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("benchmark read: {path}"))?;
    let result = bench_memory(&data, format, block_size, iterations)?;
    displaylevel!(
        1,
        "{path}: {} -> {} bytes ({:.3}x), {:.1} MB/s over {} iterations\n",
        result.in_bytes,
        result.out_bytes,
        result.ratio(),
        result.throughput_mb_s(),
        result.iterations
    );
    Ok(())
}
