//! Usage and help text.

use crate::cli::constants::COMPRESSOR_NAME;
use crate::VERSION_STRING;

/// One-line usage summary, printed on argument errors.
pub fn print_usage(exe_name: &str) {
    eprintln!("Usage: {exe_name} [options] <input> [output]");
    eprintln!("Try `{exe_name} --help` for more information.");
}

/// Full help text.
pub fn print_long_help(exe_name: &str) {
    println!("{COMPRESSOR_NAME} v{VERSION_STRING} - near-optimal DEFLATE compressor");
    println!();
    println!("Usage: {exe_name} [options] <input> [output]");
    println!();
    println!("Commands (mutually exclusive):");
    println!("  -c          compress <input> into <output> (default)");
    println!("  -v          compress, then decode and compare against <input>");
    println!("  -b[N]       in-memory benchmark, N iterations (default 16)");
    println!("  -t          self-test (no files needed)");
    println!("  -q          quick self-test");
    println!();
    println!("Options:");
    println!("  -z, --zlib  zlib framing (RFC 1950)");
    println!("  -g, --gzip  gzip framing (RFC 1952)");
    println!("              (default is a raw DEFLATE stream)");
    println!("  -D FILE     preset dictionary (zlib framing only)");
    println!("  -B BYTES    maximum block size (clamped to 32 KiB..2 MiB)");
    println!("  -V, --verbose  more progress output");
    println!("  -h, --help  this help");
    println!();
    println!("Exit code is 0 on success and 100 on any failure.");
}
