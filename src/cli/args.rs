//! Command-line argument parsing for `zdeflate`.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit testing).
//! Both return a [`ParsedArgs`] value capturing every option and filename
//! discovered during the parse.
//!
//! Short options may be aggregated (e.g. `-zv`). A bare `--` marks the end
//! of options; subsequent arguments are file paths regardless of leading
//! dashes. Bad or unrecognised options return an `Err` whose message begins
//! with `"bad usage: "`.

use anyhow::{anyhow, Result};

use crate::cli::constants::{display_level, set_display_level};
use crate::stream::Format;

/// Mutually exclusive operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    /// Compress input to output.
    Compress,
    /// Compress, then decode the output and byte-compare against the input.
    Verify,
    /// Repeated in-memory compression benchmark.
    Bench,
    /// Full self-test corpus.
    SelfTest,
    /// Reduced self-test corpus.
    QuickSelfTest,
}

/// Complete set of options and filenames produced by the parsing loop.
#[derive(Debug)]
pub struct ParsedArgs {
    pub op_mode: OpMode,
    pub format: Format,
    /// Requested block size in bytes; zero selects the library default.
    pub block_size: usize,
    /// Benchmark iterations (only meaningful for [`OpMode::Bench`]).
    pub bench_iters: u32,
    pub input_filename: Option<String>,
    pub output_filename: Option<String>,
    pub dictionary_filename: Option<String>,
    /// When `true`, a help flag was processed; the caller should exit 0.
    pub exit_early: bool,
    /// Program name (argv[0] basename), used by help output.
    pub exe_name: String,
}

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> Result<ParsedArgs> {
    let exe_name = std::env::args().next().unwrap_or_else(|| "zdeflate".to_owned());
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&exe_name, &argv)
}

/// Parse an explicit argument list. `exe_name` is argv[0]; `argv` is
/// argv[1..]. Callable from tests without touching `std::env`.
pub fn parse_args_from(exe_name: &str, argv: &[String]) -> Result<ParsedArgs> {
    let mut op_mode = OpMode::Compress;
    let mut op_mode_set = false;
    let mut format = Format::Deflate;
    let mut block_size: usize = 0;
    let mut bench_iters: u32 = 16;
    let mut input_filename: Option<String> = None;
    let mut output_filename: Option<String> = None;
    let mut dictionary_filename: Option<String> = None;
    let mut exit_early = false;
    let mut all_arguments_are_files = false;

    let set_mode = |mode: OpMode, op_mode: &mut OpMode, op_mode_set: &mut bool| -> Result<()> {
        if *op_mode_set && *op_mode != mode {
            return Err(anyhow!("bad usage: conflicting commands"));
        }
        *op_mode = mode;
        *op_mode_set = true;
        Ok(())
    };

    let mut iter = argv.iter().peekable();
    while let Some(arg) = iter.next() {
        if all_arguments_are_files || !arg.starts_with('-') || arg == "-" {
            if input_filename.is_none() {
                input_filename = Some(arg.clone());
            } else if output_filename.is_none() {
                output_filename = Some(arg.clone());
            } else {
                return Err(anyhow!("bad usage: too many file arguments: {arg}"));
            }
            continue;
        }
        if arg == "--" {
            all_arguments_are_files = true;
            continue;
        }

        // Long options.
        match arg.as_str() {
            "--help" => {
                crate::cli::help::print_long_help(exe_name);
                exit_early = true;
                continue;
            }
            "--zlib" => {
                format = Format::Zlib;
                continue;
            }
            "--gzip" => {
                format = Format::Gzip;
                continue;
            }
            "--verbose" => {
                set_display_level(display_level().max(3));
                continue;
            }
            _ => {}
        }
        if let Some(rest) = arg.strip_prefix("--") {
            return Err(anyhow!("bad usage: unknown option --{rest}"));
        }

        // Aggregated short options.
        let mut chars = arg[1..].chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                'c' => set_mode(OpMode::Compress, &mut op_mode, &mut op_mode_set)?,
                'v' => set_mode(OpMode::Verify, &mut op_mode, &mut op_mode_set)?,
                't' => set_mode(OpMode::SelfTest, &mut op_mode, &mut op_mode_set)?,
                'q' => set_mode(OpMode::QuickSelfTest, &mut op_mode, &mut op_mode_set)?,
                'b' => {
                    set_mode(OpMode::Bench, &mut op_mode, &mut op_mode_set)?;
                    // Optional digit run glued to -b selects the iteration
                    // count, e.g. -b32.
                    let mut digits = String::new();
                    while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        digits.push(*d);
                        chars.next();
                    }
                    if !digits.is_empty() {
                        bench_iters = digits
                            .parse()
                            .map_err(|_| anyhow!("bad usage: bad benchmark count {digits}"))?;
                    }
                }
                'z' => format = Format::Zlib,
                'g' => format = Format::Gzip,
                'V' => set_display_level(display_level().max(3)),
                'h' => {
                    crate::cli::help::print_long_help(exe_name);
                    exit_early = true;
                }
                'D' => {
                    // Dictionary file: rest of this argument, or the next one.
                    let rest: String = chars.by_ref().collect();
                    let value = if rest.is_empty() {
                        iter.next()
                            .cloned()
                            .ok_or_else(|| anyhow!("bad usage: -D needs a file name"))?
                    } else {
                        rest
                    };
                    dictionary_filename = Some(value);
                }
                'B' => {
                    let rest: String = chars.by_ref().collect();
                    let value = if rest.is_empty() {
                        iter.next()
                            .cloned()
                            .ok_or_else(|| anyhow!("bad usage: -B needs a byte count"))?
                    } else {
                        rest
                    };
                    block_size = value
                        .parse()
                        .map_err(|_| anyhow!("bad usage: bad block size {value}"))?;
                }
                other => return Err(anyhow!("bad usage: unknown option -{other}")),
            }
        }
    }

    if dictionary_filename.is_some() && format != Format::Zlib {
        return Err(anyhow!("bad usage: a dictionary requires zlib framing (-z)"));
    }

    Ok(ParsedArgs {
        op_mode,
        format,
        block_size,
        bench_iters,
        input_filename,
        output_filename,
        dictionary_filename,
        exit_early,
        exe_name: exe_name.to_owned(),
    })
}
