//! Binary entry point for the `zdeflate` command-line tool.
//!
//! Control flow: [`parse_args`] processes flags into a `ParsedArgs` value,
//! [`run`] dispatches to the selected operation (compress, verify,
//! benchmark, self-test) and returns the exit code. Any failure exits 100
//! with a one-line diagnostic naming the phase and file.

use zdeflate::cli::args::{parse_args, OpMode, ParsedArgs};
use zdeflate::cli::constants::EXIT_FAILURE;
use zdeflate::cli::help::print_usage;
use zdeflate::displaylevel;
use zdeflate::file::{
    compress_and_verify_file, compress_file, default_output_name, load_dictionary,
};

/// Execute the operation selected by argument parsing. Returns the process
/// exit code.
fn run(args: ParsedArgs) -> i32 {
    // Self-contained commands first; they need no files.
    match args.op_mode {
        OpMode::SelfTest | OpMode::QuickSelfTest => {
            let quick = args.op_mode == OpMode::QuickSelfTest;
            return match zdeflate::selftest::run_self_test(quick) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("zdeflate: self-test failed: {e}");
                    EXIT_FAILURE
                }
            };
        }
        _ => {}
    }

    let Some(input) = args.input_filename.clone() else {
        eprintln!("zdeflate: no input file");
        print_usage(&args.exe_name);
        return EXIT_FAILURE;
    };

    if args.op_mode == OpMode::Bench {
        return match zdeflate::bench::bench_file(
            &input,
            args.format,
            args.block_size,
            args.bench_iters,
        ) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("zdeflate: {e}");
                EXIT_FAILURE
            }
        };
    }

    // Compress / verify need an output filename; derive one when absent.
    let output = args
        .output_filename
        .clone()
        .unwrap_or_else(|| default_output_name(&input, args.format));
    if args.output_filename.is_none() {
        displaylevel!(2, "compressed filename will be: {output}\n");
    }

    let dictionary = match args.dictionary_filename.as_deref() {
        Some(path) => match load_dictionary(path) {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("zdeflate: {e}");
                return EXIT_FAILURE;
            }
        },
        None => None,
    };

    let result = match args.op_mode {
        OpMode::Compress => compress_file(
            &input,
            &output,
            args.format,
            args.block_size,
            dictionary.as_deref(),
        ),
        OpMode::Verify => compress_and_verify_file(
            &input,
            &output,
            args.format,
            args.block_size,
            dictionary.as_deref(),
        ),
        OpMode::Bench | OpMode::SelfTest | OpMode::QuickSelfTest => unreachable!(),
    };

    match result {
        Ok(stats) => {
            displaylevel!(
                2,
                "{input}: {} -> {} bytes ({:.2}%) in {:.3}s\n",
                stats.in_bytes,
                stats.out_bytes,
                if stats.in_bytes > 0 {
                    stats.out_bytes as f64 * 100.0 / stats.in_bytes as f64
                } else {
                    0.0
                },
                stats.elapsed.as_secs_f64()
            );
            0
        }
        Err(e) => {
            eprintln!("zdeflate: {e}");
            EXIT_FAILURE
        }
    }
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("zdeflate: {e}");
            let exe = std::env::args().next().unwrap_or_else(|| "zdeflate".to_owned());
            print_usage(&exe);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if args.exit_early {
        std::process::exit(0);
    }

    std::process::exit(run(args));
}
