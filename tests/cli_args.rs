// Unit tests for src/cli/args.rs: option parsing, aggregation, glued
// values, and usage errors.

use zdeflate::cli::args::{parse_args_from, OpMode};
use zdeflate::stream::Format;

fn parse(args: &[&str]) -> anyhow::Result<zdeflate::cli::args::ParsedArgs> {
    let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    parse_args_from("zdeflate", &argv)
}

#[test]
fn defaults_are_compress_raw_deflate() {
    let p = parse(&["in.bin", "out.bin"]).unwrap();
    assert_eq!(p.op_mode, OpMode::Compress);
    assert_eq!(p.format, Format::Deflate);
    assert_eq!(p.block_size, 0);
    assert_eq!(p.input_filename.as_deref(), Some("in.bin"));
    assert_eq!(p.output_filename.as_deref(), Some("out.bin"));
}

#[test]
fn framing_flags_select_format() {
    assert_eq!(parse(&["-z", "a"]).unwrap().format, Format::Zlib);
    assert_eq!(parse(&["-g", "a"]).unwrap().format, Format::Gzip);
    assert_eq!(parse(&["--zlib", "a"]).unwrap().format, Format::Zlib);
    assert_eq!(parse(&["--gzip", "a"]).unwrap().format, Format::Gzip);
}

#[test]
fn short_options_aggregate() {
    let p = parse(&["-vz", "a", "b"]).unwrap();
    assert_eq!(p.op_mode, OpMode::Verify);
    assert_eq!(p.format, Format::Zlib);
}

#[test]
fn bench_count_can_be_glued() {
    let p = parse(&["-b32", "a"]).unwrap();
    assert_eq!(p.op_mode, OpMode::Bench);
    assert_eq!(p.bench_iters, 32);
    let p = parse(&["-b", "a"]).unwrap();
    assert_eq!(p.bench_iters, 16);
}

#[test]
fn block_size_glued_or_separate() {
    assert_eq!(parse(&["-B65536", "a"]).unwrap().block_size, 65_536);
    assert_eq!(parse(&["-B", "65536", "a"]).unwrap().block_size, 65_536);
    assert!(parse(&["-B", "notanumber", "a"]).is_err());
}

#[test]
fn dictionary_needs_zlib() {
    assert!(parse(&["-D", "dict", "a"]).is_err());
    let p = parse(&["-z", "-D", "dict", "a"]).unwrap();
    assert_eq!(p.dictionary_filename.as_deref(), Some("dict"));
}

#[test]
fn self_test_modes() {
    assert_eq!(parse(&["-t"]).unwrap().op_mode, OpMode::SelfTest);
    assert_eq!(parse(&["-q"]).unwrap().op_mode, OpMode::QuickSelfTest);
}

#[test]
fn conflicting_commands_are_rejected() {
    assert!(parse(&["-t", "-b", "a"]).is_err());
    assert!(parse(&["-v", "-q", "a"]).is_err());
}

#[test]
fn double_dash_ends_options() {
    let p = parse(&["--", "-weird", "-names"]).unwrap();
    assert_eq!(p.input_filename.as_deref(), Some("-weird"));
    assert_eq!(p.output_filename.as_deref(), Some("-names"));
}

#[test]
fn unknown_options_error_with_bad_usage() {
    let err = parse(&["-Z", "a"]).unwrap_err();
    assert!(err.to_string().starts_with("bad usage: "));
    let err = parse(&["--wat", "a"]).unwrap_err();
    assert!(err.to_string().starts_with("bad usage: "));
}

#[test]
fn too_many_files_rejected() {
    assert!(parse(&["a", "b", "c"]).is_err());
}

#[test]
fn help_sets_exit_early() {
    assert!(parse(&["--help"]).unwrap().exit_early);
}
