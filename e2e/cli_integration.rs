// End-to-end CLI tests: spawn the built binary against temp files and check
// exit codes, outputs, and the self-test command.

use std::io::Read;
use std::process::Command;

fn zdeflate() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zdeflate"))
}

fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn compress_writes_decodable_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let content: Vec<u8> = b"cli roundtrip ".iter().copied().cycle().take(50_000).collect();
    let input = write_temp(&dir, "input.txt", &content);
    let output = dir.path().join("out.gz");

    let status = zdeflate()
        .args(["-g", &input, output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let compressed = std::fs::read(&output).unwrap();
    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(&compressed[..])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, content);
}

#[test]
fn verify_mode_passes_on_real_data() {
    let dir = tempfile::tempdir().unwrap();
    let content: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
    let input = write_temp(&dir, "data.bin", &content);
    let output = dir.path().join("data.zz");

    let status = zdeflate()
        .args(["-v", "-z", &input, output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(output.exists());
}

#[test]
fn default_output_name_is_derived() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "plain.txt", b"derive my name");
    let status = zdeflate().args(["-g", &input]).status().unwrap();
    assert!(status.success());
    assert!(dir.path().join("plain.txt.gz").exists());
}

#[test]
fn quick_self_test_passes() {
    let status = zdeflate().arg("-q").status().unwrap();
    assert!(status.success());
}

#[test]
fn bench_runs_on_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let content: Vec<u8> = b"benchmark body ".iter().copied().cycle().take(20_000).collect();
    let input = write_temp(&dir, "bench.bin", &content);
    let status = zdeflate().args(["-b2", "-g", &input]).status().unwrap();
    assert!(status.success());
}

#[test]
fn missing_input_fails_with_100() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.bin");
    let out = dir.path().join("nope.zd");
    let status = zdeflate()
        .args([missing.to_str().unwrap(), out.to_str().unwrap()])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(100));
}

#[test]
fn no_arguments_fails_with_100() {
    let status = zdeflate().status().unwrap();
    assert_eq!(status.code(), Some(100));
}

#[test]
fn unknown_option_fails_with_100() {
    let status = zdeflate().arg("-Z").status().unwrap();
    assert_eq!(status.code(), Some(100));
}

#[test]
fn dictionary_without_zlib_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp(&dir, "in.bin", b"payload");
    let dict = write_temp(&dir, "dict.bin", b"payload");
    let status = zdeflate().args(["-g", "-D", &dict, &input]).status().unwrap();
    assert_eq!(status.code(), Some(100));
}

#[test]
fn help_exits_zero() {
    let out = zdeflate().arg("--help").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage"));
}

#[test]
fn compress_with_dictionary_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write_temp(&dir, "dict.bin", b"abcdefgh");
    let content: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(4_000).collect();
    let input = write_temp(&dir, "in.bin", &content);
    let output = dir.path().join("in.zz");
    let status = zdeflate()
        .args(["-z", "-D", &dict, &input, output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());
    let compressed = std::fs::read(&output).unwrap();
    assert_ne!(compressed[1] & 0x20, 0, "FDICT expected in the zlib header");
}
