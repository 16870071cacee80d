//! End-to-end tests for the `gradgraph` binary

use assert_cmd::Command;

fn gradgraph() -> Command {
    let mut cmd = Command::cargo_bin("gradgraph").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("GRADGRAPH_LOG_LEVEL")
        .env_remove("GRADGRAPH_LOG_FORMAT");
    cmd
}

#[test]
fn test_no_arguments_generates_both_diagrams() {
    let dir = tempfile::tempdir().unwrap();
    let output = gradgraph().current_dir(dir.path()).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "Generated comp-graph-1.png\nGenerated comp-graph-2.png\nDiagrams generated successfully!\n"
    );

    for name in ["comp-graph-1.png", "comp-graph-2.png"] {
        let bytes = std::fs::read(dir.path().join(name)).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", name);
    }
}

#[test]
fn test_logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = gradgraph()
        .current_dir(dir.path())
        .env("GRADGRAPH_LOG_LEVEL", "trace")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_out_dir_flag() {
    let dir = tempfile::tempdir().unwrap();
    gradgraph()
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let first = dir.path().join("comp-graph-1.png");
    let decoder = png::Decoder::new(std::fs::File::open(first).unwrap());
    let reader = decoder.read_info().unwrap();
    assert!(reader.info().width > reader.info().height);
    assert!(dir.path().join("comp-graph-2.png").exists());
}

#[test]
fn test_unwritable_out_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = gradgraph()
        .arg("--out-dir")
        .arg(dir.path().join("missing"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: failed to generate comp-graph-1.png: IO error"),
        "{}",
        stderr
    );
}

#[test]
fn test_dump_json() {
    let output = gradgraph().arg("--dump-json").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"comp-graph-2.png\""));
    assert!(stdout.contains("\"y_pred\""));
}
