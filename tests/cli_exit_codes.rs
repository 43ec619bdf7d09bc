use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pdfgen_lib::{PdfGenOutput, ResponseEnvelope};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pdfgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run pdfgen")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pdfgen"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn pdfgen");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write event");
    child.wait_with_output().expect("wait pdfgen")
}

fn envelope(output: &Output) -> ResponseEnvelope {
    serde_json::from_slice(&output.stdout).expect("stdout should be an envelope")
}

fn write_event(dir: &Path, event: &str) -> String {
    let path = dir.join("event.json");
    std::fs::write(&path, event).expect("write event");
    path.to_str().unwrap().to_string()
}

#[test]
fn invoke_post_content_exits_zero_with_pdf() {
    let dir = TempDir::new().expect("tempdir");
    let event = write_event(
        dir.path(),
        r#"{"requestContext":{"http":{"method":"POST"}},"body":"{\"pdfContent\":\"<h1>Hi</h1>\",\"fileName\":\"hi.pdf\"}"}"#,
    );

    let output = run(&["--engine", "stub", "invoke", "--event", &event]);
    assert_eq!(output.status.code(), Some(0));

    let env = envelope(&output);
    assert_eq!(env.status_code, 200);
    assert!(env.is_base64_encoded);
    assert_eq!(
        env.header("Content-Disposition"),
        Some("inline; filename=\"hi.pdf\"")
    );
    let bytes = BASE64.decode(&env.body).expect("base64 body");
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn invoke_reads_event_from_stdin() {
    let output = run_with_stdin(
        &["--engine", "stub", "invoke"],
        r#"{"requestContext":{"http":{"method":"GET"}},"queryStringParameters":{"pdf":"{\"fileName\":\"x\"}"}}"#,
    );
    assert_eq!(output.status.code(), Some(0));

    let env = envelope(&output);
    assert_eq!(env.status_code, 400);
    assert_eq!(env.body, r#"{"error":"Invalid query parameters"}"#);
}

#[test]
fn invoke_non_http_event_renders_default() {
    let output = run_with_stdin(&["--engine", "stub", "invoke"], "42");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(envelope(&output).status_code, 200);
}

#[test]
fn invoke_exit_code_is_two_for_500_envelopes() {
    let output = run_with_stdin(
        &["--engine", "stub", "invoke"],
        r#"{"requestContext":{"http":{"method":"POST"}},"body":"{broken"}"#,
    );
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(envelope(&output).status_code, 500);
}

#[test]
fn invoke_missing_event_file_is_fatal() {
    let output = run(&["--engine", "stub", "invoke", "--event", "/does/not/exist.json"]);
    assert_eq!(output.status.code(), Some(2));
    let payload: PdfGenOutput = serde_json::from_slice(&output.stdout).expect("error JSON");
    match payload {
        PdfGenOutput::Error(err) => assert!(err
            .message
            .unwrap_or_default()
            .contains("/does/not/exist.json")),
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn render_writes_pdf_file() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("nested").join("doc.pdf");

    let output = run(&[
        "--engine",
        "stub",
        "render",
        "--html",
        "<h1>Hello</h1>",
        "--pdf-config",
        r#"{"landscape":true}"#,
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));

    let bytes = std::fs::read(&out).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF-"));
    match serde_json::from_slice::<PdfGenOutput>(&output.stdout).expect("render JSON") {
        PdfGenOutput::Render(render) => {
            assert_eq!(render.target, "html");
            assert_eq!(render.bytes, bytes.len());
        }
        other => panic!("expected render output, got {other:?}"),
    }
}

#[test]
fn render_rejects_non_object_pdf_config() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("doc.pdf");
    let output = run(&[
        "--engine",
        "stub",
        "render",
        "--html",
        "<p>x</p>",
        "--pdf-config",
        "[1]",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn invalid_config_file_exits_two() {
    let dir = TempDir::new().expect("tempdir");
    let cfg_path = dir.path().join("pdfgen.toml");
    std::fs::write(&cfg_path, "[timeouts]\nnavigation = \"0s\"\n").expect("write config");

    let output = run(&[
        "--engine",
        "stub",
        "--config",
        cfg_path.to_str().unwrap(),
        "invoke",
        "--event",
        "-",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid config"), "stdout: {stdout}");
}

#[test]
fn config_file_is_accepted() {
    let dir = TempDir::new().expect("tempdir");
    let cfg_path = dir.path().join("pdfgen.toml");
    std::fs::write(&cfg_path, "[timeouts]\nnavigation = \"5s\"\n").expect("write config");

    let output = run_with_stdin(
        &["--engine", "stub", "--config", cfg_path.to_str().unwrap(), "invoke"],
        "{}",
    );
    assert_eq!(output.status.code(), Some(0));
}
