#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Starts the sidecar on built-in defaults: in-memory backend with the
/// bundled seed roster.
pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classtrackd");
    let config = temp_dir("classtrack-no-config").join("absent");
    let mut child = Command::new(exe)
        .env("CLASSTRACK_CONFIG", config)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classtrackd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn read_response(reader: &mut BufReader<ChildStdout>) -> Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(Value::Null)
}

/// Returns the `error` object of a failed response.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().expect("error object")
}

pub fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|r| r.get("id").and_then(|v| v.as_i64()).expect("row id"))
        .collect()
}
