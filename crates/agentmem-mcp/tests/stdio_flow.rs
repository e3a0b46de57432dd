use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

fn read_response(reader: &mut impl BufRead) -> Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(&line).expect("parse response json")
}

#[test]
fn stdio_session_handles_lifecycle_and_bad_lines() {
    let data_dir = TempDir::new().expect("temp dir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_agentmemd"))
        .env("MCP_DATA_DIR", data_dir.path())
        .env("RUST_LOG", "debug")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn agentmemd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    let requests = [
        json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}).to_string(),
        "this is not json".to_string(),
        String::new(),
        json!({
            "jsonrpc":"2.0",
            "id":2,
            "method":"tools/call",
            "params":{"name":"memory.write","arguments":{"content":"stdio memory works","tags":["pipe"]}}
        })
        .to_string(),
        json!({
            "jsonrpc":"2.0",
            "id":3,
            "method":"tools/call",
            "params":{"name":"memory.search","arguments":{"query":"stdio"}}
        })
        .to_string(),
        json!({"jsonrpc":"2.0","id":4,"method":"shutdown"}).to_string(),
        json!({"jsonrpc":"2.0","id":5,"method":"tools/list"}).to_string(),
    ];
    for request in &requests {
        writeln!(child_stdin, "{request}").expect("write request");
    }
    drop(child_stdin);

    let init = read_response(&mut reader);
    assert_eq!(init["id"], json!(1));
    assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));

    let parse_error = read_response(&mut reader);
    assert_eq!(parse_error["id"], Value::Null);
    assert_eq!(parse_error["error"]["code"], json!(-32700));

    let written = read_response(&mut reader);
    assert_eq!(written["id"], json!(2));
    let text = written["result"]["content"][0]["text"].as_str().expect("text");
    let payload: Value = serde_json::from_str(text).expect("write payload");
    let memory_id = payload["memory_id"].as_str().expect("memory id");
    assert!(data_dir
        .path()
        .join("memory/shared/items")
        .join(format!("{memory_id}.json"))
        .is_file());

    let searched = read_response(&mut reader);
    let text = searched["result"]["content"][0]["text"].as_str().expect("text");
    let payload: Value = serde_json::from_str(text).expect("search payload");
    assert_eq!(payload["count"], json!(1));
    assert_eq!(payload["results"][0]["id"], json!(memory_id));

    let shutdown = read_response(&mut reader);
    assert_eq!(shutdown["id"], json!(4));
    assert_eq!(shutdown["result"], json!({}));

    let mut rest = String::new();
    reader.read_line(&mut rest).expect("read after shutdown");
    assert!(rest.is_empty(), "no response after shutdown: {rest}");

    let status = child.wait().expect("wait child");
    assert!(status.success());
}

#[test]
fn stdio_exits_cleanly_at_end_of_stream() {
    let data_dir = TempDir::new().expect("temp dir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_agentmemd"))
        .env("MCP_DATA_DIR", data_dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn agentmemd");

    let mut child_stdin = child.stdin.take().expect("stdin");
    writeln!(
        child_stdin,
        "{}",
        json!({"jsonrpc":"2.0","id":"abc","method":"tools/list"})
    )
    .expect("write request");
    drop(child_stdin);

    let mut reader = BufReader::new(child.stdout.take().expect("stdout"));
    let listed = read_response(&mut reader);
    assert_eq!(listed["id"], json!("abc"));
    assert_eq!(listed["result"]["tools"].as_array().map(Vec::len), Some(3));

    let status = child.wait().expect("wait child");
    assert!(status.success());
}
