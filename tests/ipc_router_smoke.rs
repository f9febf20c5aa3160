mod test_support;

use serde_json::json;
use std::io::Write;
use test_support::{read_response, request, spawn_sidecar};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calls = [
        ("health", json!({})),
        ("dashboard.get", json!({})),
        ("students.list", json!({ "today": "2024-06-01" })),
        ("students.get", json!({ "studentId": 1 })),
        ("classes.list", json!({})),
        ("grades.list", json!({ "subject": "Mathematics" })),
        ("attendance.daily", json!({ "date": "2024-03-01" })),
        ("attendance.monthly", json!({ "month": "2024-03" })),
        ("attendance.calendar", json!({ "month": "2024-03", "studentId": 1 })),
        ("assignments.list", json!({ "today": "2024-06-01" })),
        ("request.cancel", json!({ "requestId": "nope" })),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let id = (i + 1).to_string();
        let resp = request(&mut stdin, &mut reader, &id, method, params);
        assert_eq!(
            resp.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            resp
        );
    }

    let resp = request(&mut stdin, &mut reader, "99", "gradebook.open", json!({}));
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"]["code"], "not_implemented");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_lines_get_bad_json_without_an_id() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin).expect("write blank");
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let resp = read_response(&mut reader);
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"]["code"], "bad_json");
    assert!(resp.get("id").is_none());

    // The loop keeps serving afterwards.
    let resp = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["result"]["backend"], "memory");
    assert!(resp["result"]["workspacePath"].is_null());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn cancelling_an_unknown_request_reports_false() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "request.cancel",
        json!({ "requestId": "42" }),
    );
    assert_eq!(resp["result"]["cancelled"], false);

    let resp = request(&mut stdin, &mut reader, "2", "request.cancel", json!({}));
    assert_eq!(resp["error"]["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
}
