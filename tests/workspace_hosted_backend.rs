mod test_support;

use serde_json::json;
use test_support::{ids, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn selecting_a_workspace_switches_to_the_hosted_store() {
    let workspace = temp_dir("classtrack-workspace-select");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["backend"], "hosted");
    assert!(workspace.join("classtrack.sqlite3").is_file());

    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(health["backend"], "hosted");
    assert_eq!(health["workspacePath"], workspace.to_string_lossy().as_ref());

    // A fresh workspace starts empty; the seed only backs the memory store.
    let list = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(list["totalStudents"], 0);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "record": { "Name": "Grace Hopper", "class_c": "12-C", "email_c": "grace@school.edu" } }),
    );
    assert_eq!(created["id"], 1);
    assert_eq!(created["studentCode"], "ST001");
    assert_eq!(created["className"], "12-C");

    let grade = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.create",
        json!({ "record": {
            "studentId": 1, "subject": "Physics", "examType": "Quiz",
            "marks": 9, "totalMarks": 12, "date": "2024-04-02"
        }}),
    );
    assert_eq!(grade["percentage"], 75);

    let detail = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "studentId": 1 }),
    );
    assert_eq!(detail["student"]["name"], "Grace Hopper");
    assert_eq!(detail["averageGrade"], 75);

    let classes = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "classes.create",
        json!({ "record": { "name": "12-C", "academicYear": "2024-2025", "studentCount": 30 } }),
    );
    assert_eq!(classes["studentCount"], 1);

    drop(stdin);
    let _ = child.wait();

    // A second process sees the same rows.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let list = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(ids(&list["students"]), vec![1]);
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn workspace_select_requires_a_path() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let err = request_err(&mut stdin, &mut reader, "1", "workspace.select", json!({}));
    assert_eq!(err["code"], "bad_params");
    drop(stdin);
    let _ = child.wait();
}
