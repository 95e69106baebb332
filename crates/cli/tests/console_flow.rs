// End-to-end tests for the dramp binary against a mock console API.
// Run with: cargo test -p dataramp-cli --test console_flow

use std::io::Write;
use std::process::{Command, Output};

use httpmock::prelude::*;

fn dramp(server: &MockServer, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dramp"))
        .arg("--api-base")
        .arg(server.base_url())
        .args(args)
        .output()
        .expect("run dramp")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

#[test]
fn envs_lists_environments() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/storage/environments");
        then.status(200).json_body(serde_json::json!([
            { "id": "pd", "name": "Production", "buckets": ["raw-zone"] },
            { "id": "ds", "name": "Development", "buckets": [] }
        ]));
    });

    let out = dramp(&server, &["envs"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Production"));
    assert!(text.contains("raw-zone"));
    assert!(text.contains("Development"));
}

#[test]
fn preview_applies_filter_and_sort() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/storage/products/sales/orders/preview-latest")
            .query_param("env_id", "pd")
            .query_param("bucket_name", "raw-zone");
        then.status(200).json_body(serde_json::json!({
            "headers": ["id", "status", "amount"],
            "rows": [
                { "id": 1, "status": "active", "amount": 10 },
                { "id": 2, "status": "closed", "amount": 5 },
                { "id": 3, "status": "active", "amount": 20 }
            ]
        }));
    });

    let out = dramp(
        &server,
        &[
            "preview",
            "sales",
            "orders",
            "--env",
            "pd",
            "--bucket",
            "raw-zone",
            "--filter",
            "status=active",
            "--sort",
            "amount:desc",
            "--out",
            "csv",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));

    let lines: Vec<String> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(lines[0], "id,status,amount");
    assert_eq!(lines[1], "3,active,20");
    assert_eq!(lines[2], "1,active,10");
    assert_eq!(lines.len(), 3);
}

#[test]
fn preview_rejects_bad_page_size() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/storage/products/sales/orders/preview-latest");
        then.status(200)
            .json_body(serde_json::json!({ "headers": [], "rows": [] }));
    });

    let out = dramp(
        &server,
        &[
            "preview", "sales", "orders", "--env", "pd", "--bucket", "raw-zone",
            "--page-size", "75",
        ],
    );
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("page size"));
}

#[test]
fn edit_saves_staged_changes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/storage/products/sales/orders/preview-latest");
        then.status(200).json_body(serde_json::json!({
            "headers": ["id", "status"],
            "rows": [ { "id": 1, "status": "open" }, { "id": 2, "status": "open" } ]
        }));
    });
    let save = server.mock(|when, then| {
        when.method(POST)
            .path("/api/storage/products/save-data")
            .body_contains("\"status\":\"paid\"");
        then.status(200)
            .json_body(serde_json::json!({ "message": "Data saved for sales/orders" }));
    });

    let out = dramp(
        &server,
        &[
            "edit", "sales", "orders", "--env", "pd", "--bucket", "raw-zone",
            "--set", "0:status=paid", "--yes",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    save.assert();
    assert!(stdout(&out).contains("Data saved"));
}

#[test]
fn edit_dry_run_does_not_save() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/storage/products/sales/orders/preview-latest");
        then.status(200).json_body(serde_json::json!({
            "headers": ["id", "status"],
            "rows": [ { "id": 1, "status": "open" } ]
        }));
    });
    let save = server.mock(|when, then| {
        when.method(POST).path("/api/storage/products/save-data");
        then.status(200).json_body(serde_json::json!({ "message": "unexpected" }));
    });

    let out = dramp(
        &server,
        &[
            "edit", "sales", "orders", "--env", "pd", "--bucket", "raw-zone",
            "--set", "0:status=void", "--dry-run",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(save.hits(), 0);
    assert!(stderr(&out).contains("dry run"));
}

// One analysis payload that parses as all three step shapes: the file
// summary fields, the structure fields, and (optionally) blocking
// errors. Unknown fields are ignored per step.
fn analysis_payload(blocking: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "file_name": "orders.csv",
        "size": "0.1 MB",
        "file_type": "CSV",
        "upload_date": "27-08-2026",
        "upload_time": "09:00",
        "column_count": 2,
        "record_count": 3,
        "columns": [ { "name": "id", "kind": "Number" }, { "name": "status", "kind": "Text" } ],
        "preview": [],
        "validated_against": "pd.sales.orders",
        "blocking": blocking,
        "warnings": []
    })
}

#[test]
fn upload_happy_path() {
    let server = MockServer::start();
    let analyze = server.mock(|when, then| {
        when.method(POST).path("/api/storage/analyze");
        then.status(200).json_body(analysis_payload(serde_json::json!([])));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/api/storage/upload");
        then.status(200)
            .json_body(serde_json::json!({ "message": "File orders.csv uploaded" }));
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "id,status\n1,open").unwrap();

    let out = dramp(
        &server,
        &[
            "upload", "sales", "orders",
            file.path().to_str().unwrap(),
            "--env", "pd", "--bucket", "raw-zone", "--yes",
        ],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    // One analysis call per step, exactly.
    assert_eq!(analyze.hits(), 3);
    upload.assert();

    let text = stdout(&out);
    assert!(text.contains("orders.csv"));
    assert!(text.contains("Validation passed"));
    assert!(text.contains("File orders.csv uploaded"));
}

#[test]
fn upload_refused_on_blocking_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/storage/analyze");
        then.status(200).json_body(analysis_payload(serde_json::json!([
            "column 'extra' not present in destination schema"
        ])));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/api/storage/upload");
        then.status(200).json_body(serde_json::json!({ "message": "unexpected" }));
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "id,status,extra\n1,open,x").unwrap();

    let out = dramp(
        &server,
        &[
            "upload", "sales", "orders",
            file.path().to_str().unwrap(),
            "--env", "pd", "--bucket", "raw-zone", "--yes",
        ],
    );
    assert_eq!(out.status.code(), Some(11), "stderr: {}", stderr(&out));
    assert_eq!(upload.hits(), 0);
    assert!(stdout(&out).contains("blocking: column 'extra'"));
    assert!(stderr(&out).contains("blocked by validation"));
}

#[test]
fn search_prints_suggestions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/storage/environments");
        then.status(200).json_body(serde_json::json!([
            { "id": "pd", "name": "Production", "buckets": ["raw-zone"] }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/storage/products");
        then.status(200).json_body(serde_json::json!([
            { "name": "sales" }, { "name": "salaries" }, { "name": "inventory" }
        ]));
    });

    let out = dramp(&server, &["search", "sal", "--env", "pd"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("sales (raw-zone)"));
    assert!(text.contains("salaries (raw-zone)"));
    assert!(!text.contains("inventory"));
}

#[test]
fn pipeline_triggers_run() {
    let server = MockServer::start();
    let run = server.mock(|when, then| {
        when.method(POST)
            .path("/api/pipeline/run")
            .body_contains("\"product\":\"sales\"");
        then.status(200)
            .json_body(serde_json::json!({ "message": "Pipeline started for sales" }));
    });

    let out = dramp(&server, &["pipeline", "sales", "--project", "proj-1"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    run.assert();
    assert!(stdout(&out).contains("Pipeline started"));
}

#[test]
fn upstream_error_maps_to_exit_12() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/storage/environments");
        then.status(500).body("internal error");
    });

    let out = dramp(&server, &["envs"]);
    assert_eq!(out.status.code(), Some(12));
    assert!(stderr(&out).contains("HTTP 500"));
}
