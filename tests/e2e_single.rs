
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use support_single::{ensure_success, run_loadphase, spawn_http_server};

fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let content = fs::read_to_string(path).map_err(|err| format!("read json failed: {}", err))?;
    serde_json::from_str(&content).map_err(|err| format!("parse json failed: {}", err))
}

fn field_u64(value: &serde_json::Value, key: &str) -> Option<u64> {
    value.get(key).and_then(serde_json::Value::as_u64)
}

#[test]
fn e2e_run_exports_json_metrics() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("metrics.json");

    let output = run_loadphase(
        dir.path(),
        [
            "run",
            "-u",
            url.as_str(),
            "-c",
            "2",
            "-n",
            "6",
            "--json-metrics",
            "--json-metrics-file",
            export.to_string_lossy().as_ref(),
        ],
    )?;
    ensure_success(&output)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("TCP Connect") {
        return Err(format!("Missing summary table: {}", stdout));
    }
    let json = read_json(&export)?;
    if field_u64(&json, "total_requests") != Some(6) {
        return Err(format!("Unexpected total: {}", json));
    }
    if field_u64(&json, "failed_requests") != Some(0) {
        return Err(format!("Unexpected failures: {}", json));
    }
    Ok(())
}

#[test]
fn e2e_json_metrics_default_to_out_json() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_loadphase(
        dir.path(),
        ["run", "-u", url.as_str(), "-c", "1", "-n", "2", "-F"],
    )?;
    ensure_success(&output)?;

    let json = read_json(&dir.path().join("out.json"))?;
    if field_u64(&json, "total_requests") != Some(2) {
        return Err(format!("Unexpected total: {}", json));
    }
    Ok(())
}

#[test]
fn e2e_run_file_hits_each_path_once() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let list = dir.path().join("paths.txt");
    fs::write(&list, "/one\n\n/two\n/three\n").map_err(|err| format!("write failed: {}", err))?;

    let output = run_loadphase(
        dir.path(),
        [
            "run-file",
            "-u",
            url.as_str(),
            "-c",
            "2",
            "-f",
            list.to_string_lossy().as_ref(),
            "-F",
        ],
    )?;
    ensure_success(&output)?;

    let json = read_json(&dir.path().join("out.json"))?;
    if field_u64(&json, "total_requests") != Some(3) {
        return Err(format!("Unexpected total: {}", json));
    }
    Ok(())
}

#[test]
fn e2e_duration_mode_runs_until_deadline() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_loadphase(
        dir.path(),
        ["run", "-u", url.as_str(), "-c", "2", "-d", "500ms", "-F"],
    )?;
    ensure_success(&output)?;

    let json = read_json(&dir.path().join("out.json"))?;
    if field_u64(&json, "total_requests").is_none_or(|total| total == 0) {
        return Err(format!("Expected at least one request: {}", json));
    }
    if field_u64(&json, "elapsed_ms").is_none_or(|elapsed| elapsed < 500) {
        return Err(format!("Run ended before the deadline: {}", json));
    }
    Ok(())
}

#[test]
fn e2e_post_body_from_file() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let body = dir.path().join("body.json");
    fs::write(&body, "{\"hello\":\"world\"}").map_err(|err| format!("write failed: {}", err))?;

    let output = run_loadphase(
        dir.path(),
        [
            "run",
            "-u",
            url.as_str(),
            "-c",
            "1",
            "-n",
            "2",
            "--postfile",
            body.to_string_lossy().as_ref(),
            "--disable-keep-alive",
        ],
    )?;
    ensure_success(&output)
}

#[test]
fn e2e_config_file_supplies_options() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = format!(
        "url = \"{}\"\nconcurrency = 2\nrequests = 4\njson_metrics = true\n",
        url
    );
    fs::write(dir.path().join("loadphase.toml"), config)
        .map_err(|err| format!("write failed: {}", err))?;

    let output = run_loadphase(dir.path(), ["run"])?;
    ensure_success(&output)?;

    let json = read_json(&dir.path().join("out.json"))?;
    if field_u64(&json, "total_requests") != Some(4) {
        return Err(format!("Unexpected total: {}", json));
    }
    Ok(())
}

#[test]
fn e2e_rejects_invalid_input() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let cases: [&[&str]; 4] = [
        &["run", "-u", "http://127.0.0.1:9", "-n", "1"],
        &["run", "-u", "localhost:9", "-c", "1", "-n", "1"],
        &["run", "-u", "http://127.0.0.1:9", "-c", "1"],
        &["run", "-u", "http://127.0.0.1:9", "-c", "1", "-n", "1", "-H", "broken"],
    ];
    for args in cases {
        let output = run_loadphase(dir.path(), args)?;
        if output.status.success() {
            return Err(format!("Expected failure for {:?}", args));
        }
    }
    Ok(())
}
