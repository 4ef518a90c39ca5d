#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RESPONSE: &str = r#"{
  "header": ["job", "test_id", "d90", "dtotal", "count", "failures", "start", "end"],
  "data": [
    ["build-linux", "test_login", 45.0, 7200.0, 10, 2, 1483228800, 1483315200],
    ["build-linux", "test_logout", 1200.0, 3600.0, 5, 5, 1483228800, 1483315200],
    ["build-mac", "test_login", 12.0, 600.0, 20, 1, 1483142400, 1483228800]
  ]
}"#;

fn write_records(dir: &Path, query: &str, body: &str) {
    fs::write(dir.join(format!("{query}.json")), body).unwrap();
}

fn testboard(cache_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("testboard").unwrap();
    cmd.env_remove("TESTBOARD_CACHE_DIR")
        .env("RUST_LOG", "warn")
        .arg("report")
        .arg("--cache-dir")
        .arg(cache_dir);
    cmd
}

#[test]
fn report_json_contains_all_leaderboards() {
    let dir = tempdir().unwrap();
    write_records(dir.path(), "durations_by_test", RESPONSE);
    let out = dir.path().join("report.json");

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .args(["--format", "json", "--out"])
        .arg(&out)
        .assert()
        .success();

    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["summary"]["total"], "35");
    assert_eq!(v["summary"]["start"], "31-Dec-2016");
    assert_eq!(v["summary"]["end"], "02-Jan-2017");

    let worst = &v["leaderboards"]["lowest_pass_rate"][0];
    assert_eq!(worst["job"], "build-linux");
    assert_eq!(worst["severity"]["label"], "53%");
    assert_eq!(worst["tests"][0]["test"], "test_logout");

    for key in ["lowest_pass_rate", "most_failing", "slowest", "longest"] {
        assert_eq!(
            v["leaderboards"][key].as_array().map(Vec::len),
            Some(2),
            "{key} should list both jobs"
        );
    }
}

#[test]
fn report_console_lists_categories() {
    let dir = tempdir().unwrap();
    write_records(dir.path(), "durations_by_test", RESPONSE);

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("35 test executions"))
        .stdout(predicate::str::contains("Lowest pass rate"))
        .stdout(predicate::str::contains("Longest (total)"))
        .stdout(predicate::str::contains("build-mac"));
}

#[test]
fn job_limit_flag_overrides_config() {
    let dir = tempdir().unwrap();
    write_records(dir.path(), "durations_by_test", RESPONSE);
    let config = dir.path().join("testboard.yaml");
    fs::write(&config, "version: 1\njob_limit: 5\ntest_limit: 1\n").unwrap();
    let out = dir.path().join("report.json");

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--job-limit", "1", "--format", "json", "--out"])
        .arg(&out)
        .assert()
        .success();

    let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let board = v["leaderboards"]["most_failing"].as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["job"], "build-linux");
    assert_eq!(board[0]["tests"].as_array().unwrap().len(), 1);
}

#[test]
fn malformed_records_exit_with_config_error() {
    let dir = tempdir().unwrap();
    write_records(
        dir.path(),
        "durations_by_test",
        r#"{"header": ["job", "test", "d90", "dtotal", "count", "failures"],
            "data": [["a", "t1", 1.0, 1.0, 3, 9]]}"#,
    );

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("malformed input"));
}

#[test]
fn missing_query_exits_with_config_error() {
    let dir = tempdir().unwrap();

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .args(["--query", "absent"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("query not found"));
}

#[test]
fn unwritable_json_output_exits_with_io_error() {
    let dir = tempdir().unwrap();
    write_records(dir.path(), "durations_by_test", RESPONSE);

    testboard(&dir.path().join("cache"))
        .arg("--records")
        .arg(dir.path())
        .args(["--format", "json", "--out"])
        .arg(dir.path().join("no-such-dir").join("report.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("io error"));
}

#[test]
fn cached_results_survive_missing_records() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("records");
    let cache = dir.path().join("cache");
    fs::create_dir(&records).unwrap();
    write_records(&records, "durations_by_test", RESPONSE);

    testboard(&cache)
        .arg("--records")
        .arg(&records)
        .assert()
        .success();
    assert!(cache
        .join("fx-test")
        .join("durations_by_test")
        .join("response.json")
        .exists());

    fs::remove_file(records.join("durations_by_test.json")).unwrap();

    testboard(&cache)
        .arg("--records")
        .arg(&records)
        .arg("--use-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("build-linux"));
}

#[test]
fn version_prints_package_version() {
    Command::cargo_bin("testboard")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
