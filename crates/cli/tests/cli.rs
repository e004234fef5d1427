use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("social-feed");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[[feeds.sources]]"));
    assert!(content.contains("utc_offset_hours = 3"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# mine\n").expect("seed config");

    let mut cmd = cargo_bin_cmd!("social-feed");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
}

#[test]
fn offline_posts_fall_back_to_placeholders() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-feed");
    let output = cmd
        .current_dir(dir.path())
        .args(["posts", "--offline", "--json"])
        .output()
        .expect("run posts");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let posts = value.as_array().expect("array of posts");
    assert_eq!(posts.len(), 2);
    for post in posts {
        assert_eq!(post["category"], "Sistem");
        assert_eq!(post["platform"], "rss");
    }
}

#[test]
fn offline_posts_filter_by_platform() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-feed");
    let output = cmd
        .current_dir(dir.path())
        .args(["posts", "--offline", "--json", "--platform", "twitter"])
        .output()
        .expect("run posts");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value.as_array().map(Vec::len), Some(0));
}

#[test]
fn posts_rejects_malformed_date() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-feed");
    cmd.current_dir(dir.path())
        .args(["posts", "--offline", "--from", "15/01/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filters"));
}

#[test]
fn offline_tags_lists_placeholder_tags() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-feed");
    let output = cmd
        .current_dir(dir.path())
        .args(["tags", "--offline", "--json"])
        .output()
        .expect("run tags");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value, serde_json::json!(["Sistem", "Bilgilendirme"]));
}

#[test]
fn offline_run_once_writes_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("out").join("feed.json");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[general]\nsnapshot_path = {:?}\n",
            snapshot.to_string_lossy()
        ),
    )
    .expect("write config");

    let mut cmd = cargo_bin_cmd!("social-feed");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["run", "--once", "--offline"])
        .assert()
        .success();

    let contents = fs::read_to_string(&snapshot).expect("read snapshot");
    let value: Value = serde_json::from_str(&contents).expect("valid json");
    assert_eq!(value["origin"], "placeholder");
    assert_eq!(value["count"], 2);
}
