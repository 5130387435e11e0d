use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "flexfly-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn experiment_writes_all_artifacts() {
    let dir = unique_temp_dir("cli-experiment");
    let config = write_file(
        &dir,
        "experiment.json",
        r#"
{
    "schema_version": 1,
    "name": "cli",
    "topology": { "kind": "dragonfly", "num_groups": 4, "switches_per_group": 4, "links_per_group_pair": 2 },
    "traffic": { "kind": "adversarial", "intergroup_fraction": 0.5 }
}
        "#,
    );
    let out_dir = dir.join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_experiment"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
            "--sigma",
            "0.3",
            "--quiet",
        ])
        .output()
        .expect("run experiment");
    assert!(
        output.status.success(),
        "experiment failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("topology=dfly_g4_a4_h1.5 switches=16"),
        "unexpected stdout: {stdout}"
    );

    for name in [
        "topology.txt",
        "switch_to_block.txt",
        "traffic_probability.txt",
        "routing_weights.txt",
        "summary.json",
    ] {
        assert!(out_dir.join(name).is_file(), "missing {name}");
    }

    let raw = fs::read_to_string(out_dir.join("summary.json")).expect("read summary.json");
    let v: Value = serde_json::from_str(&raw).expect("parse summary.json");
    assert_eq!(v["name"], "cli");
    assert_eq!(v["sigma"], 0.3);
    assert_eq!(v["max_intra_hops"], 2);
    assert_eq!(v["total_links"], 4 * 6 + 6 * 2);
    assert_eq!(v["inter_group_links"][0][3], 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn experiment_fails_on_bad_config() {
    let dir = unique_temp_dir("cli-experiment-bad");
    let config = write_file(
        &dir,
        "experiment.json",
        r#"{ "schema_version": 1, "topology": { "kind": "dragonfly", "num_groups": 6, "switches_per_group": 2, "links_per_group_pair": 1 }, "traffic": { "kind": "single_global_link" } }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_experiment"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            dir.join("out").to_str().unwrap(),
            "--quiet",
        ])
        .output()
        .expect("run experiment");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("experiment failed"), "stderr={stderr}");
    assert!(!dir.join("out").join("summary.json").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn toy_routing_prints_even_split() {
    let output = Command::new(env!("CARGO_BIN_EXE_toy_routing"))
        .env("RUST_LOG", "off")
        .output()
        .expect("run toy_routing");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "switchID,targetBlock,entrySwitch,weight");
    for entrance in [1, 2, 3] {
        let line = format!("0,1,{entrance},0.333333");
        assert!(lines.contains(&line.as_str()), "missing {line}");
    }
    assert!(lines.contains(&"# 0->1: Optimized"));
}
