#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const RESULTS: &str = "\
1 [2]: t1 t2
2 [1]: t1
3 [0]:
4 [2]: t1 t3
5 [1]: t3
6 [2]: t1 t2
";

struct Workspace {
    dir: TempDir,
    config: PathBuf,
    input: PathBuf,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, config).expect("write config");
        let input = dir.path().join("results.txt");
        fs::write(&input, RESULTS).expect("write results");
        Self {
            dir,
            config: config_path,
            input,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cli(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("cli");
        cmd.env("DSGRAPH_CONFIG", &self.config)
            .env_remove("RUST_LOG")
            .arg("--quiet");
        cmd
    }

    fn generate(&self, output: &Path) {
        self.cli()
            .args(["generate", "--tests", "3", "--bias", "1"])
            .arg(&self.input)
            .arg(output)
            .assert()
            .success();
    }
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn generate_emits_json_report() {
    let ws = Workspace::new("");
    let output = ws.path("out.dat");
    let out = ws
        .cli()
        .args(["--format", "json", "generate", "--tests", "3", "--bias", "1"])
        .args(["--strategy", "top-down"])
        .arg(&ws.input)
        .arg(&output)
        .assert()
        .success()
        .get_output()
        .clone();
    let json = json_stdout(&out);
    assert_eq!(json["strategy"], "top-down");
    assert_eq!(json["summary"]["units"], 6);
    assert_eq!(json["summary"]["killed"], 5);
    assert_eq!(json["summary"]["clusters"], 5);
    assert_eq!(json["summary"]["edges"], 5);
    assert_eq!(json["efficiency"]["unit_pairs"], 15);
    assert!(json["efficiency"]["comparisons"].is_number());
    assert!(json["timings_ms"]["link"].is_number());
    assert!(output.is_file());
}

#[test]
fn generate_defaults_output_next_to_input() {
    let ws = Workspace::new("");
    ws.cli()
        .args(["generate", "--tests", "3", "--bias", "1"])
        .arg(&ws.input)
        .assert()
        .success();
    assert!(ws.path("results.txt_graph.dat").is_file());
}

#[test]
fn generate_reads_defaults_from_config() {
    let ws = Workspace::new(
        "[generate]\ntests = 3\nbias = 1\nstrategy = \"bottom-up\"\noutput_suffix = \".dsg\"\n",
    );
    let out = ws
        .cli()
        .args(["--format", "json", "generate"])
        .arg(&ws.input)
        .assert()
        .success()
        .get_output()
        .clone();
    let json = json_stdout(&out);
    assert_eq!(json["strategy"], "bottom-up");
    assert_eq!(json["tests"], 3);
    assert!(ws.path("results.txt.dsg").is_file());
}

#[test]
fn generate_requires_test_count() {
    let ws = Workspace::new("");
    ws.cli()
        .arg("generate")
        .arg(&ws.input)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn stats_reports_file_and_counts() {
    let ws = Workspace::new("");
    let graph = ws.path("graph.dat");
    ws.generate(&graph);
    let out = ws
        .cli()
        .args(["--format", "json", "stats"])
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    let json = json_stdout(&out);
    assert_eq!(
        json["size_bytes"].as_u64(),
        Some(fs::metadata(&graph).unwrap().len())
    );
    assert_eq!(json["summary"]["levels"], 3);
    assert_eq!(json["summary"]["roots"], 2);
    assert!(json["efficiency"]["comparisons"].is_null());
}

#[test]
fn verify_full_succeeds() {
    let ws = Workspace::new("");
    let graph = ws.path("graph.dat");
    ws.generate(&graph);
    let out = ws
        .cli()
        .args(["--format", "json", "verify", "--level", "full"])
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    let json = json_stdout(&out);
    assert_eq!(json["success"], true);
    assert_eq!(json["level"], "full");
}

#[test]
fn verify_rejects_truncated_file() {
    let ws = Workspace::new("");
    let graph = ws.path("graph.dat");
    ws.generate(&graph);
    let bytes = fs::read(&graph).expect("read graph");
    fs::write(&graph, &bytes[..bytes.len() - 3]).expect("truncate");
    ws.cli().arg("verify").arg(&graph).assert().failure();
}

#[test]
fn dump_prints_levels_edges_and_index() {
    let ws = Workspace::new("");
    let graph = ws.path("graph.dat");
    ws.generate(&graph);
    let out = ws
        .cli()
        .arg("dump")
        .arg(&graph)
        .assert()
        .success()
        .get_output()
        .clone();
    let text = String::from_utf8(out.stdout).expect("utf8");
    assert!(text.starts_with("Number of units: 6\nNumber of vertices: 5\n"));
    assert!(text.contains("\t0 [110] --> 1;\n"));
    assert!(text.contains("\t3 [101] --> 1; 4;\n"));
    assert!(text.contains("Index:\n\t1\t0\n"));
    assert!(text.contains("\t6\t0\n"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let ws = Workspace::new("");
    cargo_bin_cmd!("cli")
        .arg("--config")
        .arg(ws.path("absent.toml"))
        .args(["generate", "--tests", "3"])
        .arg(&ws.input)
        .assert()
        .failure();
}
