use std::path::PathBuf;
use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pv-stringer"))
        .args(args)
        .output()
        .expect("pv-stringer process should run")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pv-stringer-{}-{name}", std::process::id()))
}

#[test]
fn demo_project_runs_and_writes_outputs() {
    let json_out = temp_path("result.json");
    let csv_out = temp_path("strings.csv");
    let output = run_cli(&[
        "--input",
        "projects/demo.json",
        "--json-out",
        json_out.to_str().unwrap_or_default(),
        "--csv-out",
        csv_out.to_str().unwrap_or_default(),
    ]);

    assert!(
        output.status.success(),
        "demo run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("--- Stringing Summary ---"));
    assert!(stdout.contains("Panels stringed:       33 / 34"));
    assert!(stdout.contains("--- Suggestions ---"));

    let json = std::fs::read_to_string(&json_out).expect("JSON output should exist");
    let value: serde_json::Value = serde_json::from_str(&json).expect("JSON output should parse");
    assert_eq!(value["strings"].as_array().map(Vec::len), Some(4));
    assert_eq!(value["metadata"]["inverter_model"], "demo-5k");

    let csv = std::fs::read_to_string(&csv_out).expect("CSV output should exist");
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.lines().nth(3).is_some_and(|l| l.starts_with("s3,inv1,mppt2,2,9,")));

    std::fs::remove_file(&json_out).ok();
    std::fs::remove_file(&csv_out).ok();
}

#[test]
fn frontend_flag_emits_nested_shape() {
    let json_out = temp_path("nested.json");
    let output = run_cli(&[
        "--input",
        "projects/demo.json",
        "--frontend",
        "--json-out",
        json_out.to_str().unwrap_or_default(),
    ]);
    assert!(output.status.success());

    let json = std::fs::read_to_string(&json_out).expect("JSON output should exist");
    let value: serde_json::Value = serde_json::from_str(&json).expect("JSON output should parse");
    assert_eq!(value["inverters"][0]["roof_planes"][0]["roof_plane_id"], "1");
    assert!(value.get("strings").is_none());
    std::fs::remove_file(&json_out).ok();
}

#[test]
fn incompatible_inverter_fails_with_message() {
    let demo = std::fs::read_to_string("projects/demo.json").expect("demo project should exist");
    let input = temp_path("incompatible.json");
    let patched = demo.replace("\"startUpVoltage\": 100", "\"startUpVoltage\": 400");
    std::fs::write(&input, patched).expect("temp input should be writable");

    let output = run_cli(&["--input", input.to_str().unwrap_or_default()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("min 11"), "unexpected stderr: {stderr}");
    std::fs::remove_file(&input).ok();
}

#[test]
fn unknown_preset_is_rejected() {
    let output = run_cli(&["--input", "projects/demo.json", "--preset", "bogus"]);
    assert!(!output.status.success());
}
