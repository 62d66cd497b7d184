use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "insight-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_insight<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_program-insight");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("program-insight command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_json(path: &Path, value: Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, value.to_string()).expect("descriptor should be written");
}

fn write_sample_program(root: &Path) {
    write_json(
        &root.join("app/program.json"),
        json!({"name": "app", "boot": {"package": "./pkg"}}),
    );
    write_json(
        &root.join("app/pkg/program.json"),
        json!({"name": "pkg", "mappings": {"missing": "./missing"}}),
    );
}

#[test]
fn parse_json_includes_boot_package() {
    let tmp = TempDirGuard::new("parse-json");
    write_sample_program(tmp.path());
    let root = tmp.path().display().to_string();

    let output = run_insight(["parse", "app", "--root", root.as_str(), "--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["dirpath"], json!("app"));
    assert_eq!(payload["combined"]["name"], json!("app"));
    assert_eq!(payload["combined"]["boot"]["package"], json!("app/pkg"));
    assert_eq!(
        payload["combined"]["packages"]["app/pkg"]["combined"]["name"],
        json!("pkg")
    );
    assert!(payload["raw"].get("program.json").is_some());
}

#[test]
fn parse_include_packages_warns_about_missing_packages() {
    let tmp = TempDirGuard::new("parse-missing");
    write_sample_program(tmp.path());
    let root = tmp.path().display().to_string();

    let output = run_insight([
        "parse",
        "app",
        "--root",
        root.as_str(),
        "--include-packages",
        "--json",
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    let warnings = payload["warnings"].as_array().expect("warnings array");
    assert!(warnings.iter().any(|warning| {
        warning["stage"] == json!("packages")
            && warning["message"] == json!("Package 'app/pkg/missing' was not found")
    }));

    let strict = run_insight([
        "parse",
        "app",
        "--root",
        root.as_str(),
        "--include-packages",
        "--strict-packages",
        "--json",
    ]);
    assert_success(&strict);
    let payload = parse_json_stdout(&strict);
    assert_eq!(
        payload["combined"]["packages"]["app/pkg/missing"]["dirpath"],
        json!("app/pkg/missing")
    );
}

#[test]
fn parse_text_output_summarizes_packages() {
    let tmp = TempDirGuard::new("parse-text");
    write_sample_program(tmp.path());
    let root = tmp.path().display().to_string();

    let output = run_insight(["parse", "app", "--root", root.as_str()]);
    assert_success(&output);

    let text = stdout_text(&output);
    assert!(text.contains("program-insight parse"));
    assert!(text.contains("boot package: app/pkg"));
    assert!(text.contains("packages: 1 (parsed 1, aliased 0, missing 0)"));
}

#[test]
fn parse_missing_program_fails() {
    let tmp = TempDirGuard::new("parse-fatal");
    let root = tmp.path().display().to_string();

    let output = run_insight(["parse", "nope", "--root", root.as_str()]);
    assert_failure(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn deny_errors_turns_collected_errors_into_failure() {
    let tmp = TempDirGuard::new("deny-errors");
    fs::create_dir_all(tmp.path().join("app")).expect("program dir");
    fs::write(tmp.path().join("app/program.json"), "{").expect("broken descriptor");
    let root = tmp.path().display().to_string();

    let lenient = run_insight(["parse", "app", "--root", root.as_str(), "--json"]);
    assert_success(&lenient);
    let payload = parse_json_stdout(&lenient);
    assert_eq!(payload["errors"][0]["stage"], json!("parse"));

    let denied = run_insight([
        "parse",
        "app",
        "--root",
        root.as_str(),
        "--json",
        "--deny-errors",
    ]);
    assert_failure(&denied);
}

#[test]
fn descriptor_reports_ignored_properties() {
    let tmp = TempDirGuard::new("descriptor");
    let file = tmp.path().join("program.json");
    write_json(&file, json!({"name": "app", "scripts": {}}));
    let file = file.display().to_string();

    let output = run_insight(["descriptor", file.as_str(), "--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["normalized"], json!({"name": "app"}));
    assert_eq!(
        payload["warnings"][0]["message"],
        json!("Property 'scripts' was ignored")
    );
}

#[test]
fn lookup_expands_templates_in_order() {
    let output = run_insight([
        "lookup",
        "programs/app",
        "--env",
        "PINF_MODE=prod",
        "--json",
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    let candidates: Vec<&str> = payload["candidates"]
        .as_array()
        .expect("candidates array")
        .iter()
        .filter_map(|candidate| candidate["candidate"].as_str())
        .collect();
    assert_eq!(
        candidates,
        vec!["program.json", ".program.json", "program.prod.json"]
    );
}

#[test]
fn lookup_reads_templates_from_config() {
    let tmp = TempDirGuard::new("lookup-config");
    let config = tmp.path().join("insight.toml");
    fs::write(
        &config,
        "lookup = [\"${PROGRAM_DIR}/base.json\", \"local.json\"]\n",
    )
    .expect("config written");
    let config = config.display().to_string();

    let output = run_insight(["lookup", "app", "--config", config.as_str(), "--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(
        payload["candidates"],
        json!([
            {"candidate": "app/base.json", "path": "app/app/base.json"},
            {"candidate": "local.json", "path": "app/local.json"}
        ])
    );
}

#[test]
fn bad_config_file_is_fatal() {
    let tmp = TempDirGuard::new("bad-config");
    let config = tmp.path().join("insight.toml");
    fs::write(&config, "unknown_key = 1\n").expect("config written");
    let config = config.display().to_string();

    let output = run_insight(["lookup", "app", "--config", config.as_str()]);
    assert_failure(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
