//! Binary-level tests for the `bumpscope` command.

mod common;

use assert_cmd::Command;
use common::TestRepo;
use tempfile::TempDir;

fn bumpscope() -> Command {
    let mut cmd = Command::cargo_bin("bumpscope").unwrap();
    cmd.env_remove("BUMPSCOPE_CONFIG").env("NO_COLOR", "1");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_analyzers_lists_builtins() {
    let out = stdout_of(bumpscope().arg("analyzers"));
    for name in ["cli", "migrations", "openapi", "web_routes"] {
        assert!(out.contains(name), "missing {name} in:\n{out}");
    }
    assert!(out.contains("Track changes in Flask and FastAPI routes."));
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    stdout_of(bumpscope().current_dir(dir.path()).arg("init"));
    let written = std::fs::read_to_string(dir.path().join("bumpscope.toml")).unwrap();
    assert!(written.contains("[project]"));

    bumpscope()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure();
    bumpscope()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_decide_json_output() {
    let repo = TestRepo::new();
    repo.write("bumpscope.toml", "[project]\npublic_roots = [\"pkg\"]\n");
    repo.write("pkg/api.py", "def foo(x):\n    pass\n");
    repo.commit("initial");
    repo.write("pkg/api.py", "def foo(x, timeout=None):\n    pass\n");
    repo.commit("add timeout");

    let out = stdout_of(
        bumpscope()
            .current_dir(repo.path())
            .args(["decide", "--format", "json"]),
    );
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["level"], "minor");
    assert_eq!(value["confidence"], 1.0);
    assert_eq!(value["reasons"], serde_json::json!(["Added optional param 'timeout'"]));
    assert_eq!(value["impacts"][0]["symbol"], "api:foo");
}

#[test]
fn test_decide_text_without_changes() {
    let repo = TestRepo::new();
    repo.write("pkg/api.py", "def foo():\n    pass\n");
    repo.commit("initial");
    repo.write("CHANGELOG.md", "notes\n");
    repo.commit("docs");

    let out = stdout_of(bumpscope().current_dir(repo.path()).arg("decide"));
    assert!(out.contains("Suggested bump: none"));
    assert!(out.contains("(no API-impacting changes detected)"));
}

#[test]
fn test_decide_unknown_analyzer_fails() {
    let repo = TestRepo::new();
    repo.write("pkg/api.py", "def foo():\n    pass\n");
    repo.commit("initial");
    repo.write("pkg/api.py", "def foo(x=1):\n    pass\n");
    repo.commit("second");

    bumpscope()
        .current_dir(repo.path())
        .args(["decide", "--enable-analyzer", "graphql"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_is_reported() {
    let repo = TestRepo::new();
    repo.write("bumpscope.toml", "[rules]\nreturn_type_change = \"warn\"\n");
    repo.write("pkg/api.py", "def foo():\n    pass\n");
    repo.commit("initial");
    repo.write("pkg/api.py", "def foo(x=1):\n    pass\n");
    repo.commit("second");

    let output = bumpscope()
        .current_dir(repo.path())
        .arg("decide")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("return_type_change"));
}
