//! CLI command integration tests.
//! Each test uses a temp directory via NEBULA_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nebula_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("nebula").unwrap();
    cmd.env("NEBULA_DATA_DIR", data_dir.path());
    cmd
}

fn stat_line<'a>(stdout: &'a str, key: &str) -> &'a str {
    stdout
        .lines()
        .find(|l| l.starts_with(key))
        .map(|l| l[key.len()..].trim())
        .unwrap_or_else(|| panic!("no {key} line in:\n{stdout}"))
}

#[test]
fn status_hatches_fresh_companion() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("name:       Nebula"))
        .stdout(predicate::str::contains("tier:       Baby (0 xp)"))
        .stdout(predicate::str::contains("mission:    idle"));

    assert!(dir.path().join("nebula.db").exists());

    nebula_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("nebula"));
}

#[test]
fn companion_flag_selects_companion() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["status", "--companion", "Orbit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name:       Orbit"));

    nebula_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("orbit"))
        .stdout(predicate::str::contains("nebula").not());
}

#[test]
fn config_file_names_default_companion() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("nebula.toml"), "companion = \"Vega\"\n").unwrap();
    nebula_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("name:       Vega"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("nebula.toml"),
        "[engine]\nloot_chance = 2.0\n",
    )
    .unwrap();
    nebula_cmd(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nebula.toml"));
}

#[test]
fn play_earns_experience() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["play", "comet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("you: Comet"))
        .stdout(predicate::str::is_match(r"\+(20|40|80) xp").unwrap());

    let output = nebula_cmd(&dir).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_ne!(stat_line(&stdout, "tier:"), "Baby (0 xp)");
}

#[test]
fn unknown_signal_fails() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["play", "lizard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown signal"));
}

#[test]
fn pulse_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["pulse", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside 1-10"));
}

#[test]
fn feed_empties_cargo_slot() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["feed", "coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fed Coffee, now Caffeinated"));

    nebula_cmd(&dir)
        .args(["feed", "coffee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Coffee in cargo"));
}

#[test]
fn launch_then_check_and_relaunch_rejected() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .args(["launch", "stellar nursery"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stellar Nursery, back in 600s"));

    nebula_cmd(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("in flight"));

    nebula_cmd(&dir)
        .args(["launch", "crab nebula"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid transition"));

    let output = nebula_cmd(&dir).arg("status").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stat_line(&stdout, "mission:").starts_with("Stellar Nursery"));
    assert!(stat_line(&stdout, "mood:").starts_with("Exploring"));
}

#[test]
fn rest_and_wake() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir).arg("rest").assert().success();
    nebula_cmd(&dir)
        .arg("rest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already asleep"));
    nebula_cmd(&dir)
        .arg("wake")
        .assert()
        .success()
        .stdout(predicate::str::contains("awake"));
}

#[test]
fn chat_counts_turns() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir)
        .arg("chat")
        .assert()
        .success()
        .stdout(predicate::str::contains("turn 1"));
    nebula_cmd(&dir)
        .arg("chat")
        .assert()
        .success()
        .stdout(predicate::str::contains("turn 2"));
}

#[test]
fn export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nebula.json");

    nebula_cmd(&dir).args(["play", "paper"]).assert().success();
    let before = nebula_cmd(&dir).arg("status").output().unwrap();
    let before = String::from_utf8_lossy(&before.stdout).to_string();

    nebula_cmd(&dir)
        .arg("export")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["version"], "1.0");

    nebula_cmd(&dir).arg("reset").assert().success();
    nebula_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(stat_line(&before, "tier:")));
}

#[test]
fn import_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"nope\": true}").unwrap();
    nebula_cmd(&dir)
        .arg("import")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));
}

#[test]
fn journal_shows_hatch_entry() {
    let dir = TempDir::new().unwrap();
    nebula_cmd(&dir).arg("status").assert().success();
    nebula_cmd(&dir)
        .arg("journal")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hatched with a"));
}
