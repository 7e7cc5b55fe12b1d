#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn transit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("transit").unwrap();
    cmd.current_dir(dir.path()).env("TRANSIT_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    transit(dir).arg("init").assert().success();
}

fn json_out(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

fn route_stop_names(dir: &TempDir, route: &str) -> Vec<String> {
    let route = json_out(transit(dir).args(["route", "show", route]));
    route["stops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stop_name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// transit init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_data_files() {
    let dir = TempDir::new().unwrap();
    transit(&dir)
        .args(["init", "--project", "metro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metro"));

    assert!(dir.path().join(".transit/config.yaml").exists());
    assert!(dir.path().join(".transit/stops.json").exists());
    assert!(dir.path().join(".transit/routes.json").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    transit(&dir).arg("init").assert().success();
    transit(&dir).arg("init").assert().success();
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    transit(&dir)
        .args(["stop", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// transit stop
// ---------------------------------------------------------------------------

#[test]
fn stop_add_list_show_remove() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir)
        .args([
            "stop", "add", "Oak Street", "--id", "S1", "--location", "North", "--lat", "47.61",
            "--lon", "-122.33",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created stop 'Oak Street' (S1)"));

    transit(&dir)
        .args(["stop", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Oak Street"))
        .stdout(predicate::str::contains("-122.33"));

    let stop = json_out(transit(&dir).args(["stop", "show", "S1"]));
    assert_eq!(stop["location"], "North");

    transit(&dir)
        .args(["stop", "remove", "S1"])
        .assert()
        .success();
    transit(&dir)
        .args(["stop", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stops."));
}

#[test]
fn stop_add_rejects_duplicate_name() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir).args(["stop", "add", "Depot"]).assert().success();
    transit(&dir)
        .args(["stop", "add", "  depot "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn stop_add_rejects_id_in_use() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir)
        .args(["stop", "add", "Oak", "--id", "S1"])
        .assert()
        .success();
    transit(&dir)
        .args(["stop", "add", "Elm", "--id", "S1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stop id 'S1' is already in use"));

    let stop = json_out(transit(&dir).args(["stop", "show", "S1"]));
    assert_eq!(stop["stop_name"], "Oak");
}

// ---------------------------------------------------------------------------
// transit route
// ---------------------------------------------------------------------------

#[test]
fn route_build_and_reorder() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir).args(["route", "create", "Line 7"]).assert().success();
    let a = json_out(transit(&dir).args(["route", "add-stop", "Line 7", "A"]));
    let b = json_out(transit(&dir).args(["route", "add-stop", "Line 7", "B"]));
    transit(&dir)
        .args(["route", "add-stop", "Line 7", "Start", "--position", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at position 0"));
    assert_eq!(route_stop_names(&dir, "Line 7"), vec!["Start", "A", "B"]);

    let start_id = json_out(transit(&dir).args(["route", "show", "line 7"]))["stops"][0]["stop_id"]
        .as_str()
        .unwrap()
        .to_string();
    let a_id = a["stop"]["stop_id"].as_str().unwrap().to_string();
    let b_id = b["stop"]["stop_id"].as_str().unwrap().to_string();
    transit(&dir)
        .args(["route", "reorder", "Line 7", b_id.as_str(), a_id.as_str(), start_id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("B, A, Start"));

    transit(&dir)
        .args(["route", "update-stop", "Line 7", "1", "--name", "Alpha"])
        .assert()
        .success();
    transit(&dir)
        .args(["route", "remove-stop", "Line 7", "0"])
        .assert()
        .success();
    assert_eq!(route_stop_names(&dir, "Line 7"), vec!["Alpha", "Start"]);
}

#[test]
fn route_assign_registered_stop() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir)
        .args(["stop", "add", "Depot", "--id", "S1"])
        .assert()
        .success();
    transit(&dir).args(["route", "create", "Line 1"]).assert().success();
    transit(&dir)
        .args(["route", "assign", "Line 1", "S1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned 'Depot'"));
    transit(&dir)
        .args(["route", "assign", "Line 1", "S1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already contains stop 'Depot'"));
}

#[test]
fn route_position_out_of_bounds_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir).args(["route", "create", "Line 1"]).assert().success();
    transit(&dir)
        .args(["route", "add-stop", "Line 1", "A", "--position", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));
}

// ---------------------------------------------------------------------------
// transit shell
// ---------------------------------------------------------------------------

#[test]
fn shell_undo_reverses_changes_in_order() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir)
        .arg("shell")
        .write_stdin(
            "route create \"Line 7\"\n\
             route add-stop \"Line 7\" A\n\
             route add-stop \"Line 7\" B\n\
             undo\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Undid stop_added."));

    assert_eq!(route_stop_names(&dir, "Line 7"), vec!["A"]);
}

#[test]
fn shell_undo_on_empty_history() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = transit(&dir)
        .args(["shell", "--json"])
        .write_stdin("undo\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        result,
        serde_json::json!({"success": false, "message": "No actions to undo"})
    );
}

#[test]
fn shell_undo_restores_deleted_route() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir).args(["route", "create", "Loop"]).assert().success();
    transit(&dir).args(["route", "add-stop", "Loop", "A"]).assert().success();
    transit(&dir).args(["route", "add-stop", "Loop", "B"]).assert().success();
    let before = json_out(transit(&dir).args(["route", "show", "Loop"]));

    transit(&dir)
        .arg("shell")
        .write_stdin("route delete Loop\nhistory\nundo\nexit\nroute delete Loop\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("route_deleted"));

    let after = json_out(transit(&dir).args(["route", "show", "Loop"]));
    assert_eq!(after, before);
}

#[test]
fn shell_history_does_not_survive_sessions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir).args(["stop", "add", "Depot"]).assert().success();
    transit(&dir)
        .arg("shell")
        .write_stdin("undo\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No actions to undo"));

    transit(&dir)
        .args(["stop", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Depot"));
}

#[test]
fn shell_keeps_going_after_errors() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    transit(&dir)
        .arg("shell")
        .write_stdin("route show Nowhere\nbogus\nroute create Loop\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("route 'Nowhere' not found"))
        .stdout(predicate::str::contains("Created route 'Loop'"));
}
