mod common;

use common::{fixture_path, run_command};

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// version
// ============================================================================

#[test]
fn version_human() {
    let output = run_command(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("nightwatch "));
}

#[test]
fn version_json() {
    let output = run_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(json["name"], "nightwatch");
    assert!(json["version"].as_str().unwrap().contains('.'));
}

// ============================================================================
// stages
// ============================================================================

#[test]
fn stages_lists_the_table() {
    let output = run_command(&["stages", "--format", "json"]);
    assert!(output.status.success());
    let rows: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0]["number"], -4);
    assert_eq!(rows[0]["name"], "deal_cards");
    assert_eq!(rows[1]["terminal"], true);
}

#[test]
fn stages_uses_configured_timings() {
    let config = fixture_path("config.yaml");
    let output = run_command(&["stages", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    let out = stdout(&output);
    let vote = out.lines().find(|l| l.contains(" vote ")).unwrap();
    assert!(vote.contains("45s"), "{vote}");
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_accepts_a_good_file() {
    let config = fixture_path("config.yaml");
    let output = run_command(&["validate", config.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("valid (0 warnings)"));
}

#[test]
fn validate_strict_fails_on_warnings() {
    let config = fixture_path("warning_config.yaml");
    let lenient = run_command(&["validate", config.to_str().unwrap()]);
    assert!(lenient.status.success());

    let strict = run_command(&["validate", "--strict", config.to_str().unwrap()]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn validate_rejects_invalid_file() {
    let config = fixture_path("invalid_config.yaml");
    let output = run_command(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_once_advances_due_games_and_writes_them_back() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("after.json");
    let events = dir.path().join("events.jsonl");
    let games = fixture_path("games.json");

    let output = run_command(&[
        "--quiet",
        "run",
        "--games",
        games.to_str().unwrap(),
        "--once",
        "--output",
        snapshot.to_str().unwrap(),
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let after: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    let ids: Vec<&str> = after.iter().map(|g| g["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["club-night", "waiting"], "abandoned game is deleted");
    assert_eq!(after[0]["stage"], 3);
    assert_eq!(after[1]["stage"], 0);

    // Chat traffic goes to stdout as JSON lines
    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines.iter().any(|l| l["chat"] == -100_200_400_i64));

    let events = std::fs::read_to_string(&events).unwrap();
    assert!(events.lines().next().unwrap().contains("EngineStarted"));
    assert!(events.lines().last().unwrap().contains("EngineStopped"));
}

#[test]
fn run_with_missing_games_file_fails() {
    let output = run_command(&["--quiet", "run", "--games", "/nonexistent/games.json", "--once"]);
    assert_eq!(output.status.code(), Some(3));
}
