//! End-to-end tests for the `prompt-arena` binary: `run`, `render`, and
//! `mocks generate` driven entirely through scripted mock providers, since
//! real provider credentials are out of this tool's scope.

use arena_testing::TestWorld;
use assert_cmd::Command;
use predicates::str::contains;

const GREETING_CONFIG: &str = r#"
providers = ["mock-a"]
regions = ["us"]

[[scenarios]]
id = "greeting"

[[scenarios.turns]]
role = "user"
content = "hello"
"#;

const GREETING_MOCKS: &str = r#"
[[mocks]]
provider = "mock-a"
scenario = "greeting"
turn_index = 0
content = "hi there"
"#;

#[test]
fn run_without_mock_provider_flag_is_a_usage_error() {
    let world = TestWorld::new(GREETING_CONFIG).unwrap();
    let mut cmd = Command::cargo_bin("prompt-arena").unwrap();
    cmd.arg("run").arg("--config").arg(world.root().join("config.toml"));
    cmd.assert().failure().code(2).stderr(contains("mock-provider"));
}

#[test]
fn run_with_scripted_reply_succeeds_and_writes_json_report() {
    let world = TestWorld::new(GREETING_CONFIG).unwrap().with_mocks(GREETING_MOCKS).unwrap();
    let mut cmd = world.run_command().unwrap();
    cmd.args(["--format", "json"]);
    cmd.assert().success().code(0);

    let results = world.read_results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, arena_types::RunStatus::Succeeded);
}

#[test]
fn run_with_missing_script_entry_fails_the_run() {
    let world = TestWorld::new(GREETING_CONFIG).unwrap();
    let mut cmd = world.run_command().unwrap();
    cmd.args(["--format", "json"]);
    cmd.assert().failure().code(1);

    let results = world.read_results().unwrap();
    assert_eq!(results[0].status, arena_types::RunStatus::Failed);
}

#[test]
fn render_regenerates_reports_from_a_prior_run() {
    let world = TestWorld::new(GREETING_CONFIG).unwrap().with_mocks(GREETING_MOCKS).unwrap();
    world.run_command().unwrap().args(["--format", "json"]).assert().success();

    let mut render_cmd = Command::cargo_bin("prompt-arena").unwrap();
    render_cmd
        .arg("render")
        .arg("--input")
        .arg(world.out_dir())
        .arg("--format")
        .arg("markdown");
    render_cmd.assert().success();
    assert!(world.out_dir().join("report.md").exists());
}

#[test]
fn mocks_generate_round_trips_a_prior_run() {
    let world = TestWorld::new(GREETING_CONFIG).unwrap().with_mocks(GREETING_MOCKS).unwrap();
    world.run_command().unwrap().args(["--format", "json"]).assert().success();

    let generated_path = world.root().join("generated.toml");
    let mut mocks_cmd = Command::cargo_bin("prompt-arena").unwrap();
    mocks_cmd
        .arg("mocks")
        .arg("generate")
        .arg("--input")
        .arg(world.out_dir())
        .arg("--output")
        .arg(&generated_path);
    mocks_cmd.assert().success();

    let generated = std::fs::read_to_string(&generated_path).unwrap();
    assert!(generated.contains("\"hi there\""));
}
