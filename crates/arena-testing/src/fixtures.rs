//! Sample scenario and mock-config generation for integration tests.
//!
//! Provides small, deterministic fixtures so tests don't each hand-roll
//! TOML strings for the configuration formats `prompt-arena run` and
//! `prompt-arena mocks generate` read and write.

use anyhow::Result;
use std::path::Path;

/// A minimal single-turn scenario, one provider, one region, wired to a
/// scripted reply for the named scenario's first turn.
///
/// Writes `config.toml` and `mocks.toml` into `dir` and returns their paths.
pub fn write_greeting_fixture(dir: &Path, scenario_id: &str, provider_id: &str, reply: &str) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    let config_path = dir.join("config.toml");
    let mocks_path = dir.join("mocks.toml");

    let config = format!(
        r#"providers = ["{provider_id}"]
regions = ["us"]

[[scenarios]]
id = "{scenario_id}"

[[scenarios.turns]]
role = "user"
content = "hello"
"#
    );
    std::fs::write(&config_path, config)?;

    let mocks = format!(
        r#"[[mocks]]
provider = "{provider_id}"
scenario = "{scenario_id}"
turn_index = 0
content = "{reply}"
"#
    );
    std::fs::write(&mocks_path, mocks)?;

    Ok((config_path, mocks_path))
}

/// A two-scenario, two-provider configuration with no matching mock
/// entries, useful for exercising the "missing script entry" failure path.
pub fn write_unscripted_fixture(dir: &Path) -> Result<std::path::PathBuf> {
    let config_path = dir.join("config.toml");
    let config = r#"providers = ["alpha", "beta"]
regions = ["us", "eu"]

[[scenarios]]
id = "one"

[[scenarios.turns]]
role = "user"
content = "hi"

[[scenarios]]
id = "two"

[[scenarios.turns]]
role = "user"
content = "hi again"
"#;
    std::fs::write(&config_path, config)?;
    Ok(config_path)
}
