use crate::error::{Error, Result};
use arena_types::{AssertionDef, ProviderId, Region, Scenario, ScenarioId, SelfPlayBinding, TurnDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// TOML configuration root: scenarios, the provider/region matrix, and
/// output defaults. Configuration file parsing and schema validation
/// proper are out of scope per spec §1 ("external collaborators"); this is
/// the thin loader `arena-sdk` needs to turn a file into the Planner's
/// input types.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArenaConfig {
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub id: String,
    pub turns: Vec<TurnDefinition>,
    #[serde(default)]
    pub conversation_assertions: Vec<AssertionDef>,
    #[serde(default)]
    pub self_play: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub output: OutputDefaults,
    /// Legacy backwards-compatibility keys, kept flat at `defaults.*`
    /// rather than nested under `output` (spec §6.3, precedence tier 3).
    #[serde(default)]
    pub html_report: Option<String>,
    #[serde(default)]
    pub markdown_report: Option<String>,
    #[serde(default)]
    pub junit_report: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputDefaults {
    #[serde(default)]
    pub html: Option<FileOutput>,
    #[serde(default)]
    pub markdown: Option<FileOutput>,
    #[serde(default)]
    pub junit: Option<FileOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileOutput {
    pub file: Option<String>,
}

impl ArenaConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ArenaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn scenarios_typed(&self) -> Result<Vec<Scenario>> {
        self.scenarios.iter().map(ScenarioConfig::to_scenario).collect()
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|s| ProviderId::from(s.as_str())).collect()
    }

    pub fn region_list(&self) -> Vec<Region> {
        if self.regions.is_empty() {
            vec![Region::from("default")]
        } else {
            self.regions.iter().map(|s| Region::from(s.as_str())).collect()
        }
    }

    /// Resolves the output path for one format under the precedence order
    /// in spec §6.3: explicit CLI flag, then `defaults.output.<fmt>.file`,
    /// then the named legacy key, then a generated default inside `out_dir`.
    pub fn resolve_output_path(
        &self,
        cli_flag: Option<&str>,
        structured: Option<&FileOutput>,
        legacy: Option<&str>,
        out_dir: &Path,
        extension: &str,
        timestamp: &str,
    ) -> PathBuf {
        if let Some(flag) = cli_flag {
            return PathBuf::from(flag);
        }
        if let Some(file) = structured.and_then(|o| o.file.as_deref()) {
            return out_dir.join(file);
        }
        if let Some(file) = legacy {
            return out_dir.join(file);
        }
        out_dir.join(format!("report-{timestamp}.{extension}"))
    }
}

impl ScenarioConfig {
    fn to_scenario(&self) -> Result<Scenario> {
        let self_play: Option<SelfPlayBinding> = self.self_play.as_ref().map(|binding| {
            binding
                .iter()
                .map(|(role, provider)| (role.clone(), ProviderId::from(provider.as_str())))
                .collect()
        });

        Ok(Scenario {
            id: ScenarioId::from(self.id.as_str()),
            turns: self.turns.clone(),
            conversation_assertions: self.conversation_assertions.clone(),
            self_play,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_scenarios_providers_and_regions() {
        let toml_text = r#"
providers = ["mock-a", "mock-b"]
regions = ["us", "eu"]

[[scenarios]]
id = "greeting"
turns = [{ role = "user", content = "hi" }, { role = "assistant" }]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_text.as_bytes()).unwrap();

        let config = ArenaConfig::load_from(file.path()).unwrap();
        assert_eq!(config.providers, vec!["mock-a", "mock-b"]);
        assert_eq!(config.regions, vec!["us", "eu"]);

        let scenarios = config.scenarios_typed().unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].turns.len(), 2);
    }

    #[test]
    fn empty_regions_default_to_a_single_default_region() {
        let config = ArenaConfig::default();
        assert_eq!(config.region_list(), vec![Region::from("default")]);
    }

    #[test]
    fn output_path_precedence_prefers_cli_flag_over_everything() {
        let config = ArenaConfig::default();
        let path = config.resolve_output_path(
            Some("/explicit/path.html"),
            Some(&FileOutput { file: Some("ignored.html".into()) }),
            Some("ignored-legacy.html"),
            Path::new("/out"),
            "html",
            "ts",
        );
        assert_eq!(path, PathBuf::from("/explicit/path.html"));
    }

    #[test]
    fn output_path_falls_back_to_structured_then_legacy_then_generated() {
        let config = ArenaConfig::default();
        let structured = config.resolve_output_path(
            None,
            Some(&FileOutput { file: Some("structured.html".into()) }),
            Some("legacy.html"),
            Path::new("/out"),
            "html",
            "ts",
        );
        assert_eq!(structured, PathBuf::from("/out/structured.html"));

        let legacy = config.resolve_output_path(None, None, Some("legacy.html"), Path::new("/out"), "html", "ts");
        assert_eq!(legacy, PathBuf::from("/out/legacy.html"));

        let generated = config.resolve_output_path(None, None, None, Path::new("/out"), "html", "ts");
        assert_eq!(generated, PathBuf::from("/out/report-ts.html"));
    }
}
