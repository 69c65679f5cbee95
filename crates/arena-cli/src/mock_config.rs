//! Scripted response table shared by `run --mock-provider` and
//! `mocks generate`. Stored as TOML so it reads like the rest of this
//! tool's configuration surface.

use arena_providers::{MockProvider, ProviderRegistry, ScriptedReply};
use arena_types::{ProviderId, Role, RunResult, ScenarioId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// `"*"` in the `provider` field of a `MockEntry` matches every provider
/// that doesn't have a more specific entry for the same scenario/turn.
pub const ANY_PROVIDER: &str = "*";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MockConfig {
    #[serde(default)]
    pub mocks: Vec<MockEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockEntry {
    pub provider: String,
    pub scenario: String,
    pub turn_index: usize,
    pub content: String,
}

impl MockConfig {
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let mut mocks = self.mocks.clone();
        mocks.sort();
        let text = toml::to_string_pretty(&MockConfig { mocks })?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Builds a `MockProvider` per provider ID named in `providers`, scripted
    /// from this table. Entries under [`ANY_PROVIDER`] are applied to every
    /// provider that has no more specific entry for the same key.
    pub fn build_registry(&self, providers: &[ProviderId]) -> ProviderRegistry {
        let mut by_provider: HashMap<&str, Vec<&MockEntry>> = HashMap::new();
        let mut wildcard: Vec<&MockEntry> = Vec::new();
        for entry in &self.mocks {
            if entry.provider == ANY_PROVIDER {
                wildcard.push(entry);
            } else {
                by_provider.entry(entry.provider.as_str()).or_default().push(entry);
            }
        }

        let mut registry = ProviderRegistry::new();
        for provider_id in providers {
            let mut provider = MockProvider::new(provider_id.as_str());
            for entry in wildcard.iter().chain(by_provider.get(provider_id.as_str()).into_iter().flatten()) {
                provider = provider.with_reply(
                    ScenarioId::from(entry.scenario.as_str()),
                    entry.turn_index,
                    ScriptedReply::new(entry.content.clone()),
                );
            }
            registry.register(provider_id.clone(), std::sync::Arc::new(provider));
        }
        registry
    }
}

/// Derives a [`MockConfig`] from previously recorded runs: every assistant
/// message is replayed at the turn index `MockProvider` itself would have
/// derived for it (the count of assistant messages already ahead of it in
/// the transcript), so a config generated this way replays byte-for-byte
/// against the same scenario script.
pub fn generate_from_results(
    results: &[RunResult],
    per_scenario: bool,
    scenario_filter: &[String],
    provider_filter: &[String],
) -> MockConfig {
    let mut mocks = Vec::new();
    for result in results {
        if !scenario_filter.is_empty() && !scenario_filter.contains(&result.scenario_id.to_string()) {
            continue;
        }
        if !provider_filter.is_empty() && !provider_filter.contains(&result.provider_id.to_string()) {
            continue;
        }

        let provider = if per_scenario { ANY_PROVIDER.to_string() } else { result.provider_id.to_string() };
        let mut assistant_turn_index = 0usize;
        for message in &result.messages {
            if message.role != Role::Assistant {
                continue;
            }
            mocks.push(MockEntry {
                provider: provider.clone(),
                scenario: result.scenario_id.to_string(),
                turn_index: assistant_turn_index,
                content: message.content.clone(),
            });
            assistant_turn_index += 1;
        }
    }

    mocks.sort();
    mocks.dedup();
    MockConfig { mocks }
}

pub fn merge(base: &mut MockConfig, incoming: MockConfig) {
    for entry in incoming.mocks {
        if !base.mocks.contains(&entry) {
            base.mocks.push(entry);
        }
    }
}
