use crate::{Error, Provider, Result};
use arena_types::{Cost, Message, Params, Role, ScenarioId, TokenUsage};
use chrono::Utc;
use std::collections::BTreeMap;

/// `Params.extra` key the Conversation Runner sets on every provider call so
/// a `MockProvider` can key its script table by scenario (spec §9: scripted
/// table keyed by `(scenarioID, turnIndex)`). Real providers ignore it —
/// that's exactly what the `extra` bag is for.
pub const SCENARIO_HINT_KEY: &str = "scenario_id";

/// A scripted reply, keyed by `(scenario, turn index)`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReply {
    pub content: String,
    pub token_usage: TokenUsage,
}

impl ScriptedReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), token_usage: TokenUsage::default() }
    }
}

/// Deterministic provider driven by a table of scripted responses.
///
/// `complete` is a pure function of `(history, params)`: the turn index is
/// the count of prior assistant messages in `history`, and the scenario is
/// read from `params.extra["scenario_id"]` if present, else a single
/// default bucket. No clocks, no RNG, no interior mutable counters — two
/// calls with the same history and params always produce the same reply.
pub struct MockProvider {
    name: String,
    script: BTreeMap<(ScenarioId, usize), ScriptedReply>,
    fallback: Option<ScriptedReply>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), script: BTreeMap::new(), fallback: None }
    }

    pub fn with_reply(mut self, scenario: ScenarioId, turn_index: usize, reply: ScriptedReply) -> Self {
        self.script.insert((scenario, turn_index), reply);
        self
    }

    pub fn with_fallback(mut self, reply: ScriptedReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub fn lookup(&self, scenario: &ScenarioId, turn_index: usize) -> Option<&ScriptedReply> {
        self.script
            .get(&(scenario.clone(), turn_index))
            .or(self.fallback.as_ref())
    }

    fn turn_index(history: &[Message]) -> usize {
        history.iter().filter(|m| m.role == Role::Assistant).count()
    }

    fn scenario_from(params: &Params) -> ScenarioId {
        match params.extra.get(SCENARIO_HINT_KEY).and_then(|v| v.as_str()) {
            Some(s) => ScenarioId::from(s),
            None => ScenarioId::from("default"),
        }
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, history: &[Message], params: &Params) -> Result<Message> {
        let scenario = Self::scenario_from(params);
        let turn_index = Self::turn_index(history);
        let reply = self.lookup(&scenario, turn_index).ok_or_else(|| {
            Error::Permanent(format!(
                "no scripted reply for scenario={scenario} turn_index={turn_index}"
            ))
        })?;

        let mut message = Message::new(Role::Assistant, reply.content.clone(), Utc::now());
        message.token_usage = Some(reply.token_usage);
        Ok(message)
    }

    fn cost(&self, _usage: TokenUsage) -> Cost {
        Cost::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params_for(scenario: &str) -> Params {
        let mut params = Params::new();
        params.extra.insert(SCENARIO_HINT_KEY.to_string(), json!(scenario));
        params
    }

    #[tokio::test]
    async fn complete_replies_by_turn_index_derived_from_history() {
        let scenario = ScenarioId::from("greeting");
        let provider = MockProvider::new("mock")
            .with_reply(scenario.clone(), 0, ScriptedReply::new("hello there"))
            .with_reply(scenario.clone(), 1, ScriptedReply::new("goodbye"));
        let params = params_for("greeting");

        let first = provider.complete(&[], &params).await.unwrap();
        assert_eq!(first.content, "hello there");

        let history = vec![first];
        let second = provider.complete(&history, &params).await.unwrap();
        assert_eq!(second.content, "goodbye");
    }

    #[tokio::test]
    async fn same_history_and_params_yields_identical_reply() {
        let scenario = ScenarioId::from("s");
        let provider = MockProvider::new("mock").with_reply(scenario, 0, ScriptedReply::new("x"));
        let params = params_for("s");
        let a = provider.complete(&[], &params).await.unwrap();
        let b = provider.complete(&[], &params).await.unwrap();
        assert_eq!(a.content, b.content);
    }

    #[tokio::test]
    async fn missing_script_entry_is_a_permanent_error() {
        let provider = MockProvider::new("mock");
        let params = params_for("unscripted");
        let err = provider.complete(&[], &params).await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn fallback_reply_covers_unscripted_turns() {
        let provider = MockProvider::new("mock").with_fallback(ScriptedReply::new("default"));
        let params = params_for("anything");
        let msg = provider.complete(&[], &params).await.unwrap();
        assert_eq!(msg.content, "default");
    }

    #[tokio::test]
    async fn missing_scenario_hint_falls_back_to_default_bucket() {
        let provider = MockProvider::new("mock")
            .with_reply(ScenarioId::from("default"), 0, ScriptedReply::new("untagged"));
        let params = Params::new();
        let msg = provider.complete(&[], &params).await.unwrap();
        assert_eq!(msg.content, "untagged");
    }
}
