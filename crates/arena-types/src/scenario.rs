use crate::{AssertionDef, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One turn in a scenario's script. Either literal content (for
/// `system`/`user`/`assistant`) or a self-play persona driving `turns`
/// sub-turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnDefinition {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<AssertionDef>,
    #[serde(default)]
    pub tool_calls_allowed: bool,
}

impl TurnDefinition {
    pub fn is_self_play(&self) -> bool {
        self.persona.is_some() && self.turns.is_some()
    }

    pub fn is_literal(&self, role: &str) -> bool {
        matches!(role, "system" | "user") && self.content.is_some()
    }
}

/// Binding from a self-play role name to the provider that drives it.
pub type SelfPlayBinding = BTreeMap<String, ProviderId>;

/// An ordered script of turns plus conversation-level assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: crate::ScenarioId,
    pub turns: Vec<TurnDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_assertions: Vec<AssertionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_play: Option<SelfPlayBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_definition_detects_self_play() {
        let turn = TurnDefinition {
            role: "moderator".into(),
            content: None,
            persona: Some("skeptic".into()),
            turns: Some(2),
            assertions: vec![],
            tool_calls_allowed: false,
        };
        assert!(turn.is_self_play());
        assert!(!turn.is_literal("moderator"));
    }
}
