//! Self-play: two scripted providers, bound to "interviewer" and
//! "candidate" roles, converse against each other with no human turns.
//!
//! Run with: `cargo run -p arena-sdk --example self_play`

use arena_core::CancellationToken;
use arena_providers::{MockProvider, ScriptedReply, SCENARIO_HINT_KEY};
use arena_sdk::ArenaBuilder;
use arena_types::{Params, ProviderId, Region, Scenario, ScenarioId, TurnDefinition};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario_id = ScenarioId::from("mock-interview");

    let scenario = Scenario {
        id: scenario_id.clone(),
        turns: vec![
            TurnDefinition {
                role: "interviewer".into(),
                content: None,
                persona: Some("interviewer".into()),
                turns: Some(1),
                assertions: vec![],
                tool_calls_allowed: false,
            },
            TurnDefinition {
                role: "candidate".into(),
                content: None,
                persona: Some("candidate".into()),
                turns: Some(1),
                assertions: vec![],
                tool_calls_allowed: false,
            },
        ],
        conversation_assertions: vec![],
        self_play: Some(BTreeMap::from([
            ("interviewer".to_string(), ProviderId::from("mock-interviewer")),
            ("candidate".to_string(), ProviderId::from("mock-candidate")),
        ])),
    };

    let interviewer = Arc::new(
        MockProvider::new("mock-interviewer")
            .with_reply(scenario_id.clone(), 0, ScriptedReply::new("Tell me about a project you're proud of.")),
    );
    let candidate = Arc::new(
        MockProvider::new("mock-candidate")
            .with_reply(scenario_id.clone(), 1, ScriptedReply::new("I built a conversation simulation harness.")),
    );

    let mut params = Params::new();
    params.extra.insert(SCENARIO_HINT_KEY.to_string(), json!(scenario_id.as_str()));

    let arena = ArenaBuilder::new()
        .with_scenarios(vec![scenario])
        .with_provider(ProviderId::from("mock-interviewer"), interviewer)
        .with_provider(ProviderId::from("mock-candidate"), candidate)
        // Self-play scenarios still need a "driving" provider/region pair for
        // the RunSpec matrix; which provider drives doesn't matter since
        // every turn is bound explicitly via `self_play`.
        .with_provider(ProviderId::from("driver"), Arc::new(MockProvider::new("driver")))
        .with_regions(vec![Region::from("default")])
        .with_params(params)
        .build();

    let outcome = arena.run(1, "self_play.toml", CancellationToken::new()).await?;

    for result in &outcome.results {
        println!("run {}: {:?}", result.run_id, result.status);
        for message in &result.messages {
            println!("  {:?}: {}", message.role, message.content);
        }
    }

    Ok(())
}
