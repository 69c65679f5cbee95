//! Quickstart: run a single scenario against a scripted provider and print
//! a one-line summary per run.
//!
//! Run with: `cargo run -p arena-sdk --example quickstart`

use arena_core::CancellationToken;
use arena_providers::{MockProvider, ScriptedReply, SCENARIO_HINT_KEY};
use arena_sdk::ArenaBuilder;
use arena_types::{Params, ProviderId, Region, Scenario, ScenarioId, TurnDefinition};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario {
        id: ScenarioId::from("onboarding-greeting"),
        turns: vec![
            TurnDefinition {
                role: "user".into(),
                content: Some("Hi, can you help me get started?".into()),
                persona: None,
                turns: None,
                assertions: vec![],
                tool_calls_allowed: false,
            },
            TurnDefinition {
                role: "assistant".into(),
                content: None,
                persona: None,
                turns: None,
                assertions: vec![],
                tool_calls_allowed: false,
            },
        ],
        conversation_assertions: vec![],
        self_play: None,
    };

    let provider = Arc::new(
        MockProvider::new("mock-gpt")
            .with_reply(scenario.id.clone(), 0, ScriptedReply::new("Sure, let's get started!")),
    );

    let mut params = Params::new();
    params.extra.insert(SCENARIO_HINT_KEY.to_string(), json!(scenario.id.as_str()));

    let arena = ArenaBuilder::new()
        .with_scenarios(vec![scenario])
        .with_provider(ProviderId::from("mock-gpt"), provider)
        .with_regions(vec![Region::from("us-east")])
        .with_params(params)
        .build();

    let outcome = arena.run(4, "quickstart.toml", CancellationToken::new()).await?;

    for result in &outcome.results {
        println!(
            "{} / {} / {}: {:?}",
            result.scenario_id, result.provider_id, result.region, result.status
        );
    }
    println!(
        "\n{} runs, {} succeeded, {} errored",
        outcome.summary.total_runs, outcome.summary.successful, outcome.summary.errors
    );

    Ok(())
}
