use crate::assertions::AssertionEngine;
use arena_core::backoff::BackoffPolicy;
use arena_core::{CancellationToken, EventSink};
use arena_providers::ProviderRegistry;
use arena_types::{
    Event, FailureReason, Message, Role, RunResult, RunSpec, RunStatus, Scenario, TurnDefinition,
};
use chrono::Utc;
use std::sync::Arc;

/// Per-run state machine: `INIT -> (USER_TURN <-> ASSISTANT_TURN)* -> ASSERT
/// -> DONE`, with `FAILED` reachable from any state (spec §4.2).
pub struct ConversationRunner {
    registry: Arc<ProviderRegistry>,
    events: Arc<dyn EventSink>,
    backoff: BackoffPolicy,
}

impl ConversationRunner {
    pub fn new(registry: Arc<ProviderRegistry>, events: Arc<dyn EventSink>, backoff: BackoffPolicy) -> Self {
        Self { registry, events, backoff }
    }

    /// Always returns a terminal `RunResult` — fatal errors finalise the run
    /// as `Failed` rather than propagating, so every `RunSpec` yields
    /// exactly one terminal record (spec §3, invariant 4).
    pub async fn execute(&self, spec: &RunSpec, scenario: &Scenario, cancellation: CancellationToken) -> RunResult {
        let start_time = Utc::now();
        let mut result = RunResult::pending(spec, start_time);
        self.events.publish(Event::RunStarted { run_id: spec.id.clone() });

        for (turn_index, turn) in scenario.turns.iter().enumerate() {
            self.events.publish(Event::TurnStarted { run_id: spec.id.clone(), turn_index });

            if cancellation.is_cancelled() {
                return self.finalize_cancelled(result, start_time);
            }

            let outcome = if turn.is_self_play() {
                self.run_self_play_turn(spec, turn, &mut result, &cancellation).await
            } else if let Some(content) = &turn.content {
                self.append_literal(&mut result, turn, content);
                Ok(())
            } else {
                let role = role_from_str(&turn.role);
                self.run_provider_turn(spec, &spec.provider_id, role, &mut result, &cancellation)
                    .await
            };

            if let Err(reason) = outcome {
                return self.finalize_failed(result, start_time, reason);
            }

            for message in result.messages.iter().skip(result.messages.len().saturating_sub(self.messages_appended_this_turn(turn))) {
                self.events.publish(Event::TurnCompleted {
                    run_id: spec.id.clone(),
                    turn_index,
                    message: message.clone(),
                });
            }

            for assertion in &turn.assertions {
                let assertion_result = AssertionEngine::evaluate(assertion, &result.messages);
                self.events.publish(Event::AssertionEvaluated {
                    run_id: spec.id.clone(),
                    result: assertion_result.clone(),
                });
                result.assertion_results.push(assertion_result);
            }
        }

        for assertion in &scenario.conversation_assertions {
            let assertion_result = AssertionEngine::evaluate(assertion, &result.messages);
            self.events.publish(Event::AssertionEvaluated {
                run_id: spec.id.clone(),
                result: assertion_result.clone(),
            });
            result.assertion_results.push(assertion_result);
        }

        self.finalize_succeeded(result, start_time)
    }

    fn messages_appended_this_turn(&self, turn: &TurnDefinition) -> usize {
        if turn.is_self_play() {
            turn.turns.unwrap_or(1) as usize
        } else {
            1
        }
    }

    fn append_literal(&self, result: &mut RunResult, turn: &TurnDefinition, content: &str) {
        let role = role_from_str(&turn.role);
        result.messages.push(Message::new(role, content.to_string(), Utc::now()));
    }

    async fn run_self_play_turn(
        &self,
        spec: &RunSpec,
        turn: &TurnDefinition,
        result: &mut RunResult,
        cancellation: &CancellationToken,
    ) -> Result<(), FailureReason> {
        let binding = spec.self_play_roles.as_ref().ok_or(FailureReason::Internal)?;
        let provider_id = binding.get(&turn.role).ok_or(FailureReason::Internal)?.clone();
        let role = role_from_str(&turn.role);

        for _ in 0..turn.turns.unwrap_or(1) {
            self.run_provider_turn(spec, &provider_id, role.clone(), result, cancellation).await?;
        }
        Ok(())
    }

    async fn run_provider_turn(
        &self,
        spec: &RunSpec,
        provider_id: &arena_types::ProviderId,
        role: Role,
        result: &mut RunResult,
        cancellation: &CancellationToken,
    ) -> Result<(), FailureReason> {
        let provider = self.registry.get(provider_id).ok_or(FailureReason::Internal)?;

        let mut attempt = 0u32;
        loop {
            if cancellation.is_cancelled() {
                return Err(FailureReason::Cancelled);
            }

            match provider.complete(&result.messages, &spec.params).await {
                Ok(mut message) => {
                    message.role = role.clone();
                    if let Some(usage) = message.token_usage {
                        result.cost += provider.cost(usage);
                    }
                    for tool_call in &message.tool_calls {
                        result.tool_stats.record_call(tool_call);
                    }
                    for tool_result in &message.tool_results {
                        result.tool_stats.record_result(tool_result);
                    }
                    result.messages.push(message);
                    return Ok(());
                }
                Err(err) if err.is_transient() && self.backoff.should_retry(attempt) => {
                    let jitter = rand::random::<f64>();
                    let delay = self.backoff.delay_for(attempt, jitter, None);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancellation.cancelled() => return Err(FailureReason::Cancelled),
                    }
                    attempt += 1;
                }
                Err(_) => return Err(FailureReason::ProviderError),
            }
        }
    }

    fn finalize_succeeded(&self, mut result: RunResult, start_time: chrono::DateTime<Utc>) -> RunResult {
        let end_time = Utc::now().max(start_time);
        result.status = RunStatus::Succeeded;
        result.end_time = Some(end_time);
        self.events.publish(Event::RunCompleted { run_id: result.run_id.clone(), status: result.status });
        result
    }

    fn finalize_failed(&self, mut result: RunResult, start_time: chrono::DateTime<Utc>, reason: FailureReason) -> RunResult {
        let end_time = Utc::now().max(start_time);
        result.status = RunStatus::Failed;
        result.end_time = Some(end_time);
        result.failure_reason = Some(reason);
        result.error = Some(describe_failure(reason));
        self.events.publish(Event::RunFailed { run_id: result.run_id.clone(), reason: describe_failure(reason) });
        result
    }

    fn finalize_cancelled(&self, result: RunResult, start_time: chrono::DateTime<Utc>) -> RunResult {
        self.finalize_failed(result, start_time, FailureReason::Cancelled)
    }
}

fn describe_failure(reason: FailureReason) -> String {
    match reason {
        FailureReason::ProviderError => "provider error after exhausting retries".to_string(),
        FailureReason::Cancelled => "cancelled".to_string(),
        FailureReason::Timeout => "timeout".to_string(),
        FailureReason::Internal => "internal invariant violated".to_string(),
    }
}

fn role_from_str(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "user" => Role::User,
        "assistant" => Role::Assistant,
        other => Role::Custom(other.to_string()),
    }
}
