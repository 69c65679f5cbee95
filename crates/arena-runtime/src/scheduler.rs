use crate::event_bus::EventBus;
use crate::rate_limiter::RateLimiter;
use crate::store::StateStore;
use arena_core::backoff::BackoffPolicy;
use arena_core::{CancellationToken, EventSink};
use arena_engine::ConversationRunner;
use arena_providers::ProviderRegistry;
use arena_types::{RunId, RunSpec, RunStatus, Scenario, ScenarioId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bounded-concurrency worker pool consuming a `RunPlan` (spec C7).
pub struct Scheduler {
    registry: Arc<ProviderRegistry>,
    store: Arc<StateStore>,
    events: Arc<dyn EventSink>,
    scenarios: Arc<HashMap<ScenarioId, Scenario>>,
    rate_limiter: Arc<RateLimiter>,
    backoff: BackoffPolicy,
}

/// What the scheduler hands back once every worker has drained (spec §4.6:
/// "On completion the scheduler returns `(runIDs[], firstFatalError?)`").
#[derive(Debug, Default)]
pub struct SchedulerOutcome {
    pub run_ids: Vec<RunId>,
    pub first_fatal_error: Option<String>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<StateStore>,
        scenarios: HashMap<ScenarioId, Scenario>,
        rate_limiter: RateLimiter,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            registry,
            store,
            events: Arc::new(EventBus::default()),
            scenarios: Arc::new(scenarios),
            rate_limiter: Arc::new(rate_limiter),
            backoff,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Loads every listed run back out of the backing `StateStore`, in
    /// order. Exposed so callers that only hold a `Scheduler` (the facade
    /// doesn't keep its own `StateStore` handle) can fetch the results of
    /// the run_ids a `run` call just produced.
    pub async fn load_results(&self, run_ids: &[RunId]) -> crate::error::Result<Vec<arena_types::RunResult>> {
        self.store.load_many(run_ids).await
    }

    /// Executes `plan` with at most `concurrency` conversation runners
    /// in flight at once. Pending specs left in the queue when
    /// `cancellation` fires are finalised as `Aborted`; in-flight runs
    /// finish their current turn's suspension point and finalise as
    /// `Failed(reason=cancelled)` (spec §4.6, rule 3).
    pub async fn run(&self, plan: Vec<RunSpec>, concurrency: usize, cancellation: CancellationToken) -> SchedulerOutcome {
        let queue = Arc::new(Mutex::new(VecDeque::from(plan)));
        let completed = Arc::new(Mutex::new(Vec::new()));
        let first_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let worker_count = concurrency.max(1);
        let mut handles = Vec::with_capacity(worker_count);

        for _ in 0..worker_count {
            let queue = queue.clone();
            let completed = completed.clone();
            let first_error = first_error.clone();
            let registry = self.registry.clone();
            let store = self.store.clone();
            let events = self.events.clone();
            let scenarios = self.scenarios.clone();
            let rate_limiter = self.rate_limiter.clone();
            let backoff = self.backoff;
            let cancellation = cancellation.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancellation.is_cancelled() {
                        break;
                    }
                    let spec = {
                        let mut queue = queue.lock().await;
                        queue.pop_front()
                    };
                    let Some(spec) = spec else { break };

                    rate_limiter.acquire(&spec.provider_id).await;

                    let Some(scenario) = scenarios.get(&spec.scenario_id) else {
                        let mut guard = first_error.lock().await;
                        guard.get_or_insert_with(|| format!("unknown scenario '{}'", spec.scenario_id));
                        continue;
                    };

                    if store.create(&spec).await.is_err() {
                        let mut guard = first_error.lock().await;
                        guard.get_or_insert_with(|| format!("duplicate run id '{}'", spec.id));
                        continue;
                    }

                    let runner = ConversationRunner::new(registry.clone(), events.clone(), backoff);
                    let result = runner.execute(&spec, scenario, cancellation.clone()).await;

                    if result.status == RunStatus::Failed {
                        let mut guard = first_error.lock().await;
                        guard.get_or_insert_with(|| {
                            result.error.clone().unwrap_or_else(|| "run failed".to_string())
                        });
                    }

                    let run_id = result.run_id.clone();
                    let _ = store.replace(result).await;
                    completed.lock().await.push(run_id);
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        self.abort_remaining(&queue).await;

        SchedulerOutcome {
            run_ids: Arc::try_unwrap(completed).map(Mutex::into_inner).unwrap_or_default(),
            first_fatal_error: Arc::try_unwrap(first_error).map(Mutex::into_inner).unwrap_or_default(),
        }
    }

    /// Specs still in the dispatch queue when every worker has stopped were
    /// never started — they're marked `Aborted` rather than dropped
    /// silently (spec §4.6, rule 3).
    async fn abort_remaining(&self, queue: &Arc<Mutex<VecDeque<RunSpec>>>) {
        let remaining: Vec<RunSpec> = queue.lock().await.drain(..).collect();
        for spec in remaining {
            if self.store.create(&spec).await.is_ok() {
                let _ = self.store.finalise(&spec.id, RunStatus::Aborted, None).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_providers::{MockProvider, ScriptedReply, SCENARIO_HINT_KEY};
    use arena_types::{Params, ProviderId, Region, TurnDefinition};
    use serde_json::json;

    fn scenario(id: &str, reply: &str) -> (Scenario, ScenarioId) {
        let scenario_id = ScenarioId::from(id);
        let scenario = Scenario {
            id: scenario_id.clone(),
            turns: vec![TurnDefinition {
                role: "assistant".into(),
                content: None,
                persona: None,
                turns: None,
                assertions: vec![],
                tool_calls_allowed: false,
            }],
            conversation_assertions: vec![],
            self_play: None,
        };
        let _ = reply;
        (scenario, scenario_id)
    }

    fn spec_for(scenario_id: &ScenarioId, provider: &str, region: &str) -> RunSpec {
        let mut params = Params::new();
        params.extra.insert(SCENARIO_HINT_KEY.to_string(), json!(scenario_id.as_str()));
        RunSpec {
            id: RunId::new(format!("{scenario_id}-{provider}-{region}")),
            scenario_id: scenario_id.clone(),
            provider_id: ProviderId::from(provider),
            region: Region::from(region),
            params,
            self_play_roles: None,
        }
    }

    #[tokio::test]
    async fn all_runs_complete_and_are_recorded_in_the_store() {
        let (scenario, scenario_id) = scenario("s", "hi");
        let mut scenarios = HashMap::new();
        scenarios.insert(scenario_id.clone(), scenario);

        let mut registry = ProviderRegistry::new();
        registry.register(
            ProviderId::from("mock"),
            Arc::new(MockProvider::new("mock").with_reply(scenario_id.clone(), 0, ScriptedReply::new("hi"))),
        );

        let scheduler = Scheduler::new(
            Arc::new(registry),
            Arc::new(StateStore::new()),
            scenarios,
            RateLimiter::new(),
            BackoffPolicy::default(),
        );

        let plan = vec![spec_for(&scenario_id, "mock", "us")];
        let outcome = scheduler.run(plan, 2, CancellationToken::new()).await;

        assert_eq!(outcome.run_ids.len(), 1);
        assert!(outcome.first_fatal_error.is_none());
    }

    #[tokio::test]
    async fn cancellation_before_dispatch_aborts_every_pending_spec() {
        let (scenario, scenario_id) = scenario("s", "hi");
        let mut scenarios = HashMap::new();
        scenarios.insert(scenario_id.clone(), scenario);

        let mut registry = ProviderRegistry::new();
        registry.register(
            ProviderId::from("mock"),
            Arc::new(MockProvider::new("mock").with_reply(scenario_id.clone(), 0, ScriptedReply::new("hi"))),
        );

        let store = Arc::new(StateStore::new());
        let scheduler = Scheduler::new(
            Arc::new(registry),
            store.clone(),
            scenarios,
            RateLimiter::new(),
            BackoffPolicy::default(),
        );

        let plan = vec![spec_for(&scenario_id, "mock", "us"), spec_for(&scenario_id, "mock", "eu")];
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let outcome = scheduler.run(plan, 1, cancellation).await;

        assert!(outcome.run_ids.is_empty());
        assert_eq!(store.len().await, 2);
    }
}
