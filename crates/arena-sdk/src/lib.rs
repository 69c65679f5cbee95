//! Public facade for prompt-arena: composes the Planner, Scheduler,
//! State Store, Event Bus and Result Repository behind one entry point.

pub mod config;
pub mod error;

pub use config::ArenaConfig;
pub use error::{Error, Result};

use arena_core::backoff::BackoffPolicy;
use arena_core::CancellationToken;
use arena_engine::planner::{PlanFilters, PlanInput, Planner};
use arena_providers::{Provider, ProviderRegistry};
use arena_repository::{ResultRepository, SaveReport, Summary};
use arena_runtime::event_bus::{EventBus, Subscription};
use arena_runtime::rate_limiter::RateLimiter;
use arena_runtime::scheduler::{Scheduler, SchedulerOutcome};
use arena_runtime::store::StateStore;
use arena_types::{Params, ProviderId, Region, RunResult, Scenario, ScenarioId};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds an `Arena` from its collaborators. Providers must be registered
/// explicitly: provider HTTP clients are out of scope for this crate (spec
/// §1), so the caller supplies whatever `Arc<dyn Provider>` implementations
/// it wants bound to each `ProviderId`.
pub struct ArenaBuilder {
    scenarios: Vec<Scenario>,
    registry: ProviderRegistry,
    regions: Vec<Region>,
    base_params: Params,
    filters: PlanFilters,
    rate_limiter: RateLimiter,
    backoff: BackoffPolicy,
    events: Arc<EventBus>,
}

impl Default for ArenaBuilder {
    fn default() -> Self {
        Self {
            scenarios: Vec::new(),
            registry: ProviderRegistry::new(),
            regions: Vec::new(),
            base_params: Params::new(),
            filters: PlanFilters::default(),
            rate_limiter: RateLimiter::new(),
            backoff: BackoffPolicy::default(),
            events: Arc::new(EventBus::default()),
        }
    }
}

impl ArenaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn with_provider(mut self, id: ProviderId, provider: Arc<dyn Provider>) -> Self {
        self.registry.register(id, provider);
        self
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.base_params = params;
        self
    }

    pub fn with_filters(mut self, filters: PlanFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = limiter;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = bus;
        self
    }

    pub fn build(self) -> Arena {
        let providers: Vec<ProviderId> = self.registry.ids().cloned().collect();
        let scenario_index: HashMap<ScenarioId, Scenario> =
            self.scenarios.iter().map(|s| (s.id.clone(), s.clone())).collect();

        let scheduler = Scheduler::new(
            Arc::new(self.registry),
            Arc::new(StateStore::new()),
            scenario_index,
            self.rate_limiter,
            self.backoff,
        )
        .with_events(self.events.clone());

        Arena {
            scenarios: self.scenarios,
            providers,
            regions: self.regions,
            base_params: self.base_params,
            filters: self.filters,
            scheduler,
            events: self.events,
        }
    }
}

/// Top-level handle: plan a run matrix, execute it, and persist results.
/// Each `run` call re-plans from the same scenario/provider/region set, so
/// the same `Arena` can be driven repeatedly (e.g. a test harness iterating
/// scenarios).
pub struct Arena {
    scenarios: Vec<Scenario>,
    providers: Vec<ProviderId>,
    regions: Vec<Region>,
    base_params: Params,
    filters: PlanFilters,
    scheduler: Scheduler,
    events: Arc<EventBus>,
}

/// Everything produced by one end-to-end `Arena::run` call.
pub struct RunOutcome {
    pub results: Vec<RunResult>,
    pub summary: Summary,
    pub scheduler: SchedulerOutcome,
}

impl Arena {
    /// Subscribes to the run-lifecycle event stream (spec C3). Dropping the
    /// returned `Subscription` unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Plans, schedules and executes the full matrix, then returns every
    /// terminal `RunResult` the State Store holds plus an aggregate
    /// `Summary` (spec's end-to-end data flow, §2).
    pub async fn run(
        &self,
        concurrency: usize,
        config_file: impl Into<String>,
        cancellation: CancellationToken,
    ) -> Result<RunOutcome> {
        let plan = Planner::plan(PlanInput {
            scenarios: &self.scenarios,
            providers: &self.providers,
            regions: &self.regions,
            base_params: self.base_params.clone(),
            filters: self.filters.clone(),
        })?;

        let outcome = self.scheduler.run(plan, concurrency, cancellation).await;
        let results = load_results(&self.scheduler, &outcome.run_ids).await?;
        let summary = Summary::from_results(&results, config_file, chrono::Utc::now());

        Ok(RunOutcome { results, summary, scheduler: outcome })
    }

    pub async fn save(&self, repository: &ResultRepository, outcome: &RunOutcome) -> SaveReport {
        repository.save(&outcome.results, &outcome.summary).await
    }
}

/// `Scheduler` owns its `StateStore` privately, so the facade asks it back
/// for the run_ids it just produced rather than keeping a second handle to
/// the same store.
async fn load_results(scheduler: &Scheduler, run_ids: &[arena_types::RunId]) -> Result<Vec<RunResult>> {
    scheduler.load_results(run_ids).await.map_err(|err| Error::Config(err.to_string()))
}
