use crate::{
    AssertionResult, Cost, Message, Params, ProviderId, Region, RunId, ScenarioId,
    SelfPlayBinding, ToolStats,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable identification of one execution. Produced by the Planner,
/// consumed by the Scheduler. `id` is a pure function of every other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub id: RunId,
    pub scenario_id: ScenarioId,
    pub provider_id: ProviderId,
    pub region: Region,
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_play_roles: Option<SelfPlayBinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ProviderError,
    Cancelled,
    Timeout,
    Internal,
}

/// Terminal record for one run. Exactly one per `RunSpec`. Frozen once
/// `status` leaves `Pending`/`Running`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub scenario_id: ScenarioId,
    pub provider_id: ProviderId,
    pub region: Region,
    pub params: Params,
    pub messages: Vec<Message>,
    pub cost: Cost,
    pub tool_stats: ToolStats,
    pub assertion_results: Vec<AssertionResult>,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_play_roles: Option<SelfPlayBinding>,
}

impl RunResult {
    pub fn pending(spec: &RunSpec, start_time: DateTime<Utc>) -> Self {
        Self {
            run_id: spec.id.clone(),
            scenario_id: spec.scenario_id.clone(),
            provider_id: spec.provider_id.clone(),
            region: spec.region.clone(),
            params: spec.params.clone(),
            messages: Vec::new(),
            cost: Cost::default(),
            tool_stats: ToolStats::default(),
            assertion_results: Vec::new(),
            status: RunStatus::Running,
            start_time,
            end_time: None,
            error: None,
            failure_reason: None,
            self_play_roles: spec.self_play_roles.clone(),
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted
        )
    }

    pub fn has_failed_assertions(&self) -> bool {
        self.assertion_results.iter().any(|a| a.is_failed())
    }
}
