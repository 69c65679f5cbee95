use arena_types::{RunId, RunResult, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate index written alongside the per-run JSON files (spec §6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_runs: usize,
    pub successful: usize,
    pub errors: usize,
    #[serde(default)]
    pub failed_assertions: usize,
    pub timestamp: DateTime<Utc>,
    pub config_file: String,
    pub run_ids: Vec<RunId>,
}

impl Summary {
    /// Assertion failures are orthogonal to run success (spec §9, Open
    /// Question 2): a run with a failing assertion still counts toward
    /// `successful` if it finished without a provider/cancellation/timeout
    /// error. `failed_assertions` is a separate counter entirely.
    pub fn from_results(results: &[RunResult], config_file: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let successful = results.iter().filter(|r| r.status == RunStatus::Succeeded).count();
        let errors = results
            .iter()
            .filter(|r| matches!(r.status, RunStatus::Failed | RunStatus::Aborted))
            .count();
        let failed_assertions = results.iter().filter(|r| r.has_failed_assertions()).count();

        Self {
            total_runs: results.len(),
            successful,
            errors,
            failed_assertions,
            timestamp,
            config_file: config_file.into(),
            run_ids: results.iter().map(|r| r.run_id.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{FailureReason, Params, ProviderId, Region, ScenarioId};

    fn base(id: &str, status: RunStatus) -> RunResult {
        RunResult {
            run_id: RunId::new(id),
            scenario_id: ScenarioId::from("s"),
            provider_id: ProviderId::from("mock"),
            region: Region::from("us"),
            params: Params::new(),
            messages: vec![],
            cost: Default::default(),
            tool_stats: Default::default(),
            assertion_results: vec![],
            status,
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            error: None,
            failure_reason: None,
            self_play_roles: None,
        }
    }

    #[test]
    fn counts_successes_and_errors_separately() {
        let mut failed = base("r2", RunStatus::Failed);
        failed.failure_reason = Some(FailureReason::ProviderError);
        let results = vec![base("r1", RunStatus::Succeeded), failed, base("r3", RunStatus::Aborted)];

        let summary = Summary::from_results(&results, "arena.toml", Utc::now());
        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.errors, 2);
    }

    #[test]
    fn failed_assertions_do_not_count_as_errors() {
        use arena_types::AssertionResult;
        let mut succeeded = base("r1", RunStatus::Succeeded);
        succeeded.assertion_results.push(AssertionResult {
            name: "a".into(),
            passed: false,
            warning: false,
            kind: "contains".into(),
            detail: "missing".into(),
        });

        let summary = Summary::from_results(&[succeeded], "arena.toml", Utc::now());
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.failed_assertions, 1);
    }
}
