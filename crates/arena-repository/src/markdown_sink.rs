use crate::error::Result;
use crate::sink::{write_atomic, ResultSink};
use crate::summary::Summary;
use arena_types::RunResult;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Single human-readable Markdown report summarising a result set.
pub struct MarkdownSink {
    path: PathBuf,
}

impl MarkdownSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for MarkdownSink {
    fn name(&self) -> &'static str {
        "markdown"
    }

    async fn save(&self, results: &[RunResult], summary: &Summary) -> Result<()> {
        let mut out = String::new();
        let _ = writeln!(out, "# prompt-arena results\n");
        let _ = writeln!(out, "- Total runs: {}", summary.total_runs);
        let _ = writeln!(out, "- Successful: {}", summary.successful);
        let _ = writeln!(out, "- Errors: {}", summary.errors);
        let _ = writeln!(out, "- Failed assertions: {}", summary.failed_assertions);
        let _ = writeln!(out, "- Config: `{}`\n", summary.config_file);
        let _ = writeln!(out, "| Run | Scenario | Provider | Region | Status |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for result in results {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {:?} |",
                result.run_id, result.scenario_id, result.provider_id, result.region, result.status
            );
        }

        write_atomic(self.name(), &self.path, out.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{Params, ProviderId, Region, RunId, RunStatus, ScenarioId};
    use chrono::Utc;

    #[tokio::test]
    async fn renders_one_table_row_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MarkdownSink::new(dir.path().join("report.md"));
        let results = vec![RunResult {
            run_id: RunId::new("r1"),
            scenario_id: ScenarioId::from("s"),
            provider_id: ProviderId::from("mock"),
            region: Region::from("us"),
            params: Params::new(),
            messages: vec![],
            cost: Default::default(),
            tool_stats: Default::default(),
            assertion_results: vec![],
            status: RunStatus::Succeeded,
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            error: None,
            failure_reason: None,
            self_play_roles: None,
        }];
        let summary = Summary::from_results(&results, "arena.toml", Utc::now());
        sink.save(&results, &summary).await.unwrap();

        let text = tokio::fs::read_to_string(dir.path().join("report.md")).await.unwrap();
        assert!(text.contains("r1"));
        assert!(text.contains("Total runs: 1"));
    }
}
