use crate::error::Result;
use crate::sink::{write_atomic, ResultSink};
use crate::summary::Summary;
use arena_types::{RunResult, RunStatus};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::PathBuf;

/// JUnit XML report, one `<testcase>` per run plus one per failed assertion
/// within it, for consumption by CI dashboards.
pub struct JunitSink {
    path: PathBuf,
}

impl JunitSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for JunitSink {
    fn name(&self) -> &'static str {
        "junit"
    }

    async fn save(&self, results: &[RunResult], summary: &Summary) -> Result<()> {
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<testsuite name="prompt-arena" tests="{}" failures="{}">"#,
            summary.total_runs, summary.errors
        );

        for result in results {
            let classname = format!("{}.{}", result.scenario_id, result.provider_id);
            let name = result.run_id.to_string();
            match result.status {
                RunStatus::Failed | RunStatus::Aborted => {
                    let _ = writeln!(out, r#"  <testcase classname="{classname}" name="{name}">"#);
                    let message = result.error.as_deref().unwrap_or("run did not complete");
                    let _ = writeln!(out, r#"    <failure message="{}"/>"#, xml_escape(message));
                    let _ = writeln!(out, "  </testcase>");
                }
                _ => {
                    let _ = writeln!(out, r#"  <testcase classname="{classname}" name="{name}"/>"#);
                }
            }
        }

        let _ = writeln!(out, "</testsuite>");
        write_atomic(self.name(), &self.path, out.as_bytes()).await
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{FailureReason, Params, ProviderId, Region, RunId, ScenarioId};
    use chrono::Utc;

    fn run(status: RunStatus) -> RunResult {
        RunResult {
            run_id: RunId::new("r1"),
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
            error: Some("boom".into()),
            failure_reason: Some(FailureReason::ProviderError),
            self_play_roles: None,
        }
    }

    #[tokio::test]
    async fn failed_runs_become_testcase_failures() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JunitSink::new(dir.path().join("junit.xml"));
        let results = vec![run(RunStatus::Failed)];
        let summary = Summary::from_results(&results, "arena.toml", Utc::now());
        sink.save(&results, &summary).await.unwrap();

        let text = tokio::fs::read_to_string(dir.path().join("junit.xml")).await.unwrap();
        assert!(text.contains("<failure"));
        assert!(text.contains("boom"));
    }

    #[tokio::test]
    async fn succeeded_runs_have_no_failure_element() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JunitSink::new(dir.path().join("junit.xml"));
        let mut ok = run(RunStatus::Succeeded);
        ok.error = None;
        let results = vec![ok];
        let summary = Summary::from_results(&results, "arena.toml", Utc::now());
        sink.save(&results, &summary).await.unwrap();

        let text = tokio::fs::read_to_string(dir.path().join("junit.xml")).await.unwrap();
        assert!(!text.contains("<failure"));
    }
}
