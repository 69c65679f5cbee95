use crate::error::Result;
use crate::sink::{write_atomic, ResultSink};
use crate::summary::Summary;
use arena_types::RunResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// One `<RunID>.json` per run plus a single `index.json` (spec §6.2, bit-
/// exact for `render` compatibility). `<RunID>.json` is a direct
/// serialisation of `RunResult`; field ordering is whatever `RunResult`'s
/// derive emits, which is stable within a version.
pub struct JsonSink {
    out_dir: PathBuf,
}

impl JsonSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }
}

#[async_trait]
impl ResultSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn save(&self, results: &[RunResult], summary: &Summary) -> Result<()> {
        for result in results {
            let path = self.out_dir.join(format!("{}.json", result.run_id));
            let body = serde_json::to_vec_pretty(result)
                .map_err(|e| crate::Error::Encode { sink: self.name().to_string(), message: e.to_string() })?;
            write_atomic(self.name(), &path, &body).await?;
        }

        let index_path = self.out_dir.join("index.json");
        let body = serde_json::to_vec_pretty(summary)
            .map_err(|e| crate::Error::Encode { sink: self.name().to_string(), message: e.to_string() })?;
        write_atomic(self.name(), &index_path, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{Params, ProviderId, Region, RunId, RunStatus, ScenarioId};
    use chrono::Utc;

    fn result() -> RunResult {
        RunResult {
            run_id: RunId::new("abc123"),
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
        }
    }

    #[tokio::test]
    async fn writes_one_file_per_run_and_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        let results = vec![result()];
        let summary = Summary::from_results(&results, "arena.toml", Utc::now());

        sink.save(&results, &summary).await.unwrap();

        assert!(dir.path().join("abc123.json").exists());
        assert!(dir.path().join("index.json").exists());

        let loaded: RunResult =
            serde_json::from_slice(&tokio::fs::read(dir.path().join("abc123.json")).await.unwrap()).unwrap();
        assert_eq!(loaded.run_id, result().run_id);
    }

    #[tokio::test]
    async fn save_then_load_is_idempotent_and_structurally_equal() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        let results = vec![result()];
        let summary = Summary::from_results(&results, "arena.toml", Utc::now());

        sink.save(&results, &summary).await.unwrap();
        let loaded: RunResult =
            serde_json::from_slice(&tokio::fs::read(dir.path().join("abc123.json")).await.unwrap()).unwrap();
        assert_eq!(loaded, results[0]);
    }
}
