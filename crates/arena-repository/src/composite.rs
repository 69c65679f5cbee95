use crate::sink::ResultSink;
use crate::summary::Summary;
use arena_types::RunResult;

/// Wraps zero or more format-specific sinks. `save` invokes each child in
/// turn; a child's failure is recorded but never stops the others from
/// running, since each child already commits atomically on its own (spec
/// §4.7, §8 scenario 6).
pub struct ResultRepository {
    sinks: Vec<Box<dyn ResultSink>>,
}

/// Per-sink outcome of a `ResultRepository::save` call.
pub struct SaveReport {
    pub failures: Vec<(String, String)>,
}

impl SaveReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ResultRepository {
    pub fn new(sinks: Vec<Box<dyn ResultSink>>) -> Self {
        Self { sinks }
    }

    pub async fn save(&self, results: &[RunResult], summary: &Summary) -> SaveReport {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(err) = sink.save(results, summary).await {
                failures.push((sink.name().to_string(), err.to_string()));
            }
        }
        SaveReport { failures }
    }
}
