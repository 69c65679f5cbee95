//! Custom assertions for RunResult/Summary validation.
//!
//! High-level checks that make end-to-end tests more readable than
//! repeating the same field digging at every call site.

use anyhow::{Context, Result};
use arena_types::{RunResult, RunStatus};
use serde_json::Value;

/// Assert every run in `results` finished with the given status.
pub fn assert_all_status(results: &[RunResult], expected: RunStatus) -> Result<()> {
    let mismatched: Vec<&RunResult> = results.iter().filter(|r| r.status != expected).collect();
    if !mismatched.is_empty() {
        anyhow::bail!(
            "expected all {} runs to be {:?}, but {} were not: {:?}",
            results.len(),
            expected,
            mismatched.len(),
            mismatched.iter().map(|r| (r.provider_id.as_str(), r.status)).collect::<Vec<_>>()
        );
    }
    Ok(())
}

/// Assert the index JSON at `path` records exactly `expected` runs.
pub fn assert_index_run_count(index: &Value, expected: usize) -> Result<()> {
    let run_ids = index["run_ids"].as_array().context("expected 'run_ids' array in index.json")?;
    if run_ids.len() != expected {
        anyhow::bail!("expected {} run_ids, got {}", expected, run_ids.len());
    }
    Ok(())
}

/// Assert a single run has no failed (non-warning) assertions.
pub fn assert_no_failed_assertions(result: &RunResult) -> Result<()> {
    if result.has_failed_assertions() {
        let failures: Vec<&str> = result.assertion_results.iter().filter(|a| a.is_failed()).map(|a| a.name.as_str()).collect();
        anyhow::bail!("run {} has failed assertions: {:?}", result.run_id, failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_run_count_mismatch_is_an_error() {
        let index = json!({ "run_ids": ["a", "b"] });
        assert!(assert_index_run_count(&index, 2).is_ok());
        assert!(assert_index_run_count(&index, 1).is_err());
    }
}
