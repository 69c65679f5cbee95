use crate::error::{Error, Result};
use arena_types::{AssertionResult, FailureReason, Message, RunId, RunResult, RunSpec, RunStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory authoritative record of every run (spec C2). Fine-grained
/// per-`RunID` locking: two different runs never contend on the same lock,
/// and the map-level lock is only ever held for the lookup/insert itself,
/// never across an await point, so it can't block the scheduler's accept
/// path (spec §4.4).
#[derive(Default)]
pub struct StateStore {
    runs: RwLock<HashMap<RunId, Arc<RwLock<RunResult>>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, spec: &RunSpec) -> Result<()> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&spec.id) {
            return Err(Error::DuplicateRun(spec.id.to_string()));
        }
        let result = RunResult::pending(spec, Utc::now());
        runs.insert(spec.id.clone(), Arc::new(RwLock::new(result)));
        Ok(())
    }

    pub async fn append_message(&self, id: &RunId, message: Message) -> Result<()> {
        let slot = self.slot(id).await?;
        let mut result = slot.write().await;
        if result.is_terminal() {
            return Err(Error::RunAlreadyTerminal(id.to_string()));
        }
        result.messages.push(message);
        Ok(())
    }

    pub async fn append_assertion(&self, id: &RunId, assertion: AssertionResult) -> Result<()> {
        let slot = self.slot(id).await?;
        let mut result = slot.write().await;
        if result.is_terminal() {
            return Err(Error::RunAlreadyTerminal(id.to_string()));
        }
        result.assertion_results.push(assertion);
        Ok(())
    }

    /// Single permitted terminal transition. Further mutations to this run
    /// error out.
    pub async fn finalise(&self, id: &RunId, status: RunStatus, error: Option<(FailureReason, String)>) -> Result<()> {
        let slot = self.slot(id).await?;
        let mut result = slot.write().await;
        if result.is_terminal() {
            return Err(Error::RunAlreadyTerminal(id.to_string()));
        }
        result.status = status;
        result.end_time = Some(Utc::now().max(result.start_time));
        if let Some((reason, message)) = error {
            result.failure_reason = Some(reason);
            result.error = Some(message);
        }
        Ok(())
    }

    /// Overwrites the stored record wholesale. Used by the Scheduler when a
    /// `ConversationRunner` already produced a fully terminal `RunResult`
    /// and the store only needs to adopt it.
    pub async fn replace(&self, result: RunResult) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.insert(result.run_id.clone(), Arc::new(RwLock::new(result)));
        Ok(())
    }

    pub async fn load(&self, id: &RunId) -> Result<RunResult> {
        let slot = self.slot(id).await?;
        Ok(slot.read().await.clone())
    }

    /// Preserves input order; a missing ID fails the whole call (spec §4.4).
    pub async fn load_many(&self, ids: &[RunId]) -> Result<Vec<RunResult>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(self.load(id).await?);
        }
        Ok(results)
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }

    async fn slot(&self, id: &RunId) -> Result<Arc<RwLock<RunResult>>> {
        self.runs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownRun(id.to_string()))
    }
}
