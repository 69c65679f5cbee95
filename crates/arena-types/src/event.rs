use crate::{AssertionResult, Message, RunId, RunStatus};
use serde::{Deserialize, Serialize};

/// Discriminated variant carrying a `RunID`. Order for a given run is a
/// sequentially-consistent prefix of its state-machine transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted { run_id: RunId },
    TurnStarted { run_id: RunId, turn_index: usize },
    TurnCompleted { run_id: RunId, turn_index: usize, message: Message },
    AssertionEvaluated { run_id: RunId, result: AssertionResult },
    RunCompleted { run_id: RunId, status: RunStatus },
    RunFailed { run_id: RunId, reason: String },
}

impl Event {
    pub fn run_id(&self) -> &RunId {
        match self {
            Event::RunStarted { run_id }
            | Event::TurnStarted { run_id, .. }
            | Event::TurnCompleted { run_id, .. }
            | Event::AssertionEvaluated { run_id, .. }
            | Event::RunCompleted { run_id, .. }
            | Event::RunFailed { run_id, .. } => run_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_accessor_covers_every_variant() {
        let id = RunId::new("r1");
        let events = vec![
            Event::RunStarted { run_id: id.clone() },
            Event::RunCompleted { run_id: id.clone(), status: RunStatus::Succeeded },
            Event::RunFailed { run_id: id.clone(), reason: "boom".into() },
        ];
        for event in events {
            assert_eq!(event.run_id(), &id);
        }
    }
}
