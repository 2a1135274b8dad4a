use serde::{Deserialize, Serialize};

/// Orchestrator loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    AwaitingModel,
    AwaitingTools,
    Done,
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrchestratorState::AwaitingModel => "awaiting_model",
            OrchestratorState::AwaitingTools => "awaiting_tools",
            OrchestratorState::Done => "done",
        };
        f.write_str(name)
    }
}
