//! Conversation orchestrator
//!
//! Drives model call -> tool dispatch -> result injection until the model stops
//! asking for tools. The history is only ever appended to.

use crate::agentic::core::{Conversation, OrchestratorState};
use crate::agentic::tools::{DispatchedCall, ToolCallGuard, ToolCallOutcome, ToolDispatcher};
use crate::infrastructure::ai::{ModelClient, ModelRequest};
use crate::util::errors::{AgentError, AgentResult};
use amadeus_ai_adapters::{Message, MessagesResponse, StopReason, ToolDescriptor};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Tool result error for calls interrupted by cancellation.
pub const CANCELLED: &str = "cancelled";

/// Result of one orchestrator run.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// First text block of the final model response; empty when there is none.
    pub reply: String,
    pub stop_reason: Option<StopReason>,
    /// Model calls made during the run.
    pub rounds: usize,
    /// Every tool call dispatched during the run, in batch order.
    pub tool_calls: Vec<DispatchedCall>,
    pub total_tokens: u32,
}

impl TurnOutcome {
    pub fn calls_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DispatchedCall> + 'a {
        self.tool_calls
            .iter()
            .filter(move |call| call.tool_use.name == name)
    }
}

pub struct ConversationOrchestrator {
    model: Arc<dyn ModelClient>,
    dispatcher: ToolDispatcher,
    tools: Arc<[ToolDescriptor]>,
    max_tokens: u32,
    max_rounds: Option<usize>,
}

impl ConversationOrchestrator {
    pub fn new(
        model: Arc<dyn ModelClient>,
        dispatcher: ToolDispatcher,
        tools: impl Into<Arc<[ToolDescriptor]>>,
    ) -> Self {
        Self {
            model,
            dispatcher,
            tools: tools.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_rounds: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Caps the number of model calls per run. Unlimited by default.
    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Runs the tool-use loop on `conversation` until the model answers.
    ///
    /// Tool failures reach the model as error results. Model failures, a
    /// `tool_use` stop without tool requests, the round cap and cancellation
    /// end the run with an error; whatever was appended before stays in the
    /// history. A batch interrupted by cancellation is answered with
    /// `cancelled` error results before returning.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        guard: &dyn ToolCallGuard,
        cancel: &CancellationToken,
    ) -> AgentResult<TurnOutcome> {
        if !conversation.has_user_message() {
            return Err(AgentError::Validation(
                "conversation needs at least one user message".to_string(),
            ));
        }

        let mut state = OrchestratorState::AwaitingModel;
        let mut rounds = 0usize;
        let mut tool_calls = Vec::new();
        let mut total_tokens = 0u32;
        let mut reply = String::new();
        let mut stop_reason = None;

        loop {
            debug!("Orchestrator state: {}, round={}", state, rounds);
            match state {
                OrchestratorState::AwaitingModel => {
                    if let Some(max_rounds) = self.max_rounds {
                        if rounds >= max_rounds {
                            warn!("Model round limit reached: max_rounds={}", max_rounds);
                            return Err(AgentError::Validation(format!(
                                "model did not finish within {} rounds",
                                max_rounds
                            )));
                        }
                    }
                    rounds += 1;

                    let mut response = self.call_model(conversation, cancel).await?;
                    if let Some(usage) = &response.usage {
                        total_tokens += usage.total_tokens();
                    }
                    response.content.retain(|b| !b.is_unknown());
                    let wants_tools = response.wants_tools();
                    let text = response.first_text().unwrap_or_default().to_string();
                    let MessagesResponse {
                        stop_reason: response_stop,
                        content: blocks,
                        ..
                    } = response;

                    // Empty assistant turns are rejected by the API on the next call.
                    if !blocks.is_empty() {
                        conversation.push(Message::assistant_blocks(blocks));
                    }

                    if wants_tools {
                        if conversation.pending_tool_uses().is_empty() {
                            return Err(AgentError::Protocol(
                                "model stopped for tool use without requesting any tool"
                                    .to_string(),
                            ));
                        }
                        state = OrchestratorState::AwaitingTools;
                    } else {
                        reply = text;
                        stop_reason = response_stop;
                        state = OrchestratorState::Done;
                    }
                }
                OrchestratorState::AwaitingTools => {
                    let tool_uses = conversation.pending_tool_uses();
                    info!(
                        "Dispatching tool batch: round={}, tools=[{}]",
                        rounds,
                        tool_uses
                            .iter()
                            .map(|u| u.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );

                    let calls = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            // Each pending ToolUse still gets its one result.
                            let results = tool_uses
                                .iter()
                                .map(|u| ToolCallOutcome::failed(CANCELLED).into_tool_result(u.id.clone()))
                                .collect();
                            conversation.push(Message::user_blocks(results));
                            return Err(AgentError::Cancelled("tool batch interrupted".to_string()));
                        }
                        calls = self.dispatcher.dispatch_batch(&tool_uses, guard) => calls,
                    };

                    let results = calls.iter().map(DispatchedCall::to_tool_result).collect();
                    conversation.push(Message::user_blocks(results));
                    tool_calls.extend(calls);
                    state = OrchestratorState::AwaitingModel;
                }
                OrchestratorState::Done => {
                    info!(
                        "Conversation turn finished: rounds={}, tool_calls={}, stop_reason={:?}, tokens={}",
                        rounds,
                        tool_calls.len(),
                        stop_reason,
                        total_tokens
                    );
                    return Ok(TurnOutcome {
                        reply,
                        stop_reason,
                        rounds,
                        tool_calls,
                        total_tokens,
                    });
                }
            }
        }
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
        cancel: &CancellationToken,
    ) -> AgentResult<MessagesResponse> {
        let request = ModelRequest {
            system: conversation.system(),
            tools: &self.tools,
            messages: conversation.messages(),
            max_tokens: self.max_tokens,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                Err(AgentError::Cancelled("model call interrupted".to_string()))
            }
            response = self.model.create_message(request) => response,
        }
    }
}
