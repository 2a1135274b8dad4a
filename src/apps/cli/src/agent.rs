//! Wiring from configuration to a ready orchestrator.

use std::path::Path;
use std::sync::Arc;

use amadeus_agent_core::service::mcp::{normalize_tools, MCPConnection};
use amadeus_agent_core::{AgentConfig, ConversationOrchestrator, ToolDispatcher};
use amadeus_ai_adapters::{AnthropicClient, AnthropicClientConfig, ToolDescriptor};
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub fn load_config(path: Option<&Path>) -> Result<AgentConfig> {
    AgentConfig::load(path).context("failed to load configuration")
}

pub fn connect(config: &AgentConfig) -> Result<Arc<MCPConnection>> {
    let connection = MCPConnection::new(
        config.mcp.rpc_url.clone(),
        Default::default(),
        config.connect_timeout(),
    )?;
    Ok(Arc::new(connection))
}

pub async fn discover_tools(connection: &MCPConnection) -> Result<Vec<ToolDescriptor>> {
    let tools = connection
        .list_all_tools()
        .await
        .with_context(|| format!("tool discovery failed on {}", connection.url()))?;
    let descriptors = normalize_tools(tools)?;
    info!(
        "Discovered {} tools on {}",
        descriptors.len(),
        connection.url()
    );
    Ok(descriptors)
}

/// Connects to the endpoint, fetches the catalog once and builds the orchestrator.
pub async fn build_orchestrator(config: &AgentConfig) -> Result<Arc<ConversationOrchestrator>> {
    config.validate()?;
    let api_key = config.model.api_key.clone().unwrap_or_default();

    let mut client_config = AnthropicClientConfig::new(api_key, config.model.model.clone());
    client_config.base_url = config.model.base_url.clone();
    client_config.request_timeout = config.model_request_timeout();
    let model = Arc::new(AnthropicClient::new(client_config)?);

    let connection = connect(config)?;
    let tools = discover_tools(&connection).await?;
    let dispatcher = ToolDispatcher::new(connection, config.tool_timeout());

    Ok(Arc::new(
        ConversationOrchestrator::new(model, dispatcher, tools)
            .with_max_tokens(config.model.max_tokens)
            .with_max_rounds(config.agent.max_rounds),
    ))
}

/// Token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the running conversation");
            token.cancel();
        }
    });
    cancel
}
