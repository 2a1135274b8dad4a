//! Subcommand implementations.

use amadeus_agent_core::agentic::transaction::{transfer_request_text, Signature};
use amadeus_agent_core::crypto::bls;
use amadeus_agent_core::{
    AgentConfig, AllowAll, Conversation, LocalBlsSigner, Network, TransactionCoordinator,
    TransactionSigner,
};
use anyhow::{anyhow, bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent;

pub async fn list_tools(config: &AgentConfig, json: bool) -> Result<()> {
    let connection = agent::connect(config)?;
    let tools = agent::discover_tools(&connection).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }
    for tool in &tools {
        if tool.description.is_empty() {
            println!("{}", tool.name);
        } else {
            println!("{} - {}", tool.name, tool.description);
        }
    }
    Ok(())
}

pub async fn ask(config: &AgentConfig, prompt: Option<String>, cancel: &CancellationToken) -> Result<()> {
    let prompt = match prompt {
        Some(prompt) => prompt,
        None => format!("claim testnet AMA for {}", config.require_wallet_address()?),
    };

    let orchestrator = agent::build_orchestrator(config).await?;
    let mut conversation = Conversation::from_user_text(prompt);
    let outcome = orchestrator.run(&mut conversation, &AllowAll, cancel).await?;

    info!(
        "Agent finished: rounds={}, tool_calls={}",
        outcome.rounds,
        outcome.tool_calls.len()
    );
    println!("{}", outcome.reply);
    Ok(())
}

pub async fn transfer(
    config: &AgentConfig,
    to: &str,
    amount: &str,
    token: &str,
    mainnet: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let signer_address = config.require_wallet_address()?.to_string();
    let network = if mainnet {
        Network::Mainnet
    } else {
        Network::Testnet
    };
    let request = transfer_request_text(&signer_address, to, amount, token, network)?;

    let orchestrator = agent::build_orchestrator(config).await?;
    let coordinator = TransactionCoordinator::new(orchestrator, signer_address);

    let pending = coordinator.build(&request, Some(network), cancel).await?;
    if !pending.build_reply().is_empty() {
        println!("{}", pending.build_reply());
    }
    println!("signing_payload: {}", pending.unsigned().signing_payload);
    println!("blob: {}", pending.unsigned().blob);

    let signature = match config.wallet.secret_key.as_deref() {
        Some(secret) => LocalBlsSigner::new(secret).sign(pending.unsigned()).await?,
        None => read_signature_from_stdin().await?,
    };

    let submitted = coordinator.submit(pending, signature, cancel).await?;
    println!("{}", submitted.reply());
    match submitted.submission_result() {
        Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
        None => bail!("the model did not submit the signed transaction"),
    }
    Ok(())
}

async fn read_signature_from_stdin() -> Result<Signature> {
    eprintln!("Sign the payload above with your wallet and paste the base58 signature:");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("failed to read signature from stdin")?
        .ok_or_else(|| anyhow!("no signature supplied"))?;
    Ok(Signature::new(line)?)
}

pub fn sign(config: &AgentConfig, payload: &str) -> Result<()> {
    let secret = config
        .wallet
        .secret_key
        .as_deref()
        .ok_or_else(|| anyhow!("AMA_SECRET_KEY is not set"))?;
    let signature = bls::sign(payload, secret)?;
    println!("{}", signature);
    Ok(())
}
