//! Two-phase transfer coordinator
//!
//! Phase 1 builds the unsigned transaction and hands it to the caller as a
//! `PendingTransaction`. The caller obtains a signature out-of-band and passes
//! both back for phase 2. No transfer state lives anywhere else.

use super::extract::{extract_unsigned_transaction, UnsignedTransaction};
use super::guard::{AuthorizedSubmission, TransactionGuard};
use super::policy::{policy_preamble, submit_request_text, Network, SUBMIT_TRANSACTION};
use super::signer::{Signature, TransactionSigner};
use crate::agentic::core::Conversation;
use crate::agentic::execution::{ConversationOrchestrator, TurnOutcome};
use crate::util::errors::AgentResult;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Phase 1 result, held by the caller until a signature is available.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    conversation: Conversation,
    unsigned: UnsignedTransaction,
    network: Network,
    build: TurnOutcome,
}

impl PendingTransaction {
    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The model's phase 1 reply.
    pub fn build_reply(&self) -> &str {
        &self.build.reply
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    pub conversation: Conversation,
    pub signature: Signature,
    pub network: Network,
    pub outcome: TurnOutcome,
}

impl SubmittedTransaction {
    pub fn reply(&self) -> &str {
        &self.outcome.reply
    }

    /// Payload of the last successful `submit_transaction` call, if the model made one.
    pub fn submission_result(&self) -> Option<&Value> {
        self.outcome
            .calls_named(SUBMIT_TRANSACTION)
            .filter(|call| call.outcome.success)
            .last()
            .map(|call| &call.outcome.payload)
    }
}

pub struct TransactionCoordinator {
    orchestrator: Arc<ConversationOrchestrator>,
    signer_address: String,
}

impl TransactionCoordinator {
    pub fn new(orchestrator: Arc<ConversationOrchestrator>, signer_address: impl Into<String>) -> Self {
        Self {
            orchestrator,
            signer_address: signer_address.into(),
        }
    }

    pub fn signer_address(&self) -> &str {
        &self.signer_address
    }

    /// Phase 1: lets the model build the transaction and extracts it.
    ///
    /// `network` is inferred from the request text when not given. Fails with
    /// `TransactionNotFound` when no `create_transaction` result carried both
    /// a `signing_payload` and a `blob`.
    pub async fn build(
        &self,
        request: &str,
        network: Option<Network>,
        cancel: &CancellationToken,
    ) -> AgentResult<PendingTransaction> {
        let network = network.unwrap_or_else(|| Network::infer_from_request(request));
        let mut conversation =
            Conversation::from_user_text(request).with_system(policy_preamble(&self.signer_address));
        let guard = TransactionGuard::build_phase(self.signer_address.clone());

        info!(
            "Transfer build phase started: signer={}, network={}",
            self.signer_address, network
        );
        let build = self.orchestrator.run(&mut conversation, &guard, cancel).await?;

        let unsigned = extract_unsigned_transaction(&conversation).inspect_err(|_| {
            warn!(
                "Build phase produced no unsigned transaction: tool_calls={}",
                build.tool_calls.len()
            );
        })?;
        info!(
            "Unsigned transaction extracted: payload_chars={}, blob_chars={}",
            unsigned.signing_payload.len(),
            unsigned.blob.len()
        );

        Ok(PendingTransaction {
            conversation,
            unsigned,
            network,
            build,
        })
    }

    /// Phase 2: gives the model the blob and signature and resumes the loop.
    ///
    /// Only a `submit_transaction` call carrying exactly this blob, signature
    /// and network is let through to the endpoint.
    pub async fn submit(
        &self,
        pending: PendingTransaction,
        signature: Signature,
        cancel: &CancellationToken,
    ) -> AgentResult<SubmittedTransaction> {
        let PendingTransaction {
            mut conversation,
            unsigned,
            network,
            ..
        } = pending;

        conversation.push_user_text(submit_request_text(
            &unsigned.blob,
            signature.as_str(),
            network,
        ));
        let guard = TransactionGuard::submit_phase(AuthorizedSubmission {
            blob: unsigned.blob,
            signature: signature.clone(),
            network,
        });

        info!("Transfer submit phase started: network={}", network);
        let outcome = self.orchestrator.run(&mut conversation, &guard, cancel).await?;

        let submitted = SubmittedTransaction {
            conversation,
            signature,
            network,
            outcome,
        };
        if submitted.submission_result().is_none() {
            warn!("Submit phase finished without a successful {} call", SUBMIT_TRANSACTION);
        }
        Ok(submitted)
    }

    /// Runs build, out-of-band signing and submit in sequence.
    pub async fn execute(
        &self,
        request: &str,
        network: Option<Network>,
        signer: &dyn TransactionSigner,
        cancel: &CancellationToken,
    ) -> AgentResult<SubmittedTransaction> {
        let pending = self.build(request, network, cancel).await?;
        let signature = signer.sign(pending.unsigned()).await?;
        self.submit(pending, signature, cancel).await
    }
}
