//! Transfer policy: tool contract constants, network selection and the
//! instructions given to the model for each phase.

use crate::util::errors::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CREATE_TRANSACTION: &str = "create_transaction";
pub const SUBMIT_TRANSACTION: &str = "submit_transaction";
pub const TRANSFER_CONTRACT: &str = "Coin";
pub const TRANSFER_FUNCTION: &str = "transfer";

/// Base units per whole token.
pub const TOKEN_DECIMALS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Testnet unless the request names mainnet. A plain substring match, so
    /// callers that know the network should pass it explicitly.
    pub fn infer_from_request(request: &str) -> Self {
        if request.to_ascii_lowercase().contains("mainnet") {
            Network::Mainnet
        } else {
            Network::Testnet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a decimal token amount ("10", "0.5") to a base-unit digit string.
pub fn to_base_units(amount: &str) -> AgentResult<String> {
    let amount = amount.trim();
    let invalid = || AgentError::Validation(format!("invalid token amount: {:?}", amount));

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction.len() > TOKEN_DECIMALS {
        return Err(AgentError::Validation(format!(
            "token amount {} has more than {} decimals",
            amount, TOKEN_DECIMALS
        )));
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = TOKEN_DECIMALS);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Err(AgentError::Validation("token amount must be positive".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Natural-language transfer request handed to the model in phase 1.
pub fn transfer_request_text(
    signer: &str,
    to: &str,
    amount: &str,
    token: &str,
    network: Network,
) -> AgentResult<String> {
    let base_units = to_base_units(amount)?;
    let mut text = format!(
        "send {} {} from {} to {} ({} base units)",
        amount.trim(),
        token,
        signer,
        to,
        base_units
    );
    if network == Network::Mainnet {
        text.push_str(" on mainnet");
    }
    Ok(text)
}

/// System text for both transfer phases.
pub fn policy_preamble(signer: &str) -> String {
    format!(
        "You are an Amadeus blockchain agent acting for wallet {signer}.\n\
         \n\
         Token transfers happen in two phases.\n\
         \n\
         Phase 1: call `{create}` exactly once with\n\
         {{\"signer\": \"{signer}\", \"contract\": \"{contract}\", \"function\": \"{function}\", \
         \"args\": [{{\"b58\": \"<recipient address>\"}}, \"<amount in base units as a decimal string>\", \"<token symbol>\"]}}\n\
         One token is 10^{decimals} base units. Then stop and report the result. \
         Never call `{submit}` in this phase; the transaction has not been signed yet.\n\
         \n\
         Phase 2: once the conversation contains both the transaction blob and its signature, \
         call `{submit}` with {{\"transaction\": \"<blob>\", \"signature\": \"<signature>\", \
         \"network\": \"<network>\"}} using exactly the values given. Do not build a new transaction.\n\
         \n\
         Use network \"testnet\" unless the user explicitly asked for mainnet.",
        signer = signer,
        create = CREATE_TRANSACTION,
        submit = SUBMIT_TRANSACTION,
        contract = TRANSFER_CONTRACT,
        function = TRANSFER_FUNCTION,
        decimals = TOKEN_DECIMALS,
    )
}

/// User message that opens phase 2.
pub fn submit_request_text(blob: &str, signature: &str, network: Network) -> String {
    format!(
        "The transaction has been signed by the wallet.\n\
         blob: {blob}\n\
         signature: {signature}\n\
         network: {network}\n\
         Submit it now with `{submit}`.",
        blob = blob,
        signature = signature,
        network = network,
        submit = SUBMIT_TRANSACTION,
    )
}
