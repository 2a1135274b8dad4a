//! Argument validation for the transfer tools.
//!
//! Independent of what the policy text tells the model: a call that breaks
//! the contract is rejected before it reaches the endpoint.

use super::policy::{
    Network, CREATE_TRANSACTION, SUBMIT_TRANSACTION, TRANSFER_CONTRACT, TRANSFER_FUNCTION,
};
use super::signer::Signature;
use crate::agentic::tools::ToolCallGuard;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// Values the phase 2 submit call must carry verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedSubmission {
    pub blob: String,
    pub signature: Signature,
    pub network: Network,
}

#[derive(Debug)]
pub enum TransactionGuard {
    /// Phase 1: shape-checked `create_transaction`, no `submit_transaction`.
    Build { signer: String },
    /// Phase 2: the authorized submission may be broadcast once.
    Submit {
        submission: AuthorizedSubmission,
        submitted: AtomicBool,
    },
}

impl TransactionGuard {
    pub fn build_phase(signer: impl Into<String>) -> Self {
        Self::Build {
            signer: signer.into(),
        }
    }

    pub fn submit_phase(submission: AuthorizedSubmission) -> Self {
        Self::Submit {
            submission,
            submitted: AtomicBool::new(false),
        }
    }
}

impl ToolCallGuard for TransactionGuard {
    fn check(&self, name: &str, input: &Value) -> Result<(), String> {
        match (self, name) {
            (Self::Build { .. }, SUBMIT_TRANSACTION) => Err(format!(
                "{} is not allowed before the wallet has signed the transaction",
                SUBMIT_TRANSACTION
            )),
            (Self::Build { signer }, CREATE_TRANSACTION) => check_create_arguments(input, signer),
            (Self::Submit { .. }, CREATE_TRANSACTION) => Err(format!(
                "a transaction is already awaiting submission; {} is not allowed",
                CREATE_TRANSACTION
            )),
            (
                Self::Submit {
                    submission,
                    submitted,
                },
                SUBMIT_TRANSACTION,
            ) => {
                check_submit_arguments(input, submission)?;
                // Claimed at check time, so two calls in one batch cannot both pass.
                if submitted.swap(true, Ordering::SeqCst) {
                    return Err("this transaction has already been submitted".to_string());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn string_field<'a>(input: &'a Value, field: &str) -> Result<&'a str, String> {
    input
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("`{}` must be a non-empty string", field))
}

fn expect_field(input: &Value, field: &str, expected: &str) -> Result<(), String> {
    let actual = string_field(input, field)?;
    if actual != expected {
        return Err(format!("`{}` must be {:?}, got {:?}", field, expected, actual));
    }
    Ok(())
}

/// `{signer, contract:"Coin", function:"transfer", args:[{b58}, "<digits>", "<symbol>"]}`
pub fn check_create_arguments(input: &Value, signer: &str) -> Result<(), String> {
    if !input.is_object() {
        return Err("arguments must be an object".to_string());
    }
    expect_field(input, "signer", signer)?;
    expect_field(input, "contract", TRANSFER_CONTRACT)?;
    expect_field(input, "function", TRANSFER_FUNCTION)?;

    let args = input
        .get("args")
        .and_then(Value::as_array)
        .ok_or_else(|| "`args` must be an array".to_string())?;
    let [recipient, amount, symbol] = args.as_slice() else {
        return Err(format!(
            "`args` must be [{{b58: recipient}}, amount, symbol], got {} items",
            args.len()
        ));
    };

    let recipient_ok = recipient
        .as_object()
        .filter(|map| map.len() == 1)
        .and_then(|map| map.get("b58"))
        .and_then(Value::as_str)
        .is_some_and(|address| !address.is_empty());
    if !recipient_ok {
        return Err("`args[0]` must be {\"b58\": <recipient address>}".to_string());
    }

    let amount_ok = amount
        .as_str()
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
    if !amount_ok {
        return Err("`args[1]` must be the amount in base units as a decimal string".to_string());
    }

    if !symbol.as_str().is_some_and(|s| !s.is_empty()) {
        return Err("`args[2]` must be the token symbol".to_string());
    }
    Ok(())
}

pub fn check_submit_arguments(input: &Value, submission: &AuthorizedSubmission) -> Result<(), String> {
    let transaction = string_field(input, "transaction")?;
    if transaction != submission.blob {
        return Err("`transaction` does not match the signed blob".to_string());
    }
    let signature = string_field(input, "signature")?;
    if signature != submission.signature.as_str() {
        return Err("`signature` does not match the wallet signature".to_string());
    }
    expect_field(input, "network", submission.network.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_args() -> Value {
        json!({
            "signer": "A",
            "contract": "Coin",
            "function": "transfer",
            "args": [{"b58": "B"}, "10000000000", "AMA"]
        })
    }

    fn submission() -> AuthorizedSubmission {
        AuthorizedSubmission {
            blob: "abcd".to_string(),
            signature: Signature::new("sig58").unwrap(),
            network: Network::Testnet,
        }
    }

    #[test]
    fn build_phase_accepts_exact_shape_and_read_tools() {
        let guard = TransactionGuard::build_phase("A");
        assert!(guard.check(CREATE_TRANSACTION, &create_args()).is_ok());
        assert!(guard.check("get_account_balance", &json!({"address": "A"})).is_ok());
    }

    #[test]
    fn build_phase_rejects_submit() {
        let guard = TransactionGuard::build_phase("A");
        let err = guard
            .check(
                SUBMIT_TRANSACTION,
                &json!({"transaction": "abcd", "signature": "x", "network": "testnet"}),
            )
            .unwrap_err();
        assert!(err.contains("not allowed"));
    }

    #[test]
    fn build_phase_rejects_malformed_create() {
        let guard = TransactionGuard::build_phase("A");
        let cases = [
            ("signer", json!("C")),
            ("contract", json!("Token")),
            ("function", json!("mint")),
            ("args", json!([{"b58": "B"}, "10", "AMA", "extra"])),
            ("args", json!(["B", "10", "AMA"])),
            ("args", json!([{"b58": "B"}, "10.5", "AMA"])),
            ("args", json!([{"b58": "B"}, 10, "AMA"])),
            ("args", json!([{"b58": "B"}, "10", ""])),
        ];
        for (field, value) in cases {
            let mut args = create_args();
            args[field] = value;
            assert!(
                guard.check(CREATE_TRANSACTION, &args).is_err(),
                "{} = {} should be rejected",
                field,
                args[field]
            );
        }
        assert!(guard.check(CREATE_TRANSACTION, &json!([])).is_err());
    }

    #[test]
    fn submit_phase_requires_exact_blob_signature_and_network() {
        let guard = TransactionGuard::submit_phase(submission());
        let ok = json!({"transaction": "abcd", "signature": "sig58", "network": "testnet"});
        assert!(guard.check(SUBMIT_TRANSACTION, &ok).is_ok());

        for (field, value) in [
            ("transaction", json!("abce")),
            ("signature", json!("")),
            ("signature", json!("other")),
            ("network", json!("mainnet")),
        ] {
            let mut args = ok.clone();
            args[field] = value;
            assert!(guard.check(SUBMIT_TRANSACTION, &args).is_err());
        }

        let mut missing = ok.clone();
        missing.as_object_mut().unwrap().remove("signature");
        assert!(guard.check(SUBMIT_TRANSACTION, &missing).is_err());
        assert!(guard.check(CREATE_TRANSACTION, &create_args()).is_err());
    }

    #[test]
    fn authorized_submission_passes_only_once() {
        let guard = TransactionGuard::submit_phase(submission());
        let ok = json!({"transaction": "abcd", "signature": "sig58", "network": "testnet"});
        let bad = json!({"transaction": "abcd", "signature": "forged", "network": "testnet"});

        assert!(guard.check(SUBMIT_TRANSACTION, &bad).is_err());
        assert!(guard.check(SUBMIT_TRANSACTION, &ok).is_ok());
        let err = guard.check(SUBMIT_TRANSACTION, &ok).unwrap_err();
        assert!(err.contains("already been submitted"));
    }
}
