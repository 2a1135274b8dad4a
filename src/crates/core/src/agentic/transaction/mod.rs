//! Two-phase token transfer
//!
//! Build and extract, sign out-of-band, then submit with guarded arguments.

pub mod coordinator;
pub mod extract;
pub mod guard;
pub mod policy;
pub mod signer;

pub use coordinator::{PendingTransaction, SubmittedTransaction, TransactionCoordinator};
pub use extract::{extract_unsigned_transaction, find_unsigned_transaction, UnsignedTransaction};
pub use guard::{AuthorizedSubmission, TransactionGuard};
pub use policy::{
    policy_preamble, to_base_units, transfer_request_text, Network, CREATE_TRANSACTION,
    SUBMIT_TRANSACTION,
};
pub use signer::{LocalBlsSigner, Signature, TransactionSigner};
