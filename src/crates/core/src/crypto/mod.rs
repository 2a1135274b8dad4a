//! Transaction signing primitives.
//!
//! Nothing in the agent loop calls into this module. It is the wallet side of
//! the two-phase flow and is reached only through a `TransactionSigner`.

pub mod bls;

pub use bls::{derive_public_key, reduce_secret_key, sign, verify, TX_DST};
