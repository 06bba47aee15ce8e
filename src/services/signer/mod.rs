//! Transaction signing.
//!
//! Key pairs are derived from family seeds ([`Keypair`]); [`LocalSigner`]
//! produces the signed blob and its hash. Randomness comes from an injected
//! [`EntropySource`] so signing can be made reproducible.
use serde::Serialize;
use thiserror::Error;

use crate::models::{SignedBlob, TxJson};

mod entropy;
pub use entropy::*;

mod keypair;
pub use keypair::*;

mod local_signer;
pub use local_signer::*;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SignerError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid transaction encoding: {0}")]
    Encoding(String),
}

/// A transaction together with its signed encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub tx_json: TxJson,
    pub blob: SignedBlob,
}

pub trait TransactionSigner: Send + Sync {
    /// Signs `tx_json` with `keypair`, replacing any existing signing fields.
    fn sign_transaction(
        &self,
        tx_json: &TxJson,
        keypair: &Keypair,
    ) -> Result<SignedTransaction, SignerError>;
}
