//! # Local Signer
//!
//! Signs transactions in-process with a key pair derived from the request's
//! family seed. Signature nonces are hedged with bytes from the injected
//! [`EntropySource`].
use std::sync::Arc;

use k256::ecdsa::{signature::hazmat::RandomizedPrehashSigner, Signature};
use serde_json::Value;

use crate::{
    constants::{HASH_PREFIX_TRANSACTION_ID, HASH_PREFIX_TX_SIGN},
    models::{AccountAddress, SignedBlob, TxJson},
    services::signer::{
        account_id_from_public_key, verify_prehash, EntropyRng, EntropySource, Keypair,
        OsEntropy, SignedTransaction, SignerError, TransactionSigner,
    },
    utils::{canonical_json, sha512_half},
};

pub struct LocalSigner {
    entropy: Arc<dyn EntropySource>,
}

impl LocalSigner {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }
}

impl Default for LocalSigner {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl TransactionSigner for LocalSigner {
    fn sign_transaction(
        &self,
        tx_json: &TxJson,
        keypair: &Keypair,
    ) -> Result<SignedTransaction, SignerError> {
        let mut tx = tx_json.without_signature();
        tx.signing_pub_key = Some(keypair.public_key_hex());

        let prehash = signing_hash(&tx)?;
        let mut rng = EntropyRng(self.entropy.as_ref());
        let signature: Signature = keypair
            .signing_key()
            .sign_prehash_with_rng(&mut rng, &prehash)
            .map_err(|e| SignerError::SigningError(format!("failed to sign transaction: {e}")))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        tx.txn_signature = Some(hex::encode_upper(signature.to_der().as_bytes()));

        // gateway blob encoding, see `decode_tx_blob`
        let blob_bytes = canonical_bytes(&tx)?;
        let blob = SignedBlob {
            hash: transaction_hash(&blob_bytes),
            tx_blob: hex::encode_upper(&blob_bytes),
        };

        Ok(SignedTransaction { tx_json: tx, blob })
    }
}

fn canonical_bytes(tx: &TxJson) -> Result<Vec<u8>, SignerError> {
    let value = serde_json::to_value(tx).map_err(|e| SignerError::Encoding(e.to_string()))?;
    canonical_json(&value).map_err(|e| SignerError::Encoding(e.to_string()))
}

/// Digest signed by the account key: the transaction with `SigningPubKey`
/// set and without `TxnSignature`.
fn signing_hash(tx: &TxJson) -> Result<[u8; 32], SignerError> {
    let mut unsigned = tx.clone();
    unsigned.txn_signature = None;
    let bytes = canonical_bytes(&unsigned)?;
    Ok(sha512_half(&[&HASH_PREFIX_TX_SIGN, &bytes]))
}

/// Transaction id of an encoded blob, as upper-case hex.
pub fn transaction_hash(blob_bytes: &[u8]) -> String {
    hex::encode_upper(sha512_half(&[&HASH_PREFIX_TRANSACTION_ID, blob_bytes]))
}

/// Decodes a hex blob back into its transaction. The blob must be the
/// canonical encoding of the transaction it carries.
///
/// Blobs are the upper-case hex of the transaction's sorted-key JSON. This
/// encoding is private to the gateway and its [`NetworkClient`] adapters; it
/// is not the ledger's binary serialization, so a blob cannot be handed to a
/// node's `submit` method as is.
///
/// [`NetworkClient`]: crate::services::provider::NetworkClient
pub fn decode_tx_blob(tx_blob: &str) -> Result<(TxJson, SignedBlob), SignerError> {
    let bytes = hex::decode(tx_blob.trim())
        .map_err(|e| SignerError::Encoding(format!("tx_blob is not hex: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| SignerError::Encoding(format!("tx_blob is not a transaction: {e}")))?;
    let canonical =
        canonical_json(&value).map_err(|e| SignerError::Encoding(e.to_string()))?;
    if canonical != bytes {
        return Err(SignerError::Encoding(
            "tx_blob is not canonically encoded".to_string(),
        ));
    }

    let tx: TxJson = serde_json::from_value(value)
        .map_err(|e| SignerError::Encoding(format!("tx_blob is not a transaction: {e}")))?;
    let blob = SignedBlob {
        hash: transaction_hash(&bytes),
        tx_blob: hex::encode_upper(&bytes),
    };
    Ok((tx, blob))
}

/// Checks that `tx` carries a valid signature from the key that owns its
/// `Account`.
pub fn verify_transaction(tx: &TxJson) -> Result<(), SignerError> {
    let public_key_hex = tx
        .signing_pub_key
        .as_deref()
        .ok_or_else(|| SignerError::InvalidSignature("missing SigningPubKey".to_string()))?;
    let signature_hex = tx
        .txn_signature
        .as_deref()
        .ok_or_else(|| SignerError::InvalidSignature("missing TxnSignature".to_string()))?;

    let public_key = hex::decode(public_key_hex)
        .map_err(|e| SignerError::InvalidSignature(format!("SigningPubKey is not hex: {e}")))?;
    let der = hex::decode(signature_hex)
        .map_err(|e| SignerError::InvalidSignature(format!("TxnSignature is not hex: {e}")))?;

    let account = AccountAddress::parse(&tx.account)
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;
    if account_id_from_public_key(&public_key) != *account.account_id() {
        return Err(SignerError::InvalidSignature(format!(
            "SigningPubKey does not belong to {}",
            tx.account
        )));
    }

    verify_prehash(&public_key, &signing_hash(tx)?, &der)
}
