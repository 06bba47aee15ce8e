//! secp256k1 key derivation from family seeds.
//!
//! The account key is derived in two steps: a root key from the seed, then an
//! intermediate key from the root public key. The account's private key is
//! their sum modulo the group order.
use k256::{
    ecdsa::{signature::hazmat::PrehashVerifier, Signature, SigningKey, VerifyingKey},
    NonZeroScalar, Scalar,
};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

use crate::{
    constants::ACCOUNT_ID_LENGTH,
    models::{AccountAddress, FamilySeed},
    services::signer::SignerError,
};

/// Index of the derived account key; only the first account is used.
const ACCOUNT_INDEX: u32 = 0;

/// The account key pair derived from a family seed.
pub struct Keypair {
    signing_key: SigningKey,
    public_key: [u8; 33],
    address: AccountAddress,
}

impl Keypair {
    pub fn from_seed(seed: &FamilySeed) -> Result<Self, SignerError> {
        let root = derive_scalar(seed.as_bytes(), None)?;
        let root_public = compressed_public_key(root.verifying_key());

        let intermediate = derive_scalar(&root_public, Some(ACCOUNT_INDEX))?;

        let sum: Scalar = **root.as_nonzero_scalar() + **intermediate.as_nonzero_scalar();
        let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(sum)).ok_or_else(|| {
            SignerError::KeyDerivation("derived private key is zero".to_string())
        })?;
        let signing_key = SigningKey::from(scalar);

        let public_key = compressed_public_key(signing_key.verifying_key());
        let address = AccountAddress::from_account_id(account_id_from_public_key(&public_key));

        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    pub fn address(&self) -> &AccountAddress {
        &self.address
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    /// Compressed public key as upper-case hex, the form used in `SigningPubKey`.
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Hashes `bytes` (plus the optional account index) with an increasing
/// 32-bit counter until the digest is a valid private key.
fn derive_scalar(bytes: &[u8], account_index: Option<u32>) -> Result<SigningKey, SignerError> {
    for counter in 0..=u32::MAX {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        if let Some(index) = account_index {
            hasher.update(index.to_be_bytes());
        }
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        if let Ok(key) = SigningKey::from_slice(&digest[..32]) {
            return Ok(key);
        }
    }
    Err(SignerError::KeyDerivation(
        "no valid private key in derivation range".to_string(),
    ))
}

fn compressed_public_key(key: &VerifyingKey) -> [u8; 33] {
    let point = key.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(point.as_bytes());
    out
}

/// RIPEMD160(SHA256(public key)).
pub fn account_id_from_public_key(public_key: &[u8]) -> [u8; ACCOUNT_ID_LENGTH] {
    let sha = Sha256::digest(public_key);
    let ripe = Ripemd160::digest(sha);
    let mut account_id = [0u8; ACCOUNT_ID_LENGTH];
    account_id.copy_from_slice(&ripe);
    account_id
}

/// Checks a DER signature over `prehash`. High-S signatures are rejected
/// because the ledger only accepts fully canonical signatures.
pub fn verify_prehash(
    public_key: &[u8],
    prehash: &[u8; 32],
    der_signature: &[u8],
) -> Result<(), SignerError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|e| SignerError::InvalidSignature(format!("invalid public key: {e}")))?;
    let signature = Signature::from_der(der_signature)
        .map_err(|e| SignerError::InvalidSignature(format!("malformed signature: {e}")))?;

    if signature.normalize_s().is_some() {
        return Err(SignerError::InvalidSignature(
            "signature is not fully canonical".to_string(),
        ));
    }

    verifying_key
        .verify_prehash(prehash, &signature)
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))
}
