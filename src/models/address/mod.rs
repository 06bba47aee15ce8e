//! Account addresses and family seeds.
//!
//! Both are base58check strings over the ripple alphabet: addresses carry a
//! 20-byte account id (version `0x00`, `r...`), family seeds carry 16 bytes of
//! key material (version `0x21`, `s...`).
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::constants::{
    ACCOUNT_ID_LENGTH, ACCOUNT_ID_VERSION, FAMILY_SEED_LENGTH, FAMILY_SEED_VERSION,
};

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum AddressError {
    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
}

fn decode_versioned(encoded: &str, version: u8, len: usize) -> Option<Vec<u8>> {
    let decoded = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check(Some(version))
        .into_vec()
        .ok()?;
    // The decoded payload still carries the version byte.
    match decoded.split_first() {
        Some((v, payload)) if *v == version && payload.len() == len => Some(payload.to_vec()),
        _ => None,
    }
}

fn encode_versioned(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.push(version);
    bytes.extend_from_slice(payload);
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// A syntactically valid classic account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress {
    encoded: String,
    account_id: [u8; ACCOUNT_ID_LENGTH],
}

impl AccountAddress {
    pub fn from_account_id(account_id: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        Self {
            encoded: encode_versioned(ACCOUNT_ID_VERSION, &account_id),
            account_id,
        }
    }

    pub fn parse(encoded: &str) -> Result<Self, AddressError> {
        let payload = decode_versioned(encoded, ACCOUNT_ID_VERSION, ACCOUNT_ID_LENGTH)
            .ok_or_else(|| AddressError::InvalidAddress(encoded.to_string()))?;
        let mut account_id = [0u8; ACCOUNT_ID_LENGTH];
        account_id.copy_from_slice(&payload);
        Ok(Self {
            encoded: encoded.to_string(),
            account_id,
        })
    }

    /// Returns true when `encoded` is a well formed account address.
    pub fn is_valid(encoded: &str) -> bool {
        Self::parse(encoded).is_ok()
    }

    pub fn account_id(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.account_id
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::parse(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Secret key material for a secp256k1 account, in family seed form.
///
/// The seed bytes are wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct FamilySeed(Zeroizing<[u8; FAMILY_SEED_LENGTH]>);

impl FamilySeed {
    pub fn from_entropy(entropy: [u8; FAMILY_SEED_LENGTH]) -> Self {
        Self(Zeroizing::new(entropy))
    }

    pub fn parse(encoded: &str) -> Result<Self, AddressError> {
        let payload = decode_versioned(encoded, FAMILY_SEED_VERSION, FAMILY_SEED_LENGTH)
            .map(Zeroizing::new)
            .ok_or_else(|| {
                AddressError::InvalidSecret("not a valid family seed".to_string())
            })?;
        let mut entropy = [0u8; FAMILY_SEED_LENGTH];
        entropy.copy_from_slice(&payload);
        Ok(Self::from_entropy(entropy))
    }

    pub fn as_bytes(&self) -> &[u8; FAMILY_SEED_LENGTH] {
        &self.0
    }

    /// Encodes the seed back into its `s...` string form.
    pub fn encode(&self) -> String {
        encode_versioned(FAMILY_SEED_VERSION, self.0.as_ref())
    }
}

impl fmt::Debug for FamilySeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FamilySeed(<redacted>)")
    }
}

impl PartialEq for FamilySeed {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}
