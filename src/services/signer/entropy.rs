//! Randomness used to hedge signature nonces and to generate wallets.
use k256::elliptic_curve::rand_core::{self, CryptoRng, RngCore};
use rand::RngCore as _;
use serde::Serialize;

use crate::{
    constants::FAMILY_SEED_LENGTH,
    models::FamilySeed,
    services::signer::{Keypair, SignerError},
};

/// Source of random bytes handed to the signer.
pub trait EntropySource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Operating system randomness through the thread-local `rand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Repeats a fixed byte pattern. Every call starts from the beginning of the
/// pattern, so signatures made with it are reproducible.
#[derive(Debug, Clone)]
pub struct FixedEntropy {
    pattern: Vec<u8>,
}

impl FixedEntropy {
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Default for FixedEntropy {
    fn default() -> Self {
        Self::new([0x5a; 32])
    }
}

impl EntropySource for FixedEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) {
        if self.pattern.is_empty() {
            dest.fill(0);
            return;
        }
        for (byte, value) in dest.iter_mut().zip(self.pattern.iter().cycle()) {
            *byte = *value;
        }
    }
}

/// Adapts an [`EntropySource`] to the RNG traits expected by `k256`.
pub(crate) struct EntropyRng<'a>(pub(crate) &'a dyn EntropySource);

impl RngCore for EntropyRng<'_> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        EntropySource::fill_bytes(self.0, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        EntropySource::fill_bytes(self.0, dest);
        Ok(())
    }
}

impl CryptoRng for EntropyRng<'_> {}

/// A freshly generated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub address: String,
    pub secret: String,
}

/// Generates a new family seed from `entropy` and derives its account.
pub fn generate_wallet(entropy: &dyn EntropySource) -> Result<Wallet, SignerError> {
    let mut bytes = zeroize::Zeroizing::new([0u8; FAMILY_SEED_LENGTH]);
    entropy.fill_bytes(bytes.as_mut_slice());

    let seed = FamilySeed::from_entropy(*bytes);
    let keypair = Keypair::from_seed(&seed)?;

    Ok(Wallet {
        address: keypair.address().to_string(),
        secret: seed.encode(),
    })
}
