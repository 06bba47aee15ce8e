//! Request validation.
//!
//! Runs before anything touches the network: addresses, secrets and options
//! are checked here so a malformed request never reaches the builder.
use serde_json::Value;
use tracing::debug;

use crate::{
    models::{AccountAddress, FamilySeed, SubmitOptions, TransactionError},
    services::signer::Keypair,
};

/// Validates `address` and, when present, that `secret` is the family seed
/// owning it. Returns the derived key pair when a secret was given.
///
/// With `secret_required` the absence of a secret is `MissingSecret`; an
/// empty secret counts as absent.
pub fn validate_address_and_secret(
    address: &str,
    secret: Option<&str>,
    secret_required: bool,
) -> Result<Option<Keypair>, TransactionError> {
    let account = AccountAddress::parse(address)?;

    let secret = secret.map(str::trim).filter(|s| !s.is_empty());
    let Some(secret) = secret else {
        if secret_required {
            return Err(TransactionError::MissingSecret);
        }
        return Ok(None);
    };

    let seed = FamilySeed::parse(secret)?;
    let keypair = Keypair::from_seed(&seed)?;
    if keypair.address() != &account {
        debug!(address = %account, "secret does not match source account");
        return Err(TransactionError::AddressSecretMismatch {
            address: account.to_string(),
        });
    }

    Ok(Some(keypair))
}

/// Parses and checks a raw options object against the declared option keys.
pub fn validate_options(raw: Option<&Value>) -> Result<SubmitOptions, TransactionError> {
    SubmitOptions::from_value(raw)
}
