use crate::{
    models::AddressError,
    services::{provider::ProviderError, signer::SignerError},
};

use eyre::Report;
use serde::Serialize;
use strum::IntoStaticStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
pub enum TransactionError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("A secret is required to sign and submit a transaction")]
    MissingSecret,

    #[error("Secret does not correspond to account {address}")]
    AddressSecretMismatch { address: String },

    #[error("Unrecognized option(s): {}", .0.join(", "))]
    UnrecognizedOption(Vec<String>),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Fee of {fee} drops exceeds the maximum of {max_fee} drops")]
    FeeExceedsMaximum { fee: u64, max_fee: u64 },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Signing failed: {0}")]
    SigningError(String),

    #[error("Transaction from {account} with sequence {sequence} is already pending")]
    AlreadyPending { account: String, sequence: u32 },

    #[error("Submission rejected ({engine_result}): {message}")]
    SubmissionRejected {
        engine_result: String,
        message: String,
    },

    #[error(
        "Transaction expired: LastLedgerSequence {last_ledger_sequence} passed at ledger {ledger_index}"
    )]
    Expired {
        last_ledger_sequence: u32,
        ledger_index: u32,
    },

    #[error("Tracking cancelled for transaction from {account} with sequence {sequence}")]
    Cancelled { account: String, sequence: u32 },
}

impl TransactionError {
    /// Stable name of the failure mode, e.g. `"Expired"`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Determines if the request may succeed when retried by the caller with a
    /// freshly built transaction (new sequence and validity window).
    ///
    /// **Retryable:**
    /// - `Expired`: the validity window passed without the transaction applying
    /// - `NetworkUnavailable`: the network client could not be reached
    /// - `Cancelled`: tracking was torn down before an outcome was known
    ///
    /// Everything else describes a problem with the request itself or a final
    /// network verdict and should be reported back to the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransactionError::Expired { .. } => true,
            TransactionError::NetworkUnavailable(_) => true,
            TransactionError::Cancelled { .. } => true,

            TransactionError::InvalidAddress(_)
            | TransactionError::InvalidSecret(_)
            | TransactionError::MissingSecret
            | TransactionError::AddressSecretMismatch { .. }
            | TransactionError::UnrecognizedOption(_)
            | TransactionError::InvalidOption(_)
            | TransactionError::UnsupportedTransactionType(_)
            | TransactionError::InvalidTransaction(_)
            | TransactionError::FeeExceedsMaximum { .. }
            | TransactionError::AccountNotFound(_)
            | TransactionError::SigningError(_)
            | TransactionError::AlreadyPending { .. }
            | TransactionError::SubmissionRejected { .. } => false,
        }
    }
}

impl From<AddressError> for TransactionError {
    fn from(error: AddressError) -> Self {
        match error {
            AddressError::InvalidAddress(msg) => TransactionError::InvalidAddress(msg),
            AddressError::InvalidSecret(msg) => TransactionError::InvalidSecret(msg),
        }
    }
}

impl From<SignerError> for TransactionError {
    fn from(error: SignerError) -> Self {
        TransactionError::SigningError(error.to_string())
    }
}

impl From<ProviderError> for TransactionError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::AccountNotFound(account) => TransactionError::AccountNotFound(account),
            other => TransactionError::NetworkUnavailable(other.to_string()),
        }
    }
}

impl From<Report> for TransactionError {
    fn from(err: Report) -> Self {
        TransactionError::NetworkUnavailable(err.to_string())
    }
}
