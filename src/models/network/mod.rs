//! Values exchanged with the ledger network client.
use serde::{Deserialize, Serialize};

use crate::constants::{ENGINE_RESULT_PROVISIONAL_PREFIXES, ENGINE_RESULT_SUCCESS};

/// Network state a transaction is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    /// Index of the most recently closed ledger
    pub ledger_index: u32,
    /// Next sequence number of the source account
    pub account_sequence: u32,
    /// Current base fee in drops
    pub base_fee: u64,
}

/// Preliminary result returned by the network when a blob is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub engine_result: String,
    pub engine_result_message: String,
}

impl SubmitResponse {
    pub fn new(engine_result: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            engine_result: engine_result.into(),
            engine_result_message: message.into(),
        }
    }

    /// True when the final outcome depends on ledger inclusion (`tes`, `ter`, `tec`).
    pub fn is_provisional(&self) -> bool {
        ENGINE_RESULT_PROVISIONAL_PREFIXES
            .iter()
            .any(|prefix| self.engine_result.starts_with(prefix))
    }

    /// True when the network refused the transaction outright (`tem`, `tef`,
    /// `tel` or an unknown code).
    pub fn is_rejected(&self) -> bool {
        !self.is_provisional()
    }
}

/// A transaction observed in a validated ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub account: String,
    pub sequence: u32,
    pub hash: String,
    pub ledger_index: u32,
    pub engine_result: String,
}

impl Confirmation {
    pub fn is_success(&self) -> bool {
        self.engine_result == ENGINE_RESULT_SUCCESS
    }
}

/// Notifications pushed by the network client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkEvent {
    LedgerClosed { ledger_index: u32 },
    TransactionConfirmed(Confirmation),
    /// The connection to the network was torn down.
    Disconnected,
}
