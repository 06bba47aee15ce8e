use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{TransactionError, TxJson};

/// Hex encoded signed transaction and its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedBlob {
    pub tx_blob: String,
    pub hash: String,
}

/// A built transaction, signed when a secret was supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedTransaction {
    pub tx_json: TxJson,
    #[serde(flatten)]
    pub signed: Option<SignedBlob>,
}

/// A transaction the network included in a validated ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedTransaction {
    #[serde(flatten)]
    pub prepared: PreparedTransaction,
    pub state: &'static str,
    pub ledger: u32,
    pub engine_result: String,
}

/// Output of the pipeline before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Prepared(PreparedTransaction),
    Submitted(SubmittedTransaction),
}

impl TransactionOutcome {
    pub fn tx_json(&self) -> &TxJson {
        match self {
            Self::Prepared(p) => &p.tx_json,
            Self::Submitted(s) => &s.prepared.tx_json,
        }
    }

    pub fn signed(&self) -> Option<&SignedBlob> {
        match self {
            Self::Prepared(p) => p.signed.as_ref(),
            Self::Submitted(s) => s.prepared.signed.as_ref(),
        }
    }

    /// The outcome as a JSON object: `tx_json`, `tx_blob`/`hash` when signed,
    /// and `state`/`ledger`/`engine_result` once submitted.
    pub fn to_json_map(&self) -> Result<Map<String, Value>, TransactionError> {
        let value = match self {
            Self::Prepared(p) => serde_json::to_value(p),
            Self::Submitted(s) => serde_json::to_value(s),
        }
        .map_err(|e| TransactionError::InvalidTransaction(e.to_string()))?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(TransactionError::InvalidTransaction(format!(
                "outcome did not serialize to an object: {other}"
            ))),
        }
    }
}
