use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{parse_drops, TransactionError, TransactionType};

/// Canonical transaction object.
///
/// Common fields are typed; fields specific to the transaction type live in
/// `fields` and are flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxJson {
    pub transaction_type: TransactionType,
    pub account: String,
    pub sequence: u32,
    pub fee: String,
    pub flags: u32,
    pub last_ledger_sequence: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_pub_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_signature: Option<String>,
}

impl TxJson {
    pub fn fee_drops(&self) -> Result<u64, TransactionError> {
        parse_drops(&self.fee).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!("Fee {:?} is not a drops amount", self.fee))
        })
    }

    pub fn is_signed(&self) -> bool {
        self.txn_signature.is_some()
    }

    /// Copy of the transaction without `SigningPubKey` and `TxnSignature`.
    pub fn without_signature(&self) -> TxJson {
        TxJson {
            signing_pub_key: None,
            txn_signature: None,
            ..self.clone()
        }
    }

    pub fn to_value(&self) -> Result<Value, TransactionError> {
        serde_json::to_value(self).map_err(|e| TransactionError::InvalidTransaction(e.to_string()))
    }
}
