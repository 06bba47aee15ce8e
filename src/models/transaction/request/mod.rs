//! Transaction requests as they arrive from the HTTP layer.
//!
//! A request body is a JSON object holding the intent's fields plus the
//! optional `secret` and `options` keys; the transaction type comes from the
//! route (`POST /transaction/prepare/{type}`).
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use crate::models::{Amount, SubmitOptions, TransactionError};

/// Transaction types understood by the builder. Both the ledger name
/// (`Payment`) and the route name (`payment`) parse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum TransactionType {
    #[strum(to_string = "Payment", serialize = "payment")]
    Payment,
    #[strum(to_string = "TrustSet", serialize = "trustline")]
    TrustSet,
    #[strum(to_string = "OfferCreate", serialize = "order")]
    OfferCreate,
    #[strum(to_string = "OfferCancel", serialize = "order_cancellation")]
    OfferCancel,
    #[strum(to_string = "AccountSet", serialize = "settings")]
    AccountSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentIntent {
    pub source_account: String,
    pub destination_account: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_max: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustlineIntent {
    pub source_account: String,
    pub limit_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_out: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderIntent {
    pub source_account: String,
    pub taker_pays: Amount,
    pub taker_gets: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderCancellationIntent {
    pub source_account: String,
    pub offer_sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsIntent {
    pub source_account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_flag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_flag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_rate: Option<u32>,
}

/// The logical intent of a transaction, before network state is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionIntent {
    Payment(PaymentIntent),
    Trustline(TrustlineIntent),
    Order(OrderIntent),
    OrderCancellation(OrderCancellationIntent),
    Settings(SettingsIntent),
}

impl TransactionIntent {
    /// Parses the intent fields for the given transaction type name.
    pub fn from_json(type_name: &str, json: Value) -> Result<Self, TransactionError> {
        let transaction_type = TransactionType::from_str(type_name)
            .map_err(|_| TransactionError::UnsupportedTransactionType(type_name.to_string()))?;

        let invalid = |e: serde_json::Error| TransactionError::InvalidTransaction(e.to_string());
        let intent = match transaction_type {
            TransactionType::Payment => Self::Payment(serde_json::from_value(json).map_err(invalid)?),
            TransactionType::TrustSet => {
                Self::Trustline(serde_json::from_value(json).map_err(invalid)?)
            }
            TransactionType::OfferCreate => {
                Self::Order(serde_json::from_value(json).map_err(invalid)?)
            }
            TransactionType::OfferCancel => {
                Self::OrderCancellation(serde_json::from_value(json).map_err(invalid)?)
            }
            TransactionType::AccountSet => {
                Self::Settings(serde_json::from_value(json).map_err(invalid)?)
            }
        };
        Ok(intent)
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Payment(_) => TransactionType::Payment,
            Self::Trustline(_) => TransactionType::TrustSet,
            Self::Order(_) => TransactionType::OfferCreate,
            Self::OrderCancellation(_) => TransactionType::OfferCancel,
            Self::Settings(_) => TransactionType::AccountSet,
        }
    }

    pub fn source_account(&self) -> &str {
        match self {
            Self::Payment(i) => &i.source_account,
            Self::Trustline(i) => &i.source_account,
            Self::Order(i) => &i.source_account,
            Self::OrderCancellation(i) => &i.source_account,
            Self::Settings(i) => &i.source_account,
        }
    }
}

/// A complete request: what to do, who signs it and how far to take it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub intent: TransactionIntent,
    pub secret: Option<String>,
    pub options: SubmitOptions,
}

impl TransactionRequest {
    pub fn new(intent: TransactionIntent) -> Self {
        Self {
            intent,
            secret: None,
            options: SubmitOptions::default(),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_options(mut self, options: SubmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses a request body. Option keys are checked against the declared
    /// option schema before anything else so that a misspelled option never
    /// reaches the pipeline.
    pub fn from_json(type_name: &str, body: Value) -> Result<Self, TransactionError> {
        let mut fields: Map<String, Value> = match body {
            Value::Object(map) => map,
            other => {
                return Err(TransactionError::InvalidTransaction(format!(
                    "request body must be a JSON object, got {other}"
                )))
            }
        };

        let options = SubmitOptions::from_value(fields.remove("options").as_ref())?;
        let secret = match fields.remove("secret") {
            None | Some(Value::Null) => None,
            Some(Value::String(secret)) => Some(secret),
            Some(_) => {
                return Err(TransactionError::InvalidSecret(
                    "secret must be a string".to_string(),
                ))
            }
        };
        let intent = TransactionIntent::from_json(type_name, Value::Object(fields))?;

        Ok(Self {
            intent,
            secret,
            options,
        })
    }
}
