//! Submission options.
//!
//! The set of accepted option keys is declared by [`SubmitOptionKey`]; any
//! other key is rejected rather than ignored.
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use strum::{EnumString, IntoStaticStr};

use crate::models::{parse_drops, TransactionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubmitOptionKey {
    /// `false` prepares (and optionally signs) without submitting
    Submit,
    /// Exact fee in drops, bypassing the network fee lookup
    FixedFee,
    /// Ceiling in drops for the computed or fixed fee
    MaxFee,
}

impl SubmitOptionKey {
    pub const ALL: [SubmitOptionKey; 3] = [
        SubmitOptionKey::Submit,
        SubmitOptionKey::FixedFee,
        SubmitOptionKey::MaxFee,
    ];

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOptions {
    /// False only when the request carried exactly `"submit": false`.
    pub submit: bool,
    pub fixed_fee: Option<u64>,
    pub max_fee: Option<u64>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            submit: true,
            fixed_fee: None,
            max_fee: None,
        }
    }
}

impl SubmitOptions {
    pub fn prepare_only() -> Self {
        Self {
            submit: false,
            ..Default::default()
        }
    }

    /// Parses a raw options object.
    ///
    /// Every key outside [`SubmitOptionKey`] is collected and reported in a
    /// single `UnrecognizedOption` error. Only the exact boolean `false`
    /// disables submission; any other `submit` value keeps it enabled.
    pub fn from_value(raw: Option<&Value>) -> Result<Self, TransactionError> {
        let map = match raw {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(TransactionError::InvalidOption(format!(
                    "options must be an object, got {other}"
                )))
            }
        };

        let mut recognized = Vec::with_capacity(map.len());
        let mut unrecognized = Vec::new();
        for (key, value) in map {
            match SubmitOptionKey::from_str(key) {
                Ok(option_key) => recognized.push((option_key, value)),
                Err(_) => unrecognized.push(key.clone()),
            }
        }
        if !unrecognized.is_empty() {
            unrecognized.sort();
            return Err(TransactionError::UnrecognizedOption(unrecognized));
        }

        let mut options = Self::default();
        for (option_key, value) in recognized {
            let key = option_key.as_str();
            match option_key {
                SubmitOptionKey::Submit => options.submit = *value != Value::Bool(false),
                SubmitOptionKey::FixedFee => options.fixed_fee = parse_fee_option(key, value)?,
                SubmitOptionKey::MaxFee => options.max_fee = parse_fee_option(key, value)?,
            }
        }

        options.validate()?;
        Ok(options)
    }

    /// Checks that the options agree with each other.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if let (Some(fixed_fee), Some(max_fee)) = (self.fixed_fee, self.max_fee) {
            if fixed_fee > max_fee {
                return Err(TransactionError::InvalidOption(format!(
                    "fixed_fee ({fixed_fee}) exceeds max_fee ({max_fee})"
                )));
            }
        }
        Ok(())
    }
}

fn parse_fee_option(key: &str, value: &Value) -> Result<Option<u64>, TransactionError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(Some).ok_or_else(|| {
            TransactionError::InvalidOption(format!("{key} must be a whole number of drops"))
        }),
        Value::String(s) => parse_drops(s).map(Some).ok_or_else(|| {
            TransactionError::InvalidOption(format!("{key} must be a whole number of drops"))
        }),
        other => Err(TransactionError::InvalidOption(format!(
            "{key} must be a number of drops, got {other}"
        ))),
    }
}
