use serde::{Deserialize, Serialize};

use crate::constants::NATIVE_CURRENCY;
use crate::models::{AccountAddress, TransactionError};

/// Largest native amount that can exist (100 billion XRP in drops)
const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// An amount as it appears on the wire: either a string of native drops or an
/// issued currency amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Drops(String),
    Issued(IssuedAmount),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuedAmount {
    pub currency: String,
    pub value: String,
    pub issuer: String,
}

impl Amount {
    pub fn drops(drops: u64) -> Self {
        Amount::Drops(drops.to_string())
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Drops(_))
    }

    /// Validates the amount; `field` names it in error messages.
    pub fn validate(&self, field: &str, allow_zero: bool) -> Result<(), TransactionError> {
        match self {
            Amount::Drops(drops) => {
                let parsed = parse_drops(drops).ok_or_else(|| {
                    TransactionError::InvalidTransaction(format!(
                        "{field} must be a whole number of drops, got {drops:?}"
                    ))
                })?;
                if parsed > MAX_DROPS {
                    return Err(TransactionError::InvalidTransaction(format!(
                        "{field} exceeds the maximum native amount"
                    )));
                }
                if parsed == 0 && !allow_zero {
                    return Err(TransactionError::InvalidTransaction(format!(
                        "{field} must be greater than zero"
                    )));
                }
                Ok(())
            }
            Amount::Issued(issued) => issued.validate(field, allow_zero),
        }
    }
}

impl IssuedAmount {
    fn validate(&self, field: &str, allow_zero: bool) -> Result<(), TransactionError> {
        if !is_valid_currency(&self.currency) {
            return Err(TransactionError::InvalidTransaction(format!(
                "{field}.currency {:?} is not a valid issued currency code",
                self.currency
            )));
        }

        let value: f64 = self.value.trim().parse().map_err(|_| {
            TransactionError::InvalidTransaction(format!(
                "{field}.value {:?} is not a decimal number",
                self.value
            ))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(TransactionError::InvalidTransaction(format!(
                "{field}.value must be a non-negative number"
            )));
        }
        if value == 0.0 && !allow_zero {
            return Err(TransactionError::InvalidTransaction(format!(
                "{field}.value must be greater than zero"
            )));
        }

        AccountAddress::parse(&self.issuer)
            .map_err(|_| TransactionError::InvalidAddress(format!("{field}.issuer")))?;
        Ok(())
    }
}

/// Parses a drops string; only plain decimal digits are accepted.
pub fn parse_drops(drops: &str) -> Option<u64> {
    if drops.is_empty() || !drops.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    drops.parse().ok()
}

/// Three character ISO-style codes (other than the native code) or 160-bit hex codes.
fn is_valid_currency(code: &str) -> bool {
    match code.len() {
        3 => {
            code.bytes().all(|b| b.is_ascii_alphanumeric())
                && !code.eq_ignore_ascii_case(NATIVE_CURRENCY)
        }
        40 => code.bytes().all(|b| b.is_ascii_hexdigit()) && code.bytes().any(|b| b != b'0'),
        _ => false,
    }
}
