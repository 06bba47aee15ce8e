//! Shapes pipeline outcomes into response objects.
use serde_json::{Map, Value};

use crate::models::{TransactionError, TransactionOutcome};

/// Adds caller-specific fields to a response. Fields returned here replace
/// base fields with the same key.
pub trait ResponseConverter {
    fn convert(&self, outcome: &TransactionOutcome) -> Map<String, Value>;
}

impl<F> ResponseConverter for F
where
    F: Fn(&TransactionOutcome) -> Map<String, Value>,
{
    fn convert(&self, outcome: &TransactionOutcome) -> Map<String, Value> {
        self(outcome)
    }
}

/// Returns the base response unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConversion;

impl ResponseConverter for NoConversion {
    fn convert(&self, _outcome: &TransactionOutcome) -> Map<String, Value> {
        Map::new()
    }
}

pub fn format_response<C>(
    outcome: &TransactionOutcome,
    converter: &C,
) -> Result<Map<String, Value>, TransactionError>
where
    C: ResponseConverter + ?Sized,
{
    let mut response = outcome.to_json_map()?;
    response.extend(converter.convert(outcome));
    Ok(response)
}
