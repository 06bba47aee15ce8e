//! Builds canonical transaction objects from intents.
//!
//! The builder is pure: the network state it needs is fetched by the caller,
//! so identical inputs always produce identical transactions.
use serde_json::{json, Map, Value};

use crate::{
    config::GatewayConfig,
    constants::{LAST_LEDGER_OFFSET, MAX_DOMAIN_LENGTH, MAX_TRANSFER_RATE, TF_FULLY_CANONICAL_SIG},
    models::{
        AccountAddress, Amount, NetworkState, OrderCancellationIntent, OrderIntent, PaymentIntent,
        SettingsIntent, SubmitOptions, TransactionError, TransactionIntent, TrustlineIntent,
        TxJson,
    },
};

/// Transfer rate meaning "no fee"; any other non-zero rate must be above it.
const TRANSFER_RATE_PAR: u32 = 1_000_000_000;

/// Fee cushion resolution used to keep the fee computation in integers.
const CUSHION_SCALE: u128 = 1_000_000;

pub fn create_tx_json(
    intent: &TransactionIntent,
    state: &NetworkState,
    options: &SubmitOptions,
    config: &GatewayConfig,
) -> Result<TxJson, TransactionError> {
    let source = AccountAddress::parse(intent.source_account())?;
    let fee = compute_fee(state.base_fee, options, config)?;

    let fields = match intent {
        TransactionIntent::Payment(payment) => payment_fields(payment, &source)?,
        TransactionIntent::Trustline(trustline) => trustline_fields(trustline)?,
        TransactionIntent::Order(order) => order_fields(order)?,
        TransactionIntent::OrderCancellation(cancel) => order_cancellation_fields(cancel)?,
        TransactionIntent::Settings(settings) => settings_fields(settings)?,
    };

    let last_ledger_sequence = state
        .ledger_index
        .checked_add(LAST_LEDGER_OFFSET)
        .ok_or_else(|| {
            TransactionError::InvalidTransaction("ledger index out of range".to_string())
        })?;

    Ok(TxJson {
        transaction_type: intent.transaction_type(),
        account: source.to_string(),
        sequence: state.account_sequence,
        fee: fee.to_string(),
        flags: TF_FULLY_CANONICAL_SIG,
        last_ledger_sequence,
        fields,
        signing_pub_key: None,
        txn_signature: None,
    })
}

/// Fee in drops: the fixed fee when requested, otherwise the base fee times
/// the configured cushion, rounded up. Either must fit under the maximum.
pub fn compute_fee(
    base_fee: u64,
    options: &SubmitOptions,
    config: &GatewayConfig,
) -> Result<u64, TransactionError> {
    let fee = match options.fixed_fee {
        Some(fixed_fee) => fixed_fee,
        None => {
            let cushion = (config.fee_cushion * CUSHION_SCALE as f64).round() as u128;
            let scaled = (base_fee as u128 * cushion).div_ceil(CUSHION_SCALE);
            u64::try_from(scaled).unwrap_or(u64::MAX)
        }
    };

    let max_fee = options.max_fee.unwrap_or(config.max_fee_drops);
    if fee > max_fee {
        return Err(TransactionError::FeeExceedsMaximum { fee, max_fee });
    }
    Ok(fee)
}

fn amount_value(amount: &Amount) -> Result<Value, TransactionError> {
    serde_json::to_value(amount).map_err(|e| TransactionError::InvalidTransaction(e.to_string()))
}

fn payment_fields(
    payment: &PaymentIntent,
    source: &AccountAddress,
) -> Result<Map<String, Value>, TransactionError> {
    let destination = AccountAddress::parse(&payment.destination_account)?;
    payment.amount.validate("Amount", false)?;
    if payment.amount.is_native() && destination == *source {
        return Err(TransactionError::InvalidTransaction(
            "XRP payments to self are not allowed".to_string(),
        ));
    }

    let mut fields = Map::new();
    fields.insert("Destination".into(), json!(destination.as_str()));
    fields.insert("Amount".into(), amount_value(&payment.amount)?);

    if let Some(send_max) = &payment.send_max {
        send_max.validate("SendMax", false)?;
        fields.insert("SendMax".into(), amount_value(send_max)?);
    }
    if let Some(tag) = payment.destination_tag {
        fields.insert("DestinationTag".into(), json!(tag));
    }
    if let Some(tag) = payment.source_tag {
        fields.insert("SourceTag".into(), json!(tag));
    }
    if let Some(invoice_id) = &payment.invoice_id {
        if invoice_id.len() != 64 || !invoice_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TransactionError::InvalidTransaction(
                "InvoiceID must be 64 hex characters".to_string(),
            ));
        }
        fields.insert("InvoiceID".into(), json!(invoice_id.to_uppercase()));
    }
    Ok(fields)
}

fn trustline_fields(trustline: &TrustlineIntent) -> Result<Map<String, Value>, TransactionError> {
    if trustline.limit_amount.is_native() {
        return Err(TransactionError::InvalidTransaction(
            "LimitAmount must be an issued currency amount".to_string(),
        ));
    }
    // a zero limit removes the trust line
    trustline.limit_amount.validate("LimitAmount", true)?;

    let mut fields = Map::new();
    fields.insert("LimitAmount".into(), amount_value(&trustline.limit_amount)?);
    if let Some(quality) = trustline.quality_in {
        fields.insert("QualityIn".into(), json!(quality));
    }
    if let Some(quality) = trustline.quality_out {
        fields.insert("QualityOut".into(), json!(quality));
    }
    Ok(fields)
}

fn order_fields(order: &OrderIntent) -> Result<Map<String, Value>, TransactionError> {
    order.taker_pays.validate("TakerPays", false)?;
    order.taker_gets.validate("TakerGets", false)?;
    if order.taker_pays.is_native() && order.taker_gets.is_native() {
        return Err(TransactionError::InvalidTransaction(
            "an order cannot exchange XRP for XRP".to_string(),
        ));
    }

    let mut fields = Map::new();
    fields.insert("TakerPays".into(), amount_value(&order.taker_pays)?);
    fields.insert("TakerGets".into(), amount_value(&order.taker_gets)?);
    if let Some(expiration) = order.expiration {
        fields.insert("Expiration".into(), json!(expiration));
    }
    Ok(fields)
}

fn order_cancellation_fields(
    cancel: &OrderCancellationIntent,
) -> Result<Map<String, Value>, TransactionError> {
    if cancel.offer_sequence == 0 {
        return Err(TransactionError::InvalidTransaction(
            "OfferSequence must be greater than zero".to_string(),
        ));
    }
    let mut fields = Map::new();
    fields.insert("OfferSequence".into(), json!(cancel.offer_sequence));
    Ok(fields)
}

fn settings_fields(settings: &SettingsIntent) -> Result<Map<String, Value>, TransactionError> {
    if let (Some(set), Some(clear)) = (settings.set_flag, settings.clear_flag) {
        if set == clear {
            return Err(TransactionError::InvalidTransaction(
                "SetFlag and ClearFlag must differ".to_string(),
            ));
        }
    }

    let mut fields = Map::new();
    if let Some(flag) = settings.set_flag {
        fields.insert("SetFlag".into(), json!(flag));
    }
    if let Some(flag) = settings.clear_flag {
        fields.insert("ClearFlag".into(), json!(flag));
    }
    if let Some(domain) = &settings.domain {
        if domain.len() > MAX_DOMAIN_LENGTH {
            return Err(TransactionError::InvalidTransaction(format!(
                "Domain must be at most {MAX_DOMAIN_LENGTH} bytes"
            )));
        }
        fields.insert("Domain".into(), json!(hex::encode_upper(domain.as_bytes())));
    }
    if let Some(rate) = settings.transfer_rate {
        if rate != 0 && !(TRANSFER_RATE_PAR..=MAX_TRANSFER_RATE).contains(&rate) {
            return Err(TransactionError::InvalidTransaction(format!(
                "TransferRate must be 0 or between {TRANSFER_RATE_PAR} and {MAX_TRANSFER_RATE}"
            )));
        }
        fields.insert("TransferRate".into(), json!(rate));
    }
    Ok(fields)
}
