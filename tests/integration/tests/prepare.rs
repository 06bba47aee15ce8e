//! Prepare-only flows and mode selection.

use ledger_gateway::{
    domain::NoConversion,
    models::{TransactionError, TransactionRequest},
};
use serde_json::json;

use crate::integration::common::context::{
    payment_request, GatewayTestContext, DESTINATION, SECRET, SOURCE, SOURCE_SEQUENCE,
    START_LEDGER,
};

fn payment_body(options: serde_json::Value) -> serde_json::Value {
    json!({
        "source_account": SOURCE,
        "destination_account": DESTINATION,
        "amount": "2500000",
        "options": options,
    })
}

#[tokio::test]
async fn test_prepare_without_secret_returns_unsigned_transaction() {
    let ctx = GatewayTestContext::new();
    let request =
        TransactionRequest::from_json("payment", payment_body(json!({ "submit": false }))).unwrap();

    let response = ctx.pipeline.transact(request, &NoConversion).await.unwrap();

    assert_eq!(response["tx_json"]["Account"], json!(SOURCE));
    assert_eq!(response["tx_json"]["Sequence"], json!(SOURCE_SEQUENCE));
    assert_eq!(
        response["tx_json"]["LastLedgerSequence"],
        json!(START_LEDGER + 3)
    );
    assert!(response.get("tx_blob").is_none());
    assert!(ctx.network.submitted().is_empty());
}

#[tokio::test]
async fn test_prepare_with_secret_only_adds_signing_fields() {
    let ctx = GatewayTestContext::new();
    let unsigned = ctx
        .pipeline
        .prepare_and_optionally_sign(payment_request(2_500_000), &NoConversion)
        .await
        .unwrap();
    let signed = ctx
        .pipeline
        .prepare_and_optionally_sign(
            payment_request(2_500_000).with_secret(SECRET),
            &NoConversion,
        )
        .await
        .unwrap();

    assert!(signed["tx_blob"].is_string());
    assert!(signed["hash"].is_string());

    let mut stripped = signed["tx_json"].as_object().unwrap().clone();
    stripped.remove("SigningPubKey");
    stripped.remove("TxnSignature");
    assert_eq!(json!(stripped), unsigned["tx_json"]);
    assert!(ctx.network.submitted().is_empty());
}

#[tokio::test]
async fn test_signing_is_reproducible() {
    let ctx = GatewayTestContext::new();
    let first = ctx
        .pipeline
        .prepare_and_optionally_sign(payment_request(1).with_secret(SECRET), &NoConversion)
        .await
        .unwrap();
    let second = ctx
        .pipeline
        .prepare_and_optionally_sign(payment_request(1).with_secret(SECRET), &NoConversion)
        .await
        .unwrap();

    assert_eq!(first["tx_blob"], second["tx_blob"]);
    assert_eq!(first["hash"], second["hash"]);
}

#[tokio::test]
async fn test_only_boolean_false_selects_prepare_mode() {
    let ctx = GatewayTestContext::new();

    // Without a secret, the submit mode fails validation before any network call,
    // which makes the chosen mode observable.
    for options in [
        json!({ "submit": "false" }),
        json!({ "submit": 0 }),
        json!({ "submit": null }),
        json!({ "submit": true }),
        json!({}),
    ] {
        let request = TransactionRequest::from_json("payment", payment_body(options.clone()))
            .unwrap();
        let err = ctx
            .pipeline
            .transact(request, &NoConversion)
            .await
            .unwrap_err();
        assert_eq!(err, TransactionError::MissingSecret, "options: {options}");
    }

    let request =
        TransactionRequest::from_json("payment", payment_body(json!({ "submit": false }))).unwrap();
    assert!(ctx.pipeline.transact(request, &NoConversion).await.is_ok());
}

#[tokio::test]
async fn test_unknown_option_keys_are_reported() {
    let err = TransactionRequest::from_json(
        "payment",
        payment_body(json!({ "submit": false, "fee_multiplier": 2, "dry_run": true })),
    )
    .unwrap_err();

    assert_eq!(
        err,
        TransactionError::UnrecognizedOption(vec!["dry_run".into(), "fee_multiplier".into()])
    );
    assert!(err.to_string().contains("fee_multiplier"));
}

#[tokio::test]
async fn test_unfunded_source_account() {
    let ctx = GatewayTestContext::new();
    let body = json!({
        "source_account": DESTINATION,
        "destination_account": SOURCE,
        "amount": "10",
        "options": { "submit": false },
    });
    let request = TransactionRequest::from_json("payment", body).unwrap();

    let err = ctx
        .pipeline
        .transact(request, &NoConversion)
        .await
        .unwrap_err();
    assert_eq!(err, TransactionError::AccountNotFound(DESTINATION.into()));
}

#[tokio::test]
async fn test_fee_above_maximum_is_refused() {
    let ctx = GatewayTestContext::new();
    let request = TransactionRequest::from_json(
        "payment",
        payment_body(json!({ "submit": false, "fixed_fee": 500, "max_fee": 1000 })),
    )
    .unwrap();
    let response = ctx.pipeline.transact(request, &NoConversion).await.unwrap();
    assert_eq!(response["tx_json"]["Fee"], json!("500"));

    let request = TransactionRequest::from_json(
        "payment",
        payment_body(json!({ "submit": false, "max_fee": 5 })),
    )
    .unwrap();
    let err = ctx
        .pipeline
        .transact(request, &NoConversion)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransactionError::FeeExceedsMaximum {
            fee: 12,
            max_fee: 5
        }
    );
}
