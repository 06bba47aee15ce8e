//! Submission, confirmation and rebroadcast.

use ledger_gateway::{
    domain::{NoConversion, PendingStatus},
    models::{Confirmation, TransactionError},
};
use serde_json::json;

use crate::integration::common::context::{
    join, payment_request, GatewayTestContext, SECRET, SOURCE, SOURCE_SEQUENCE, START_LEDGER,
};

#[tokio::test]
async fn test_submitted_transaction_is_validated() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));

    let blobs = ctx.wait_for_submissions(1).await;
    assert_eq!(ctx.status(), Some(PendingStatus::Pending));

    ctx.network.confirm_blob(&blobs[0], "tesSUCCESS");
    ctx.network.close_ledger();

    let response = join(handle).await.unwrap();
    assert_eq!(response["state"], json!("validated"));
    assert_eq!(response["ledger"], json!(START_LEDGER + 1));
    assert_eq!(response["engine_result"], json!("tesSUCCESS"));
    assert_eq!(response["tx_blob"], json!(blobs[0]));
    assert_eq!(ctx.status(), Some(PendingStatus::Succeeded));
}

#[tokio::test]
async fn test_pending_blob_is_rebroadcast_unchanged() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));

    let first = ctx.wait_for_submissions(1).await;
    ctx.network.close_ledger();
    let blobs = ctx.wait_for_submissions(2).await;
    assert_eq!(blobs[0], first[0]);
    assert_eq!(blobs[1], first[0]);

    ctx.network.confirm_blob(&first[0], "tesSUCCESS");
    assert!(join(handle).await.is_ok());
}

#[tokio::test]
async fn test_immediate_rejection() {
    let ctx = GatewayTestContext::new();
    ctx.network.set_engine_result("tefPAST_SEQ");

    let err = join(ctx.spawn_transact(payment_request(1_000).with_secret(SECRET)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "SubmissionRejected");
    assert_eq!(ctx.pipeline.tracker().pending_count(), 0);
    assert_eq!(ctx.status(), None);
}

#[tokio::test]
async fn test_claimed_fee_result_is_reported_as_rejection() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));

    let blobs = ctx.wait_for_submissions(1).await;
    ctx.network.confirm_blob(&blobs[0], "tecPATH_DRY");

    match join(handle).await.unwrap_err() {
        TransactionError::SubmissionRejected { engine_result, .. } => {
            assert_eq!(engine_result, "tecPATH_DRY")
        }
        other => panic!("expected SubmissionRejected, got {:?}", other),
    }
    assert_eq!(ctx.status(), Some(PendingStatus::Failed));
}

#[tokio::test]
async fn test_sequence_consumed_by_other_transaction() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    ctx.wait_for_submissions(1).await;

    ctx.network.confirm(Confirmation {
        account: SOURCE.into(),
        sequence: SOURCE_SEQUENCE,
        hash: "00".repeat(32),
        ledger_index: START_LEDGER + 1,
        engine_result: "tesSUCCESS".into(),
    });

    let err = join(handle).await.unwrap_err();
    assert_eq!(err.kind(), "SubmissionRejected");
    assert!(err.to_string().contains("consumed"));
}

#[tokio::test]
async fn test_same_sequence_cannot_be_pending_twice() {
    let ctx = GatewayTestContext::new();
    let first = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    ctx.wait_for_submissions(1).await;

    // the network still reports the same account sequence
    let err = join(ctx.spawn_transact(payment_request(2_000).with_secret(SECRET)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransactionError::AlreadyPending {
            account: SOURCE.into(),
            sequence: SOURCE_SEQUENCE
        }
    );

    ctx.network.close_ledgers(4);
    assert_eq!(join(first).await.unwrap_err().kind(), "Expired");
}

#[tokio::test]
async fn test_sign_then_submit_signed_blob() {
    let ctx = GatewayTestContext::new();
    let prepared = ctx
        .pipeline
        .prepare_and_optionally_sign(payment_request(7).with_secret(SECRET), &NoConversion)
        .await
        .unwrap();
    let tx_blob = prepared["tx_blob"].as_str().unwrap().to_string();

    let pipeline = ctx.pipeline.clone();
    let blob = tx_blob.clone();
    let handle =
        tokio::spawn(async move { pipeline.submit_signed(&blob, &NoConversion).await });

    ctx.wait_for_submissions(1).await;
    ctx.network.confirm_blob(&tx_blob, "tesSUCCESS");

    let response = join(handle).await.unwrap();
    assert_eq!(response["hash"], prepared["hash"]);
    assert_eq!(response["state"], json!("validated"));
}
