//! Expiry driven by ledger closes.

use ledger_gateway::{
    domain::PendingStatus,
    models::{Confirmation, TransactionError},
};

use crate::integration::common::context::{
    join, payment_request, GatewayTestContext, SECRET, SOURCE, SOURCE_SEQUENCE, START_LEDGER,
};

#[tokio::test]
async fn test_still_pending_after_three_closes() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    ctx.wait_for_submissions(1).await;

    let ledger = ctx.network.close_ledgers(3);
    ctx.wait_for_ledger(ledger).await;

    assert_eq!(ctx.status(), Some(PendingStatus::Pending));
    assert!(!handle.is_finished());
    handle.abort();
}

#[tokio::test]
async fn test_expires_after_window_passes() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    ctx.wait_for_submissions(1).await;

    ctx.network.close_ledgers(5);

    let err = join(handle).await.unwrap_err();
    assert_eq!(
        err,
        TransactionError::Expired {
            last_ledger_sequence: START_LEDGER + 3,
            ledger_index: START_LEDGER + 4,
        }
    );
    assert!(err.is_retryable());
    assert_eq!(ctx.status(), Some(PendingStatus::Expired));
}

#[tokio::test]
async fn test_late_confirmation_does_not_revive_expired_transaction() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    let blobs = ctx.wait_for_submissions(1).await;

    ctx.network.close_ledgers(4);
    assert_eq!(join(handle).await.unwrap_err().kind(), "Expired");

    ctx.network.confirm_blob(&blobs[0], "tesSUCCESS");
    let ledger = ctx.network.close_ledger();
    ctx.wait_for_ledger(ledger).await;

    assert_eq!(ctx.status(), Some(PendingStatus::Expired));
}

#[tokio::test]
async fn test_confirmation_in_last_valid_ledger_wins() {
    let ctx = GatewayTestContext::new();
    let handle = ctx.spawn_transact(payment_request(1_000).with_secret(SECRET));
    let blobs = ctx.wait_for_submissions(1).await;

    let ledger = ctx.network.close_ledgers(2);
    ctx.network.confirm(Confirmation {
        account: SOURCE.into(),
        sequence: SOURCE_SEQUENCE,
        hash: ledger_gateway::services::signer::decode_tx_blob(&blobs[0])
            .unwrap()
            .1
            .hash,
        ledger_index: ledger + 1,
        engine_result: "tesSUCCESS".into(),
    });
    ctx.network.close_ledgers(3);

    let response = join(handle).await.unwrap();
    assert_eq!(response["ledger"], serde_json::json!(START_LEDGER + 3));
}
