//! Submission of signed transactions and the network event loop.
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::{
    pending::{PendingKey, PendingSubmission, PendingTracker, Rebroadcast, Settlement},
    TransactionPipeline,
};
use crate::{
    models::{NetworkEvent, PreparedTransaction, SubmittedTransaction, TransactionError},
    services::provider::NetworkClient,
};

/// State reported for transactions included in a validated ledger.
pub const VALIDATED_STATE: &str = "validated";

impl<N> TransactionPipeline<N>
where
    N: NetworkClient + 'static,
{
    /// Registers the transaction, submits its blob and waits until it is
    /// confirmed, expires or tracking is cancelled.
    pub(super) async fn submit_and_wait(
        &self,
        prepared: PreparedTransaction,
        submitted_at_ledger: u32,
    ) -> Result<SubmittedTransaction, TransactionError> {
        let blob = prepared.signed.clone().ok_or_else(|| {
            TransactionError::SigningError("transaction must be signed before submission".into())
        })?;
        let key = PendingKey::new(prepared.tx_json.account.clone(), prepared.tx_json.sequence);

        let settlement = self.tracker.register(PendingSubmission {
            key: key.clone(),
            hash: blob.hash.clone(),
            tx_blob: blob.tx_blob.clone(),
            last_ledger_sequence: prepared.tx_json.last_ledger_sequence,
            submitted_at_ledger,
        })?;

        let response = match self.network.submit(&blob.tx_blob).await {
            Ok(response) => response,
            Err(e) => {
                self.tracker.cancel(&key);
                warn!(key = %key, hash = %blob.hash, error = %e, "submission failed");
                return Err(e.into());
            }
        };

        if response.is_rejected() {
            self.tracker.cancel(&key);
            info!(
                key = %key,
                hash = %blob.hash,
                engine_result = %response.engine_result,
                "submission rejected"
            );
            return Err(TransactionError::SubmissionRejected {
                engine_result: response.engine_result,
                message: response.engine_result_message,
            });
        }

        info!(
            key = %key,
            hash = %blob.hash,
            engine_result = %response.engine_result,
            last_ledger_sequence = prepared.tx_json.last_ledger_sequence,
            "transaction submitted, awaiting validation"
        );

        match settlement.await {
            Ok(Settlement::Confirmed(confirmation)) => {
                if confirmation.hash != blob.hash {
                    return Err(TransactionError::SubmissionRejected {
                        engine_result: confirmation.engine_result,
                        message: format!(
                            "sequence {} was consumed by transaction {}",
                            key.sequence, confirmation.hash
                        ),
                    });
                }
                if !confirmation.is_success() {
                    return Err(TransactionError::SubmissionRejected {
                        message: format!(
                            "transaction applied in ledger {} with {}",
                            confirmation.ledger_index, confirmation.engine_result
                        ),
                        engine_result: confirmation.engine_result,
                    });
                }
                Ok(SubmittedTransaction {
                    prepared,
                    state: VALIDATED_STATE,
                    ledger: confirmation.ledger_index,
                    engine_result: confirmation.engine_result,
                })
            }
            Ok(Settlement::Expired {
                last_ledger_sequence,
                ledger_index,
            }) => Err(TransactionError::Expired {
                last_ledger_sequence,
                ledger_index,
            }),
            Err(_) => Err(TransactionError::Cancelled {
                account: key.account,
                sequence: key.sequence,
            }),
        }
    }
}

/// Drives `tracker` from the network's event stream until the channel closes.
///
/// Rebroadcasts are spawned so a slow submission never delays the next event.
/// A disconnect cancels everything pending; the loop keeps listening in case
/// the client reconnects on the same channel.
pub async fn run_event_loop<N>(
    tracker: Arc<PendingTracker>,
    network: Arc<N>,
    mut events: broadcast::Receiver<NetworkEvent>,
) where
    N: NetworkClient + ?Sized + 'static,
{
    debug!("network event loop started");
    loop {
        match events.recv().await {
            Ok(NetworkEvent::LedgerClosed { ledger_index }) => {
                for rebroadcast in tracker.handle_ledger_closed(ledger_index) {
                    tokio::spawn(rebroadcast_blob(Arc::clone(&network), rebroadcast));
                }
            }
            Ok(NetworkEvent::TransactionConfirmed(confirmation)) => {
                tracker.handle_confirmation(&confirmation);
            }
            Ok(NetworkEvent::Disconnected) => {
                warn!("network disconnected, cancelling pending transactions");
                tracker.cancel_all();
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "network event loop lagged behind, events were dropped");
            }
            Err(RecvError::Closed) => {
                info!("network event channel closed, cancelling pending transactions");
                tracker.cancel_all();
                break;
            }
        }
    }
}

async fn rebroadcast_blob<N>(network: Arc<N>, rebroadcast: Rebroadcast)
where
    N: NetworkClient + ?Sized,
{
    match network.submit(&rebroadcast.tx_blob).await {
        Ok(response) => debug!(
            key = %rebroadcast.key,
            hash = %rebroadcast.hash,
            engine_result = %response.engine_result,
            "transaction rebroadcast"
        ),
        Err(e) => warn!(
            key = %rebroadcast.key,
            hash = %rebroadcast.hash,
            error = %e,
            "failed to rebroadcast transaction"
        ),
    }
}
