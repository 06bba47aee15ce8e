//! Network client seam.
//!
//! The gateway never talks to a ledger node directly; everything it needs from
//! the network goes through [`NetworkClient`], so a websocket client, an HTTP
//! poller or a test double can be plugged in.
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

#[cfg(test)]
use mockall::automock;

use crate::models::{NetworkEvent, NetworkState, SubmitResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProviderError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Request timeout")]
    Timeout,
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Other provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Determines if this error is transient (can retry) or permanent (should fail).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout | ProviderError::TransportError(_)
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Other(format!("Malformed network response: {err}"))
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait NetworkClient: Send + Sync {
    /// Index of the most recently closed ledger.
    async fn current_ledger(&self) -> Result<u32, ProviderError>;
    /// Next sequence number of `account`; `AccountNotFound` when it is unfunded.
    async fn account_sequence(&self, account: &str) -> Result<u32, ProviderError>;
    /// Current base fee in drops.
    async fn base_fee(&self) -> Result<u64, ProviderError>;
    /// Hands a signed blob to the network and returns its preliminary result.
    async fn submit(&self, tx_blob: &str) -> Result<SubmitResponse, ProviderError>;
    /// Subscribes to ledger closes, confirmations and disconnects.
    fn subscribe(&self) -> broadcast::Receiver<NetworkEvent>;
}

/// Fetches everything the builder needs for `account` concurrently.
pub async fn fetch_network_state<N>(
    network: &N,
    account: &str,
) -> Result<NetworkState, ProviderError>
where
    N: NetworkClient + ?Sized,
{
    let (ledger_index, account_sequence, base_fee) = futures::try_join!(
        network.current_ledger(),
        network.account_sequence(account),
        network.base_fee()
    )?;

    Ok(NetworkState {
        ledger_index,
        account_sequence,
        base_fee,
    })
}
