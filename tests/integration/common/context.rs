//! Test context bundling the fake network, the pipeline and its event loop.

use std::{future::Future, sync::Arc, time::Duration};

use ledger_gateway::{
    config::GatewayConfig,
    domain::{PendingKey, PendingStatus, TransactionPipeline},
    models::{Amount, PaymentIntent, TransactionError, TransactionIntent, TransactionRequest},
    services::signer::{FixedEntropy, LocalSigner},
};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use super::{logging::init_test_logging, network::FakeNetwork};

pub const SOURCE: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
pub const SECRET: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
pub const DESTINATION: &str = "rrrrrrrrrrrrrrrrrrrrBZbvji";
pub const START_LEDGER: u32 = 1_000;
pub const SOURCE_SEQUENCE: u32 = 42;

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

pub type GatewayResult = Result<Map<String, Value>, TransactionError>;

pub struct GatewayTestContext {
    pub network: Arc<FakeNetwork>,
    pub pipeline: Arc<TransactionPipeline<FakeNetwork>>,
    pub event_loop: JoinHandle<()>,
}

impl GatewayTestContext {
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        init_test_logging();

        let network = Arc::new(FakeNetwork::new(START_LEDGER));
        network.fund(SOURCE, SOURCE_SEQUENCE);

        let signer = Arc::new(LocalSigner::new(Arc::new(FixedEntropy::default())));
        let pipeline = Arc::new(TransactionPipeline::new(
            Arc::clone(&network),
            signer,
            config,
        )
        .expect("valid gateway config"));
        let event_loop = pipeline.spawn_event_loop();

        Self {
            network,
            pipeline,
            event_loop,
        }
    }

    pub fn source_key(&self) -> PendingKey {
        PendingKey::new(SOURCE, SOURCE_SEQUENCE)
    }

    pub fn status(&self) -> Option<PendingStatus> {
        self.pipeline.tracker().status(&self.source_key())
    }

    /// Runs `transact` for `request` on a separate task.
    pub fn spawn_transact(&self, request: TransactionRequest) -> JoinHandle<GatewayResult> {
        let pipeline = Arc::clone(&self.pipeline);
        tokio::spawn(async move {
            pipeline
                .transact(request, &ledger_gateway::domain::NoConversion)
                .await
        })
    }

    /// Waits until the network received `count` blobs.
    pub async fn wait_for_submissions(&self, count: usize) -> Vec<String> {
        let network = Arc::clone(&self.network);
        wait_until(move || network.submitted().len() >= count).await;
        self.network.submitted()
    }

    /// Waits until the tracker has processed the close of `ledger_index`.
    pub async fn wait_for_ledger(&self, ledger_index: u32) {
        let pipeline = Arc::clone(&self.pipeline);
        wait_until(move || pipeline.tracker().current_ledger() >= Some(ledger_index)).await;
    }
}

pub fn payment_request(drops: u64) -> TransactionRequest {
    TransactionRequest::new(TransactionIntent::Payment(PaymentIntent {
        source_account: SOURCE.into(),
        destination_account: DESTINATION.into(),
        amount: Amount::drops(drops),
        send_max: None,
        destination_tag: None,
        source_tag: None,
        invoice_id: None,
    }))
}

pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Awaits a spawned pipeline call, failing the test if it does not finish.
pub async fn join<T, F>(handle: F) -> T
where
    F: Future<Output = Result<T, tokio::task::JoinError>>,
{
    tokio::time::timeout(WAIT_TIMEOUT, handle)
        .await
        .expect("pipeline call did not finish in time")
        .expect("pipeline task panicked")
}
