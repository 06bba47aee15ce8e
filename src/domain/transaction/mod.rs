//! The transaction pipeline.
//!
//! A request flows through validation, building, optional signing and
//! optional submission before being formatted:
//!
//! - [`TransactionPipeline::prepare_and_optionally_sign`] never submits
//! - [`TransactionPipeline::prepare_and_sign_and_submit`] requires a secret and
//!   waits until the transaction is validated, expires or tracking is cancelled
//! - [`TransactionPipeline::transact`] picks one of the two from the request
//!   options
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::{
    config::{ConfigError, GatewayConfig},
    models::{
        NetworkState, PreparedTransaction, TransactionError, TransactionOutcome,
        TransactionRequest, TxJson,
    },
    services::{
        provider::{fetch_network_state, NetworkClient},
        signer::{decode_tx_blob, verify_transaction, Keypair, TransactionSigner},
    },
};

mod builder;
pub use builder::*;

mod formatter;
pub use formatter::*;

mod pending;
pub use pending::*;

mod submit;
pub use submit::*;

mod validation;
pub use validation::*;

pub struct TransactionPipeline<N>
where
    N: NetworkClient,
{
    network: Arc<N>,
    signer: Arc<dyn TransactionSigner>,
    tracker: Arc<PendingTracker>,
    config: GatewayConfig,
}

impl<N> TransactionPipeline<N>
where
    N: NetworkClient + 'static,
{
    pub fn new(
        network: Arc<N>,
        signer: Arc<dyn TransactionSigner>,
        config: GatewayConfig,
    ) -> Result<Self, ConfigError> {
        let tracker = Arc::new(PendingTracker::from_config(&config));
        Self::with_tracker(network, signer, config, tracker)
    }

    /// Builds a pipeline sharing `tracker`. Fails when `config` does not
    /// pass [`GatewayConfig::validate`].
    pub fn with_tracker(
        network: Arc<N>,
        signer: Arc<dyn TransactionSigner>,
        config: GatewayConfig,
        tracker: Arc<PendingTracker>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            network,
            signer,
            tracker,
            config,
        })
    }

    pub fn tracker(&self) -> &Arc<PendingTracker> {
        &self.tracker
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Subscribes to the network and spawns the task feeding ledger closes and
    /// confirmations into the tracker. Call before submitting anything.
    pub fn spawn_event_loop(&self) -> JoinHandle<()> {
        let events = self.network.subscribe();
        tokio::spawn(run_event_loop(
            Arc::clone(&self.tracker),
            Arc::clone(&self.network),
            events,
        ))
    }

    /// Prepares only when the request options carry exactly `submit: false`,
    /// otherwise signs and submits.
    #[instrument(
        level = "info",
        skip(self, request, converter),
        fields(
            transaction_type = %request.intent.transaction_type(),
            account = %request.intent.source_account(),
            submit = request.options.submit,
        )
    )]
    pub async fn transact<C>(
        &self,
        request: TransactionRequest,
        converter: &C,
    ) -> Result<Map<String, Value>, TransactionError>
    where
        C: ResponseConverter + ?Sized,
    {
        if request.options.submit {
            self.prepare_and_sign_and_submit(request, converter).await
        } else {
            self.prepare_and_optionally_sign(request, converter).await
        }
    }

    pub async fn prepare_and_optionally_sign<C>(
        &self,
        request: TransactionRequest,
        converter: &C,
    ) -> Result<Map<String, Value>, TransactionError>
    where
        C: ResponseConverter + ?Sized,
    {
        let keypair = self.validate_request(&request, false)?;
        let (prepared, _) = self.prepare(&request, keypair.as_ref()).await?;
        debug!(
            account = %prepared.tx_json.account,
            sequence = prepared.tx_json.sequence,
            signed = prepared.signed.is_some(),
            "transaction prepared"
        );
        format_response(&TransactionOutcome::Prepared(prepared), converter)
    }

    pub async fn prepare_and_sign_and_submit<C>(
        &self,
        request: TransactionRequest,
        converter: &C,
    ) -> Result<Map<String, Value>, TransactionError>
    where
        C: ResponseConverter + ?Sized,
    {
        let keypair = self
            .validate_request(&request, true)?
            .ok_or(TransactionError::MissingSecret)?;
        let (prepared, state) = self.prepare(&request, Some(&keypair)).await?;
        let submitted = self.submit_and_wait(prepared, state.ledger_index).await?;
        info!(
            account = %submitted.prepared.tx_json.account,
            sequence = submitted.prepared.tx_json.sequence,
            ledger = submitted.ledger,
            "transaction validated"
        );
        format_response(&TransactionOutcome::Submitted(submitted), converter)
    }

    /// Signs a complete transaction object with `secret`, which must own its
    /// `Account`.
    pub fn sign(&self, tx_json: &TxJson, secret: &str) -> Result<PreparedTransaction, TransactionError> {
        let keypair = validate_address_and_secret(&tx_json.account, Some(secret), true)?
            .ok_or(TransactionError::MissingSecret)?;
        let signed = self.signer.sign_transaction(tx_json, &keypair)?;
        Ok(PreparedTransaction {
            tx_json: signed.tx_json,
            signed: Some(signed.blob),
        })
    }

    /// Submits a blob signed elsewhere after checking its signature and that
    /// the signing key owns the source account.
    pub async fn submit_signed<C>(
        &self,
        tx_blob: &str,
        converter: &C,
    ) -> Result<Map<String, Value>, TransactionError>
    where
        C: ResponseConverter + ?Sized,
    {
        let (tx_json, blob) =
            decode_tx_blob(tx_blob).map_err(|e| TransactionError::InvalidTransaction(e.to_string()))?;
        verify_transaction(&tx_json)
            .map_err(|e| TransactionError::InvalidTransaction(e.to_string()))?;

        let current_ledger = self.network.current_ledger().await?;
        let prepared = PreparedTransaction {
            tx_json,
            signed: Some(blob),
        };
        let submitted = self.submit_and_wait(prepared, current_ledger).await?;
        format_response(&TransactionOutcome::Submitted(submitted), converter)
    }

    fn validate_request(
        &self,
        request: &TransactionRequest,
        secret_required: bool,
    ) -> Result<Option<Keypair>, TransactionError> {
        request.options.validate()?;
        validate_address_and_secret(
            request.intent.source_account(),
            request.secret.as_deref(),
            secret_required,
        )
    }

    async fn prepare(
        &self,
        request: &TransactionRequest,
        keypair: Option<&Keypair>,
    ) -> Result<(PreparedTransaction, NetworkState), TransactionError> {
        let state = fetch_network_state(self.network.as_ref(), request.intent.source_account())
            .await?;
        let tx_json = create_tx_json(&request.intent, &state, &request.options, &self.config)?;

        let prepared = match keypair {
            Some(keypair) => {
                let signed = self.signer.sign_transaction(&tx_json, keypair)?;
                PreparedTransaction {
                    tx_json: signed.tx_json,
                    signed: Some(signed.blob),
                }
            }
            None => PreparedTransaction {
                tx_json,
                signed: None,
            },
        };
        Ok((prepared, state))
    }
}
