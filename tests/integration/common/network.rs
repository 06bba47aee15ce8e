//! In-memory network client.
//!
//! Ledger closes, confirmations and disconnects are triggered explicitly by
//! the test and delivered through the same broadcast channel a real client
//! would use.

use std::collections::HashMap;

use async_trait::async_trait;
use ledger_gateway::{
    models::{Confirmation, NetworkEvent, SubmitResponse},
    services::{
        provider::{NetworkClient, ProviderError},
        signer::decode_tx_blob,
    },
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

struct FakeState {
    ledger_index: u32,
    base_fee: u64,
    sequences: HashMap<String, u32>,
    submitted: Vec<String>,
    engine_result: String,
}

pub struct FakeNetwork {
    state: Mutex<FakeState>,
    events: Mutex<Option<broadcast::Sender<NetworkEvent>>>,
}

impl FakeNetwork {
    pub fn new(ledger_index: u32) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(FakeState {
                ledger_index,
                base_fee: 10,
                sequences: HashMap::new(),
                submitted: Vec::new(),
                engine_result: "tesSUCCESS".to_string(),
            }),
            events: Mutex::new(Some(sender)),
        }
    }

    /// Makes `account` known to the network with its next sequence number.
    pub fn fund(&self, account: &str, sequence: u32) {
        self.state
            .lock()
            .sequences
            .insert(account.to_string(), sequence);
    }

    /// Preliminary result returned by subsequent submissions.
    pub fn set_engine_result(&self, engine_result: &str) {
        self.state.lock().engine_result = engine_result.to_string();
    }

    pub fn ledger_index(&self) -> u32 {
        self.state.lock().ledger_index
    }

    /// Blobs received so far, including rebroadcasts.
    pub fn submitted(&self) -> Vec<String> {
        self.state.lock().submitted.clone()
    }

    fn emit(&self, event: NetworkEvent) {
        if let Some(sender) = self.events.lock().as_ref() {
            let _ = sender.send(event);
        }
    }

    /// Closes the current ledger and returns the new ledger index.
    pub fn close_ledger(&self) -> u32 {
        let ledger_index = {
            let mut state = self.state.lock();
            state.ledger_index += 1;
            state.ledger_index
        };
        self.emit(NetworkEvent::LedgerClosed { ledger_index });
        ledger_index
    }

    pub fn close_ledgers(&self, count: u32) -> u32 {
        let mut last = self.ledger_index();
        for _ in 0..count {
            last = self.close_ledger();
        }
        last
    }

    /// Includes `tx_blob` in the next ledger with `engine_result`.
    pub fn confirm_blob(&self, tx_blob: &str, engine_result: &str) {
        let (tx_json, signed) = decode_tx_blob(tx_blob).expect("submitted blob decodes");
        let ledger_index = self.ledger_index() + 1;
        self.emit(NetworkEvent::TransactionConfirmed(Confirmation {
            account: tx_json.account,
            sequence: tx_json.sequence,
            hash: signed.hash,
            ledger_index,
            engine_result: engine_result.to_string(),
        }));
    }

    pub fn confirm(&self, confirmation: Confirmation) {
        self.emit(NetworkEvent::TransactionConfirmed(confirmation));
    }

    pub fn disconnect(&self) {
        self.emit(NetworkEvent::Disconnected);
    }

    /// Drops the event sender; subscribers observe a closed channel.
    pub fn close_channel(&self) {
        self.events.lock().take();
    }
}

#[async_trait]
impl NetworkClient for FakeNetwork {
    async fn current_ledger(&self) -> Result<u32, ProviderError> {
        Ok(self.ledger_index())
    }

    async fn account_sequence(&self, account: &str) -> Result<u32, ProviderError> {
        self.state
            .lock()
            .sequences
            .get(account)
            .copied()
            .ok_or_else(|| ProviderError::AccountNotFound(account.to_string()))
    }

    async fn base_fee(&self) -> Result<u64, ProviderError> {
        Ok(self.state.lock().base_fee)
    }

    async fn submit(&self, tx_blob: &str) -> Result<SubmitResponse, ProviderError> {
        let mut state = self.state.lock();
        state.submitted.push(tx_blob.to_string());
        Ok(SubmitResponse::new(state.engine_result.clone(), ""))
    }

    fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        match self.events.lock().as_ref() {
            Some(sender) => sender.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}
