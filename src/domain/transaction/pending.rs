//! Tracking of submitted transactions until they settle.
//!
//! An entry is registered before its blob is handed to the network and leaves
//! the active set exactly once: confirmed, expired or cancelled. Ledger closes
//! are the only clock; an entry expires on the first close past its
//! `LastLedgerSequence`.
use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::{
    config::GatewayConfig,
    models::{Confirmation, TransactionError},
};

/// Identifies a transaction by its source account and sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PendingKey {
    pub account: String,
    pub sequence: u32,
}

impl PendingKey {
    pub fn new(account: impl Into<String>, sequence: u32) -> Self {
        Self {
            account: account.into(),
            sequence,
        }
    }
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account, self.sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    Pending,
    /// Included in a validated ledger with `tesSUCCESS`
    Succeeded,
    /// Included with another engine result, or the sequence was consumed by
    /// a different transaction
    Failed,
    Expired,
}

/// How a tracked transaction left the active set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Confirmed(Confirmation),
    Expired {
        last_ledger_sequence: u32,
        ledger_index: u32,
    },
}

/// A pending blob due for another broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebroadcast {
    pub key: PendingKey,
    pub hash: String,
    pub tx_blob: String,
}

/// What the submitter hands over when registering a transaction.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub key: PendingKey,
    pub hash: String,
    pub tx_blob: String,
    pub last_ledger_sequence: u32,
    pub submitted_at_ledger: u32,
}

struct PendingEntry {
    hash: String,
    tx_blob: String,
    last_ledger_sequence: u32,
    submitted_at_ledger: u32,
    last_broadcast_ledger: u32,
    waiter: Option<oneshot::Sender<Settlement>>,
}

impl PendingEntry {
    fn settle(&mut self, settlement: Settlement) {
        if let Some(waiter) = self.waiter.take() {
            // the waiter may have given up already
            let _ = waiter.send(settlement);
        }
    }
}

struct SettledEntry {
    status: PendingStatus,
    retain_until: u32,
}

#[derive(Default)]
struct TrackerState {
    active: HashMap<PendingKey, PendingEntry>,
    settled: HashMap<PendingKey, SettledEntry>,
    last_ledger: Option<u32>,
}

pub struct PendingTracker {
    state: Mutex<TrackerState>,
    resubmit_interval: u32,
    result_retention: u32,
}

impl PendingTracker {
    pub fn new(resubmit_interval: u32, result_retention: u32) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            resubmit_interval: resubmit_interval.max(1),
            result_retention,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.resubmit_interval_ledgers,
            config.result_retention_ledgers,
        )
    }

    /// Starts tracking a transaction and returns the receiver its settlement
    /// will be delivered on. Dropping the sender (cancellation) closes it.
    pub fn register(
        &self,
        submission: PendingSubmission,
    ) -> Result<oneshot::Receiver<Settlement>, TransactionError> {
        let mut state = self.state.lock();

        if state.active.contains_key(&submission.key) {
            return Err(TransactionError::AlreadyPending {
                account: submission.key.account,
                sequence: submission.key.sequence,
            });
        }

        let submitted_at_ledger = state
            .last_ledger
            .map_or(submission.submitted_at_ledger, |last| {
                last.max(submission.submitted_at_ledger)
            });
        if submitted_at_ledger > submission.last_ledger_sequence {
            return Err(TransactionError::Expired {
                last_ledger_sequence: submission.last_ledger_sequence,
                ledger_index: submitted_at_ledger,
            });
        }
        let (sender, receiver) = oneshot::channel();

        debug!(
            key = %submission.key,
            hash = %submission.hash,
            last_ledger_sequence = submission.last_ledger_sequence,
            submitted_at_ledger,
            "tracking transaction"
        );

        state.settled.remove(&submission.key);
        state.active.insert(
            submission.key,
            PendingEntry {
                hash: submission.hash,
                tx_blob: submission.tx_blob,
                last_ledger_sequence: submission.last_ledger_sequence,
                submitted_at_ledger,
                last_broadcast_ledger: submitted_at_ledger,
                waiter: Some(sender),
            },
        );
        Ok(receiver)
    }

    /// Advances the tracker to `ledger_index`: expires overdue entries, prunes
    /// old results and returns the entries due for rebroadcast. Indexes at or
    /// below the last seen ledger are ignored.
    pub fn handle_ledger_closed(&self, ledger_index: u32) -> Vec<Rebroadcast> {
        let mut state = self.state.lock();

        if let Some(last) = state.last_ledger {
            if ledger_index <= last {
                debug!(ledger_index, last_ledger = last, "ignoring stale ledger close");
                return Vec::new();
            }
        }
        state.last_ledger = Some(ledger_index);
        state
            .settled
            .retain(|_, settled| settled.retain_until >= ledger_index);

        let overdue: Vec<PendingKey> = state
            .active
            .iter()
            .filter(|(_, entry)| entry.last_ledger_sequence < ledger_index)
            .map(|(key, _)| key.clone())
            .collect();

        for key in overdue {
            if let Some(mut entry) = state.active.remove(&key) {
                info!(
                    key = %key,
                    hash = %entry.hash,
                    last_ledger_sequence = entry.last_ledger_sequence,
                    submitted_at_ledger = entry.submitted_at_ledger,
                    ledger_index,
                    "transaction expired"
                );
                entry.settle(Settlement::Expired {
                    last_ledger_sequence: entry.last_ledger_sequence,
                    ledger_index,
                });
                state.settled.insert(
                    key,
                    SettledEntry {
                        status: PendingStatus::Expired,
                        retain_until: ledger_index.saturating_add(self.result_retention),
                    },
                );
            }
        }

        let mut rebroadcasts = Vec::new();
        for (key, entry) in state.active.iter_mut() {
            if ledger_index.saturating_sub(entry.last_broadcast_ledger) >= self.resubmit_interval {
                entry.last_broadcast_ledger = ledger_index;
                rebroadcasts.push(Rebroadcast {
                    key: key.clone(),
                    hash: entry.hash.clone(),
                    tx_blob: entry.tx_blob.clone(),
                });
            }
        }
        rebroadcasts
    }

    /// Settles the entry matching the confirmation's account and sequence.
    /// Returns the recorded status, or `None` when nothing was pending.
    pub fn handle_confirmation(&self, confirmation: &Confirmation) -> Option<PendingStatus> {
        let key = PendingKey::new(confirmation.account.clone(), confirmation.sequence);
        let mut state = self.state.lock();

        let Some(mut entry) = state.active.remove(&key) else {
            match state.settled.get(&key).map(|settled| settled.status) {
                Some(PendingStatus::Expired) => warn!(
                    key = %key,
                    hash = %confirmation.hash,
                    ledger_index = confirmation.ledger_index,
                    engine_result = %confirmation.engine_result,
                    "confirmation received for a transaction already expired locally"
                ),
                _ => debug!(key = %key, "confirmation for untracked transaction"),
            }
            return None;
        };

        let status = if confirmation.hash == entry.hash && confirmation.is_success() {
            PendingStatus::Succeeded
        } else {
            PendingStatus::Failed
        };
        info!(
            key = %key,
            hash = %confirmation.hash,
            ledger_index = confirmation.ledger_index,
            engine_result = %confirmation.engine_result,
            status = ?status,
            "transaction confirmed"
        );

        entry.settle(Settlement::Confirmed(confirmation.clone()));
        let settled_at = state
            .last_ledger
            .map_or(confirmation.ledger_index, |last| {
                last.max(confirmation.ledger_index)
            });
        state.settled.insert(
            key,
            SettledEntry {
                status,
                retain_until: settled_at.saturating_add(self.result_retention),
            },
        );
        Some(status)
    }

    /// Stops tracking `key` without settling it. Returns whether it was pending.
    pub fn cancel(&self, key: &PendingKey) -> bool {
        let removed = self.state.lock().active.remove(key).is_some();
        if removed {
            debug!(key = %key, "tracking cancelled");
        }
        removed
    }

    /// Cancels every pending entry of `account`.
    pub fn cancel_account(&self, account: &str) -> usize {
        let mut state = self.state.lock();
        let before = state.active.len();
        state.active.retain(|key, _| key.account != account);
        let cancelled = before - state.active.len();
        if cancelled > 0 {
            debug!(account, cancelled, "tracking cancelled for account");
        }
        cancelled
    }

    /// Cancels everything, e.g. when the network connection goes away.
    pub fn cancel_all(&self) -> usize {
        let cancelled = {
            let mut state = self.state.lock();
            let count = state.active.len();
            state.active.clear();
            count
        };
        if cancelled > 0 {
            warn!(cancelled, "tracking cancelled for all pending transactions");
        }
        cancelled
    }

    pub fn status(&self, key: &PendingKey) -> Option<PendingStatus> {
        let state = self.state.lock();
        if state.active.contains_key(key) {
            return Some(PendingStatus::Pending);
        }
        state.settled.get(key).map(|settled| settled.status)
    }

    /// Most recent ledger close seen, if any.
    pub fn current_ledger(&self) -> Option<u32> {
        self.state.lock().last_ledger
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().active.len()
    }
}
