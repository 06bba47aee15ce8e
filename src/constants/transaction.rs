//! Transaction-related constants
//!
//! Defaults used while building, signing and tracking transactions.

/// Number of ledgers a transaction stays claimable after the ledger it was built on.
/// `LastLedgerSequence = current ledger + LAST_LEDGER_OFFSET`.
pub const LAST_LEDGER_OFFSET: u32 = 3;

/// Multiplier applied to the network base fee when no fixed fee is requested
pub const DEFAULT_FEE_CUSHION: f64 = 1.2;

/// Default upper bound for the fee of a single transaction (1 XRP in drops)
pub const DEFAULT_MAX_FEE_DROPS: u64 = 1_000_000;

/// Pending entries are rebroadcast once their last broadcast is this many ledgers old
pub const DEFAULT_RESUBMIT_INTERVAL_LEDGERS: u32 = 1;

/// Settled entries are kept queryable for this many ledgers after settlement
pub const DEFAULT_RESULT_RETENTION_LEDGERS: u32 = 256;

/// Upper bound on transfer rates accepted for account settings (billionths, 2x)
pub const MAX_TRANSFER_RATE: u32 = 2_000_000_000;

/// Maximum domain length (bytes) accepted for account settings
pub const MAX_DOMAIN_LENGTH: usize = 256;
