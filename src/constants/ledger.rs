//! Constants describing the ledger wire format: address encodings, hash prefixes
//! and engine result codes.

/// Base58check version byte of classic account addresses (`r...`)
pub const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Base58check version byte of secp256k1 family seeds (`s...`)
pub const FAMILY_SEED_VERSION: u8 = 0x21;

/// Length of an account id (RIPEMD160 of SHA256 of the public key)
pub const ACCOUNT_ID_LENGTH: usize = 20;

/// Length of the entropy carried by a family seed
pub const FAMILY_SEED_LENGTH: usize = 16;

/// Prefix hashed in front of a transaction's signing data ("STX\0")
pub const HASH_PREFIX_TX_SIGN: [u8; 4] = [0x53, 0x54, 0x58, 0x00];

/// Prefix hashed in front of a signed transaction to compute its id ("TXN\0")
pub const HASH_PREFIX_TRANSACTION_ID: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// Engine result of a transaction that applied successfully
pub const ENGINE_RESULT_SUCCESS: &str = "tesSUCCESS";

/// Engine result prefixes whose final outcome is only known once a ledger
/// includes (or the validity window excludes) the transaction.
pub const ENGINE_RESULT_PROVISIONAL_PREFIXES: &[&str] = &["tes", "ter", "tec"];

/// Native currency code; issued amounts may not use it.
pub const NATIVE_CURRENCY: &str = "XRP";

/// Transaction flag requiring a fully canonical (low-S) signature
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;
