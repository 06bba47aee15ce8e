//! Ledger Transaction Gateway Library
//!
//! This library turns structured transaction requests into canonical ledger
//! transactions, signs them, submits them to a ledger network and tracks their
//! outcome across a bounded window of ledger closes. It includes:
//!
//! - Validation of addresses, secrets and submission options
//! - Construction of canonical transaction objects with a validity window
//! - Deterministic (injectable-entropy) signing
//! - Submission and ledger-close driven expiry tracking
//! - Response formatting through caller supplied converters
//!
//! # Module Structure
//!
//! - `config`: Configuration management
//! - `constants`: Constants and environment variable defaults
//! - `domain`: The transaction lifecycle pipeline
//! - `logging`: Logging and tracing
//! - `models`: Data structures for requests, transactions and network events
//! - `services`: Signing and the network client seam
//! - `utils`: Canonical encoding and hashing helpers

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
