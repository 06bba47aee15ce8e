//! # Domain Module
//!
//! Core domain logic of the gateway: the transaction pipeline from request
//! validation through submission tracking and response formatting.

pub mod transaction;
pub use transaction::*;
