//! Common utilities and helpers for integration tests

pub mod context;
pub mod logging;
pub mod network;
