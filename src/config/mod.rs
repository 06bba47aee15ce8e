//! Configuration management for the gateway.
//!
//! Values come from environment variables with defaults from `crate::constants`.
mod gateway_config;
pub use gateway_config::*;
