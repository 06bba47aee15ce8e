use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    DEFAULT_FEE_CUSHION, DEFAULT_MAX_FEE_DROPS, DEFAULT_RESUBMIT_INTERVAL_LEDGERS,
    DEFAULT_RESULT_RETENTION_LEDGERS,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Runtime settings of the transaction pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Multiplier applied to the network base fee
    pub fee_cushion: f64,
    /// Fee ceiling used when a request carries no `max_fee` option
    pub max_fee_drops: u64,
    /// Ledgers between rebroadcasts of a still pending blob
    pub resubmit_interval_ledgers: u32,
    /// Ledgers a settled entry stays in the results cache
    pub result_retention_ledgers: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            fee_cushion: DEFAULT_FEE_CUSHION,
            max_fee_drops: DEFAULT_MAX_FEE_DROPS,
            resubmit_interval_ledgers: DEFAULT_RESUBMIT_INTERVAL_LEDGERS,
            result_retention_ledgers: DEFAULT_RESULT_RETENTION_LEDGERS,
        }
    }
}

impl GatewayConfig {
    /// Reads the configuration from the environment.
    ///
    /// Environment variables used:
    /// - GATEWAY_FEE_CUSHION: base fee multiplier (default 1.2)
    /// - GATEWAY_MAX_FEE_DROPS: default fee ceiling in drops (default 1000000)
    /// - GATEWAY_RESUBMIT_INTERVAL_LEDGERS: rebroadcast interval (default 1)
    /// - GATEWAY_RESULT_RETENTION_LEDGERS: results cache retention (default 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            fee_cushion: env_or("GATEWAY_FEE_CUSHION", DEFAULT_FEE_CUSHION)?,
            max_fee_drops: env_or("GATEWAY_MAX_FEE_DROPS", DEFAULT_MAX_FEE_DROPS)?,
            resubmit_interval_ledgers: env_or(
                "GATEWAY_RESUBMIT_INTERVAL_LEDGERS",
                DEFAULT_RESUBMIT_INTERVAL_LEDGERS,
            )?,
            result_retention_ledgers: env_or(
                "GATEWAY_RESULT_RETENTION_LEDGERS",
                DEFAULT_RESULT_RETENTION_LEDGERS,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fee_cushion.is_finite() || self.fee_cushion < 1.0 {
            return Err(ConfigError::InvalidValue {
                name: "fee_cushion".to_string(),
                message: format!("must be a finite number >= 1.0, got {}", self.fee_cushion),
            });
        }
        if self.max_fee_drops == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_fee_drops".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.resubmit_interval_ledgers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "resubmit_interval_ledgers".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.result_retention_ledgers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "result_retention_ledgers".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
