//! SDK configuration.
//!
//! Values come from the process environment, after loading an optional
//! `.env` file:
//!
//! | Variable           | Field              | Default     |
//! |--------------------|--------------------|-------------|
//! | `ABELSDK_CHAIN_ID` | `chain_id`         | `0`         |
//! | `ABELSDK_DEBUG`    | `debug`            | off         |
//! | `ABELSDK_TX_FEE`   | `estimated_tx_fee` | `1_000_000` |

use abel_core::constants::{
    DEFAULT_CHAIN_ID, DEFAULT_ESTIMATED_TX_FEE, ENV_CHAIN_ID, ENV_DEBUG, ENV_TX_FEE,
    MAX_ABEL_ADDRESS_CHAIN_ID,
};
use abel_core::error::{AbelError, Result};
use abel_core::traits::CryptoBackend;
use abel_core::types::{AbelAddress, CryptoAddress};

/// Runtime settings for the SDK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdkConfig {
    /// Chain ID used for new Abel addresses
    pub chain_id: u8,
    /// Whether debug logging is enabled
    pub debug: bool,
    /// Fee used when a transaction does not name one, in neutrino
    pub estimated_tx_fee: i64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            debug: false,
            estimated_tx_fee: DEFAULT_ESTIMATED_TX_FEE,
        }
    }
}

impl SdkConfig {
    /// Loads configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparsable ones are
    /// a `ConfigError`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            chain_id: parse_var(ENV_CHAIN_ID)?.unwrap_or(defaults.chain_id),
            debug: std::env::var(ENV_DEBUG)
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.debug),
            estimated_tx_fee: parse_var(ENV_TX_FEE)?.unwrap_or(defaults.estimated_tx_fee),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that the chain ID fits an Abel address and the fee is not negative.
    pub fn validate(&self) -> Result<()> {
        if self.chain_id > MAX_ABEL_ADDRESS_CHAIN_ID {
            return Err(AbelError::ConfigError(format!(
                "chain id {} is not in range [0, {}]",
                self.chain_id, MAX_ABEL_ADDRESS_CHAIN_ID
            )));
        }

        if self.estimated_tx_fee < 0 {
            return Err(AbelError::ConfigError(format!(
                "estimated tx fee must not be negative (got {})",
                self.estimated_tx_fee
            )));
        }

        Ok(())
    }

    /// Builds the Abel address of `crypto_address` on the configured chain.
    pub fn abel_address(
        &self,
        crypto_address: &CryptoAddress,
        backend: &dyn CryptoBackend,
    ) -> Result<AbelAddress> {
        AbelAddress::from_crypto_address(crypto_address, self.chain_id, backend)
    }
}

/// Interprets a debug toggle value: `true`, `1`, `on` or `yes`, any case.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AbelError::ConfigError(format!("{} has invalid value {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}
