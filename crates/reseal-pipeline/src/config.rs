//! Pipeline configuration: endpoints, contract constants, concurrency and
//! retry settings. Every field has a production default so an empty JSON
//! object is a valid config file.

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use reqwest::blocking::Client;
use reseal_canonical::EmitterAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Endpoints and tuning for the repair pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ethereum JSON-RPC endpoint.
    pub ethereum_rpc: String,
    /// Solana JSON-RPC endpoint.
    pub solana_rpc: String,
    /// Wormholescan API root.
    pub wormholescan_api: String,
    /// Ethereum core contract address.
    pub core_contract: String,
    /// `LogMessagePublished` event topic.
    pub message_topic: String,
    /// Emitter attributed to Solana messages.
    pub solana_emitter: EmitterAddress,
    /// Concurrent transactions in a batch.
    pub workers: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Retry schedule for collaborator calls.
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ethereum_rpc: "https://ethereum-rpc.publicnode.com".into(),
            solana_rpc: "https://solana-rpc.publicnode.com".into(),
            wormholescan_api: "https://api.wormholescan.io".into(),
            core_contract: "0x98f3c9e6E3fAce36bAAd05FE09d375Ef1464288B".into(),
            message_topic: "0x6eb224fb001ed210e379b335e35efe88672a8ce935d981a6896b27ffdf52a3b2"
                .into(),
            solana_emitter: EmitterAddress::new([
                0xec, 0x73, 0x72, 0x99, 0x5d, 0x5c, 0xc8, 0x73, 0x23, 0x97, 0xfb, 0x0a, 0xd3,
                0x5c, 0x01, 0x21, 0xe0, 0xea, 0xa9, 0x0d, 0x26, 0xf8, 0x28, 0xa5, 0x34, 0xca,
                0xb5, 0x43, 0x91, 0xb3, 0xa4, 0xf5,
            ]),
            workers: 4,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot constrain.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.workers == 0 {
            return Err(PipelineError::Config("workers must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(PipelineError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(PipelineError::Config(
                "retry.multiplier must be at least 1.0".into(),
            ));
        }
        for (name, url) in [
            ("ethereum_rpc", &self.ethereum_rpc),
            ("solana_rpc", &self.solana_rpc),
            ("wormholescan_api", &self.wormholescan_api),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PipelineError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        Ok(())
    }

    /// Builds the shared blocking HTTP client.
    pub fn http_client(&self) -> Result<Client, PipelineError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("reseal/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_solana_emitter_matches_hex() {
        assert_eq!(
            PipelineConfig::default().solana_emitter.to_string(),
            "ec7372995d5cc8732397fb0ad35c0121e0eaa90d26f828a534cab54391b3a4f5"
        );
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_retry_section_keeps_other_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"workers": 8, "retry": {"max_attempts": 2}}"#).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.initial_delay_ms, 500);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = PipelineConfig {
            workers: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let config = PipelineConfig {
            solana_rpc: "ftp://example".into(),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }
}
