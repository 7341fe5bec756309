//! Configuration for the codec
//!
//! Provides decode limits, the canonical-order policy and builder defaults.
//! Settings can be deserialized from a config file, read from environment
//! variables, or passed programmatically. A [`crate::codec::Codec`] owns its
//! configuration; there is no process-wide instance.

use crate::constants::DEFAULT_NETWORK_ID;
use serde::{Deserialize, Serialize};

/// What to do with decoded data that is not in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalOrder {
    /// Fail with `CanonicalOrderViolation`
    #[default]
    Reject,
    /// Sort the decoded items and continue
    Resort,
}

impl std::str::FromStr for CanonicalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(CanonicalOrder::Reject),
            "resort" => Ok(CanonicalOrder::Resort),
            other => Err(format!("unknown canonical order policy: {other}")),
        }
    }
}

/// Complete codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Network id used by builder defaults
    /// Default: 12345 (local network)
    #[serde(default = "default_network_id")]
    pub network_id: u32,

    /// Policy for out-of-order outputs, inputs and addresses on decode
    #[serde(default)]
    pub canonical_order: CanonicalOrder,

    /// Largest count prefix accepted on decode (outputs, inputs, addresses,
    /// signature indices, groups)
    #[serde(default = "default_max_list_len")]
    pub max_list_len: usize,

    /// Largest memo accepted on decode
    #[serde(default = "default_max_memo_len")]
    pub max_memo_len: usize,

    /// Largest string or NFT payload accepted on decode
    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,
}

fn default_network_id() -> u32 {
    DEFAULT_NETWORK_ID
}

fn default_max_list_len() -> usize {
    1 << 20
}

fn default_max_memo_len() -> usize {
    256
}

fn default_max_field_len() -> usize {
    1 << 16
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            canonical_order: CanonicalOrder::default(),
            max_list_len: default_max_list_len(),
            max_memo_len: default_max_memo_len(),
            max_field_len: default_max_field_len(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: `AVALANCHE_CODEC_<KEY>`
    ///
    /// Examples:
    /// - `AVALANCHE_CODEC_NETWORK_ID=1`
    /// - `AVALANCHE_CODEC_CANONICAL_ORDER=resort`
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AVALANCHE_CODEC_NETWORK_ID") {
            if let Ok(id) = val.parse::<u32>() {
                config.network_id = id;
            }
        }
        if let Ok(val) = std::env::var("AVALANCHE_CODEC_CANONICAL_ORDER") {
            if let Ok(policy) = val.parse::<CanonicalOrder>() {
                config.canonical_order = policy;
            }
        }
        if let Ok(val) = std::env::var("AVALANCHE_CODEC_MAX_LIST_LEN") {
            if let Ok(len) = val.parse::<usize>() {
                config.max_list_len = len;
            }
        }
        if let Ok(val) = std::env::var("AVALANCHE_CODEC_MAX_MEMO_LEN") {
            if let Ok(len) = val.parse::<usize>() {
                config.max_memo_len = len;
            }
        }
        if let Ok(val) = std::env::var("AVALANCHE_CODEC_MAX_FIELD_LEN") {
            if let Ok(len) = val.parse::<usize>() {
                config.max_field_len = len;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CodecConfig =
            serde_json::from_str(r#"{ "canonical_order": "resort" }"#).unwrap();
        assert_eq!(config.canonical_order, CanonicalOrder::Resort);
        assert_eq!(config.network_id, DEFAULT_NETWORK_ID);
        assert_eq!(config.max_memo_len, 256);
    }

    #[test]
    fn test_canonical_order_parse() {
        assert_eq!("RESORT".parse::<CanonicalOrder>(), Ok(CanonicalOrder::Resort));
        assert!("sometimes".parse::<CanonicalOrder>().is_err());
    }
}
