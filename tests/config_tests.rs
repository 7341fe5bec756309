//! Configuration module tests
//!
//! Tests for codec configuration defaults, file loading and the effect of
//! limits on decoding.

use avalanche_codec::config::{CanonicalOrder, CodecConfig};
use avalanche_codec::constants::DEFAULT_NETWORK_ID;
use avalanche_codec::{
    Address, Amount, BaseTx, Codec, CodecError, Id, Serializable, TransferOutput,
    TransferableOutput,
};

#[test]
fn test_codec_config_default() {
    let config = CodecConfig::default();

    assert_eq!(config.network_id, DEFAULT_NETWORK_ID);
    assert_eq!(config.canonical_order, CanonicalOrder::Reject);
    assert_eq!(config.max_list_len, 1 << 20);
    assert_eq!(config.max_memo_len, 256);
    assert_eq!(config.max_field_len, 65536);
}

#[test]
fn test_codec_config_json_round_trip() {
    let config = CodecConfig {
        network_id: 1,
        canonical_order: CanonicalOrder::Resort,
        ..CodecConfig::default()
    };
    let text = serde_json::to_string(&config).unwrap();
    assert!(text.contains("\"resort\""));
    let parsed: CodecConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_empty_json_is_default() {
    let parsed: CodecConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed, CodecConfig::default());
}

#[test]
fn test_codec_config_from_env() {
    std::env::set_var("AVALANCHE_CODEC_NETWORK_ID", "5");
    std::env::set_var("AVALANCHE_CODEC_CANONICAL_ORDER", "Resort");
    std::env::set_var("AVALANCHE_CODEC_MAX_MEMO_LEN", "not a number");

    let config = CodecConfig::from_env();

    std::env::remove_var("AVALANCHE_CODEC_NETWORK_ID");
    std::env::remove_var("AVALANCHE_CODEC_CANONICAL_ORDER");
    std::env::remove_var("AVALANCHE_CODEC_MAX_MEMO_LEN");

    assert_eq!(config.network_id, 5);
    assert_eq!(config.canonical_order, CanonicalOrder::Resort);
    // Unparseable values keep the default.
    assert_eq!(config.max_memo_len, 256);
}

#[test]
fn test_builder_defaults_follow_config() {
    let config = CodecConfig {
        network_id: 1,
        ..CodecConfig::default()
    };
    let tx = BaseTx::with_config(&config, Id::default());
    assert_eq!(tx.network_id, 1);
}

#[test]
fn test_max_list_len_limits_decode() {
    let mut tx = BaseTx::new(1, Id::default());
    for b in 0..3u8 {
        tx.add_output(TransferableOutput::new(
            Id::new([b; 32]),
            TransferOutput::new(Amount(1), [Address::new([1; 20])], 0, 1),
        ));
    }
    let bytes = tx.to_bytes().unwrap();

    let tight = Codec::asset_chain(CodecConfig {
        max_list_len: 2,
        ..CodecConfig::default()
    })
    .unwrap();
    assert!(matches!(
        BaseTx::from_slice(&tight, &bytes),
        Err(CodecError::Overflow(_))
    ));

    let loose = Codec::asset_chain(CodecConfig::default()).unwrap();
    assert_eq!(BaseTx::from_slice(&loose, &bytes).unwrap(), tx);
}
