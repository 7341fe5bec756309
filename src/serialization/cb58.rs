//! Checksummed string encoding (cb58)
//!
//! cb58 is Base58 over `payload || sha256(payload)[28..32]`. It exists only
//! for strings humans copy around; wire buffers never carry the checksum.

use crate::constants::CHECKSUM_LEN;
use crate::error::{CodecError, Result};
use sha2::{Digest, Sha256};
use std::borrow::Cow;

/// Last [`CHECKSUM_LEN`] bytes of the SHA-256 digest of `payload`
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

pub fn encode_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn decode_base58(text: &str) -> Result<Vec<u8>> {
    bs58::decode(text)
        .into_vec()
        .map_err(|e| CodecError::InvalidEncoding(Cow::Owned(format!("base58: {e}"))))
}

/// Encode bytes as cb58
pub fn encode_checked(bytes: &[u8]) -> String {
    let mut payload = Vec::with_capacity(bytes.len() + CHECKSUM_LEN);
    payload.extend_from_slice(bytes);
    payload.extend_from_slice(&checksum(bytes));
    encode_base58(&payload)
}

/// Decode cb58 text, verifying and stripping the checksum
pub fn decode_checked(text: &str) -> Result<Vec<u8>> {
    let mut raw = decode_base58(text)?;
    if raw.len() < CHECKSUM_LEN {
        return Err(CodecError::InvalidEncoding(Cow::Owned(format!(
            "cb58 payload of {} bytes is shorter than its checksum",
            raw.len()
        ))));
    }
    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(CodecError::ChecksumMismatch);
    }
    raw.truncate(split);
    Ok(raw)
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex text; a leading `0x` is optional
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| CodecError::InvalidEncoding(Cow::Owned(format!("hex: {e}"))))
}

/// String codec service handed to the field serializer.
///
/// Stateless; it exists so callers can inject one instance rather than
/// reach for free functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl StringCodec {
    pub fn new() -> Self {
        StringCodec
    }

    pub fn encode_checked(&self, bytes: &[u8]) -> String {
        encode_checked(bytes)
    }

    pub fn decode_checked(&self, text: &str) -> Result<Vec<u8>> {
        decode_checked(text)
    }

    pub fn encode_base58(&self, bytes: &[u8]) -> String {
        encode_base58(bytes)
    }

    pub fn decode_base58(&self, text: &str) -> Result<Vec<u8>> {
        decode_base58(text)
    }

    pub fn encode_hex(&self, bytes: &[u8]) -> String {
        encode_hex(bytes)
    }

    pub fn decode_hex(&self, text: &str) -> Result<Vec<u8>> {
        decode_hex(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_round_trip() {
        let bytes = b"avalanche".to_vec();
        let text = encode_checked(&bytes);
        assert_eq!(decode_checked(&text).unwrap(), bytes);
    }

    #[test]
    fn test_empty_payload() {
        let text = encode_checked(&[]);
        assert_eq!(decode_checked(&text).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_known_memo_decodes() {
        let memo = decode_checked("2Zc54v4ek37TEwu4LiV3j41PUMRd6acDDU3ZCVSxE7X").unwrap();
        assert_eq!(memo, b"from snowflake to avalanche".to_vec());
        assert_eq!(
            encode_checked(&memo),
            "2Zc54v4ek37TEwu4LiV3j41PUMRd6acDDU3ZCVSxE7X"
        );
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut raw = b"payload".to_vec();
        raw.extend_from_slice(&checksum(b"payload"));
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert_eq!(
            decode_checked(&encode_base58(&raw)),
            Err(CodecError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_short_input_rejected() {
        let text = encode_base58(&[1, 2, 3]);
        assert!(matches!(
            decode_checked(&text),
            Err(CodecError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_invalid_alphabet_rejected() {
        // '0', 'O', 'I' and 'l' are not in the Base58 alphabet.
        assert!(decode_checked("0OIl").is_err());
    }

    #[test]
    fn test_hex_prefix_optional() {
        assert_eq!(decode_hex("0x0a0b").unwrap(), vec![10, 11]);
        assert_eq!(decode_hex("0a0b").unwrap(), vec![10, 11]);
        assert_eq!(encode_hex(&[10, 11]), "0x0a0b");
        assert!(decode_hex("0xzz").is_err());
    }
}
