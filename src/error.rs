//! Error types for encoding and decoding

use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("Truncated input: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A type tag with no parser under the format version being decoded
    #[error("Invalid {family} type tag {tag} for format version {version}")]
    InvalidTag {
        family: &'static str,
        version: u32,
        tag: u32,
    },

    /// The format-version case of [`CodecError::InvalidTag`]: a codec id or
    /// initial-state group names a version no family is registered under.
    #[error("Unknown format version: {0}")]
    UnknownFormatVersion(u32),

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Canonical order violation: {0}")]
    CanonicalOrderViolation(Cow<'static, str>),

    #[error("Overflow: {0}")]
    Overflow(Cow<'static, str>),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(Cow<'static, str>),

    #[error("Asset mismatch: expected {expected}, found {found}")]
    AssetMismatch { expected: String, found: String },

    #[error("Parser already registered for {family} tag {tag} at format version {version}")]
    DuplicateRegistration {
        family: &'static str,
        version: u32,
        tag: u32,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
