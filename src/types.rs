//! Core value types shared by every serializable object

use crate::constants::{ADDRESS_LEN, AMOUNT_LEN, ID_LEN};
use crate::error::{CodecError, Result};
use crate::serialization::cb58;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Numeric discriminator of a concrete object shape
pub type TypeTag = u32;

/// Numeric discriminator of a historical field layout ("codec id")
pub type FormatVersion = u32;

/// Network identifier
pub type NetworkId = u32;

/// 32-byte identifier: asset id, transaction id or blockchain id.
///
/// Renders as cb58 text.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Id(pub [u8; ID_LEN]);

impl Id {
    #[inline]
    pub fn new(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Build from a slice that must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            CodecError::InvalidEncoding(Cow::Owned(format!(
                "id must be {ID_LEN} bytes, got {}",
                bytes.len()
            )))
        })?;
        Ok(Id(array))
    }
}

impl From<[u8; ID_LEN]> for Id {
    #[inline]
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58::encode_checked(&self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Id::from_slice(&cb58::decode_checked(s)?)
    }
}

/// 20-byte address.
///
/// Ordering is the raw byte order, which is the canonical order of
/// ownership lists.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    #[inline]
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            CodecError::InvalidEncoding(Cow::Owned(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            )))
        })?;
        Ok(Address(array))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    #[inline]
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58::encode_checked(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Address::from_slice(&cb58::decode_checked(s)?)
    }
}

/// Non-negative amount with headroom above 64 bits.
///
/// The wire field is 8 bytes; values that do not fit fail the encode
/// with [`CodecError::Overflow`].
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest amount the wire field can carry
    pub const MAX_ENCODABLE: Amount = Amount(u64::MAX as u128);

    #[inline]
    pub fn new(value: u128) -> Self {
        Amount(value)
    }

    /// Fixed-width big-endian wire form
    pub fn to_wire(self) -> Result<[u8; AMOUNT_LEN]> {
        let narrow = u64::try_from(self.0).map_err(|_| {
            CodecError::Overflow(Cow::Owned(format!(
                "amount {} exceeds {AMOUNT_LEN}-byte field",
                self.0
            )))
        })?;
        Ok(narrow.to_be_bytes())
    }

    #[inline]
    pub fn from_wire(bytes: [u8; AMOUNT_LEN]) -> Self {
        Amount(u64::from_be_bytes(bytes) as u128)
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl From<u64> for Amount {
    #[inline]
    fn from(value: u64) -> Self {
        Amount(value as u128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
