//! Wire format serialization/deserialization
//!
//! Every domain object implements [`Serializable`]: a canonical binary
//! encoding, a decoder that reports the next unconsumed offset, and a
//! display projection for logs and JSON output.
//!
//! All integers are big-endian. Wire bytes are never checksummed; only the
//! cb58 strings produced by [`cb58`] carry a checksum.

pub mod cb58;
pub mod fields;
pub mod wire;

pub use cb58::{decode_checked, encode_checked, StringCodec};
pub use fields::{Encoding, FieldSerializer, FieldValue};

use crate::codec::Codec;
use crate::config::CanonicalOrder;
use crate::error::{CodecError, Result};
use serde_json::Value;
use std::borrow::Cow;

/// Symmetric binary round trip plus a display form.
///
/// For any value `x`, `T::from_bytes(codec, &x.to_bytes()?, 0)` yields a
/// value equal to `x` and an offset equal to the encoded length.
pub trait Serializable: Sized {
    /// Canonical encoding. Equal values always produce equal bytes.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Decode starting at `offset`; returns the value and the offset just
    /// past the consumed region.
    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)>;

    /// Human-readable projection. Not accepted by any decoder.
    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value>;

    /// Decode a buffer that must contain exactly one value
    fn from_slice(codec: &Codec, data: &[u8]) -> Result<Self> {
        let (value, end) = Self::from_bytes(codec, data, 0)?;
        if end != data.len() {
            return Err(CodecError::InvalidEncoding(Cow::Owned(format!(
                "{} trailing bytes after offset {end}",
                data.len() - end
            ))));
        }
        Ok(value)
    }
}

/// Encode each item once and sort the encodings ascending
pub(crate) fn encode_sorted<T: Serializable>(items: &[T]) -> Result<Vec<Vec<u8>>> {
    let mut encoded = items
        .iter()
        .map(Serializable::to_bytes)
        .collect::<Result<Vec<_>>>()?;
    encoded.sort();
    Ok(encoded)
}

/// Multiset equality for lists whose order is not semantic
pub(crate) fn same_elements<T: Ord + Clone>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Check decoded items arrived in ascending order of their encodings.
///
/// `spans` holds each item's `(start, end)` in `data`. Under
/// [`CanonicalOrder::Resort`] the items are reordered instead of rejected.
pub(crate) fn enforce_order<T>(
    what: &'static str,
    policy: CanonicalOrder,
    data: &[u8],
    items: Vec<T>,
    spans: &[(usize, usize)],
) -> Result<Vec<T>> {
    let sorted = spans
        .windows(2)
        .all(|w| data[w[0].0..w[0].1] <= data[w[1].0..w[1].1]);
    if sorted {
        return Ok(items);
    }
    match policy {
        CanonicalOrder::Reject => Err(CodecError::CanonicalOrderViolation(Cow::Owned(format!(
            "{what} are not sorted by encoding"
        )))),
        CanonicalOrder::Resort => {
            tracing::warn!(what, "re-sorting non-canonical decoded data");
            let mut keyed: Vec<(&[u8], T)> = spans
                .iter()
                .map(|(s, e)| &data[*s..*e])
                .zip(items)
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(b.0));
            Ok(keyed.into_iter().map(|(_, item)| item).collect())
        }
    }
}
