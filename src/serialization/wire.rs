//! Bounds-checked big-endian primitives
//!
//! Every reader takes an absolute offset into the buffer and returns the
//! decoded value together with the next unconsumed offset. Nothing is
//! copied except the value itself.

use crate::constants::{ADDRESS_LEN, ID_LEN};
use crate::error::{CodecError, Result};
use crate::types::{Address, Amount, Id};
use std::borrow::Cow;

/// Borrow `len` bytes starting at `offset`
#[inline]
pub fn take(data: &[u8], offset: usize, len: usize) -> Result<(&[u8], usize)> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or(CodecError::TruncatedInput {
            offset,
            needed: len,
            available: data.len().saturating_sub(offset),
        })?;
    Ok((&data[offset..end], end))
}

#[inline]
pub fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<([u8; N], usize)> {
    let (slice, next) = take(data, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok((out, next))
}

#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<(u8, usize)> {
    let (b, next) = read_array::<1>(data, offset)?;
    Ok((b[0], next))
}

#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> Result<(u16, usize)> {
    let (b, next) = read_array::<2>(data, offset)?;
    Ok((u16::from_be_bytes(b), next))
}

#[inline]
pub fn read_u32(data: &[u8], offset: usize) -> Result<(u32, usize)> {
    let (b, next) = read_array::<4>(data, offset)?;
    Ok((u32::from_be_bytes(b), next))
}

#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let (b, next) = read_array::<8>(data, offset)?;
    Ok((u64::from_be_bytes(b), next))
}

pub fn read_id(data: &[u8], offset: usize) -> Result<(Id, usize)> {
    let (b, next) = read_array::<ID_LEN>(data, offset)?;
    Ok((Id(b), next))
}

pub fn read_address(data: &[u8], offset: usize) -> Result<(Address, usize)> {
    let (b, next) = read_array::<ADDRESS_LEN>(data, offset)?;
    Ok((Address(b), next))
}

pub fn read_amount(data: &[u8], offset: usize) -> Result<(Amount, usize)> {
    let (b, next) = read_array::<8>(data, offset)?;
    Ok((Amount::from_wire(b), next))
}

/// Read a 4-byte count and check it against `max`.
///
/// Each element takes at least `min_width` bytes, so a count the rest of
/// the buffer cannot hold is reported as truncated before anything is
/// allocated for it.
pub fn read_count(
    data: &[u8],
    offset: usize,
    max: usize,
    min_width: usize,
) -> Result<(usize, usize)> {
    let (count, next) = read_u32(data, offset)?;
    let count = count as usize;
    if count > max {
        return Err(CodecError::Overflow(Cow::Owned(format!(
            "count {count} at offset {offset} exceeds limit {max}"
        ))));
    }
    let needed = count.saturating_mul(min_width);
    let available = data.len().saturating_sub(next);
    if needed > available {
        return Err(CodecError::TruncatedInput {
            offset: next,
            needed,
            available,
        });
    }
    Ok((count, next))
}

/// Read a 4-byte length followed by that many bytes
pub fn read_prefixed(data: &[u8], offset: usize, max: usize) -> Result<(Vec<u8>, usize)> {
    let (len, next) = read_count(data, offset, max, 1)?;
    let (bytes, next) = take(data, next, len)?;
    Ok((bytes.to_vec(), next))
}

pub fn read_utf8(data: &[u8], offset: usize, max: usize) -> Result<(String, usize)> {
    let (bytes, next) = read_prefixed(data, offset, max)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        CodecError::InvalidEncoding(Cow::Owned(format!(
            "string at offset {offset} is not utf-8: {e}"
        )))
    })?;
    Ok((text, next))
}

#[inline]
pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

#[inline]
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Write a length or count as 4 bytes
pub fn write_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        CodecError::Overflow(Cow::Owned(format!("length {len} exceeds 4-byte field")))
    })?;
    write_u32(out, len);
    Ok(())
}

/// Write a 4-byte length followed by the bytes
pub fn write_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    write_len(out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}
