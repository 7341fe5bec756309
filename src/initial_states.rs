//! Initial-state table
//!
//! Outputs that exist from the moment an asset is defined, grouped by the
//! format version they are written under.
//!
//! Wire layout: group count(4) · per group, ascending by version:
//! version(4) · output count(4) · outputs sorted by their own encoding.

use crate::codec::Codec;
use crate::config::CanonicalOrder;
use crate::constants::{MIN_OUTPUT_LEN, MIN_STATE_GROUP_LEN};
use crate::error::{CodecError, Result};
use crate::output::Output;
use crate::serialization::wire::{read_count, read_u32, write_len, write_u32};
use crate::serialization::{
    encode_sorted, enforce_order, same_elements, FieldSerializer, Serializable,
};
use crate::types::FormatVersion;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct InitialStates {
    groups: BTreeMap<FormatVersion, Vec<Output>>,
}

impl InitialStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the group of the output's format version
    pub fn add_output(&mut self, output: impl Into<Output>) {
        let output = output.into();
        self.groups.entry(output.codec_id()).or_default().push(output);
    }

    pub fn outputs(&self, version: FormatVersion) -> &[Output] {
        self.groups.get(&version).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (FormatVersion, &[Output])> {
        self.groups.iter().map(|(v, outputs)| (*v, outputs.as_slice()))
    }

    /// Total outputs across all groups
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Equal when every group holds the same outputs, in any order
impl PartialEq for InitialStates {
    fn eq(&self, other: &Self) -> bool {
        if self.groups.len() != other.groups.len() {
            return false;
        }
        self.groups
            .iter()
            .zip(&other.groups)
            .all(|((va, a), (vb, b))| va == vb && same_elements(a, b))
    }
}

impl Eq for InitialStates {}

impl Serializable for InitialStates {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_len(&mut out, self.groups.len())?;
        for (version, outputs) in &self.groups {
            write_u32(&mut out, *version);
            write_len(&mut out, outputs.len())?;
            for encoded in encode_sorted(outputs)? {
                out.extend_from_slice(&encoded);
            }
        }
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let policy = codec.config().canonical_order;
        let max = codec.config().max_list_len;
        let (group_count, mut offset) = read_count(data, offset, max, MIN_STATE_GROUP_LEN)?;
        let mut groups: BTreeMap<FormatVersion, Vec<Output>> = BTreeMap::new();
        let mut previous: Option<FormatVersion> = None;
        for _ in 0..group_count {
            let (version, next) = read_u32(data, offset)?;
            if previous.is_some_and(|p| p >= version) {
                if policy == CanonicalOrder::Reject {
                    return Err(CodecError::CanonicalOrderViolation(Cow::Owned(format!(
                        "initial state group {version} follows group {}",
                        previous.unwrap_or_default()
                    ))));
                }
                warn!(version, "merging out-of-order initial state group");
            }
            previous = Some(version);
            let versioned = codec.at_version(version)?;
            let (count, mut next) = read_count(data, next, max, MIN_OUTPUT_LEN)?;
            let mut outputs = Vec::with_capacity(count);
            let mut spans = Vec::with_capacity(count);
            for _ in 0..count {
                let (output, end) = versioned.decode_output(data, next)?;
                spans.push((next, end));
                outputs.push(output);
                next = end;
            }
            let outputs = enforce_order("initial state outputs", policy, data, outputs, &spans)?;
            groups.entry(version).or_default().extend(outputs);
            offset = next;
        }
        Ok((Self { groups }, offset))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let groups = self
            .groups
            .iter()
            .map(|(version, outputs)| {
                let outputs = outputs
                    .iter()
                    .map(|o| o.serialize_display(fields))
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({
                    "codecID": fields.display_number((*version).into()),
                    "outputs": outputs,
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::constants::CODEC_ONE;
    use crate::output::{MintOutput, TransferOutput};
    use crate::types::{Address, Amount};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn codec() -> Codec {
        Codec::asset_chain(CodecConfig::default()).unwrap()
    }

    fn transfer(amount: u128) -> Output {
        TransferOutput::new(Amount(amount), [addr(1)], 0, 1).into()
    }

    #[test]
    fn test_insertion_order_does_not_change_bytes() {
        let mut a = InitialStates::new();
        a.add_output(transfer(2));
        a.add_output(MintOutput::new([addr(9)], 0, 1));
        a.add_output(transfer(1));

        let mut b = InitialStates::new();
        b.add_output(transfer(1));
        b.add_output(transfer(2));
        b.add_output(MintOutput::new([addr(9)], 0, 1));

        assert_eq!(a, b);
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_groups_ascending_by_version() {
        let mut states = InitialStates::new();
        let mut v1 = transfer(5);
        v1.set_codec_id(CODEC_ONE);
        states.add_output(v1);
        states.add_output(transfer(5));

        let bytes = states.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(states.outputs(CODEC_ONE).len(), 1);

        let decoded = InitialStates::from_slice(&codec(), &bytes).unwrap();
        assert_eq!(decoded, states);
        assert_eq!(decoded.outputs(CODEC_ONE)[0].codec_id(), CODEC_ONE);
    }

    #[test]
    fn test_out_of_order_outputs() {
        // Transfer (tag 7) sorts after mint (tag 6); write them reversed.
        let mut bytes = vec![0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2];
        bytes.extend_from_slice(&transfer(1).to_bytes().unwrap());
        let mint = Output::from(MintOutput::new([addr(9)], 0, 1));
        bytes.extend_from_slice(&mint.to_bytes().unwrap());

        assert!(matches!(
            InitialStates::from_slice(&codec(), &bytes),
            Err(CodecError::CanonicalOrderViolation(_))
        ));

        let lenient = Codec::asset_chain(CodecConfig {
            canonical_order: CanonicalOrder::Resort,
            ..CodecConfig::default()
        })
        .unwrap();
        let states = InitialStates::from_slice(&lenient, &bytes).unwrap();
        assert_eq!(states.len(), 2);
        assert_ne!(states.to_bytes().unwrap(), bytes);
    }

    fn resort_codec() -> Codec {
        Codec::asset_chain(CodecConfig {
            canonical_order: CanonicalOrder::Resort,
            ..CodecConfig::default()
        })
        .unwrap()
    }

    fn group(version: FormatVersion, outputs: &[Output]) -> Vec<u8> {
        let mut bytes = version.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(outputs.len() as u32).to_be_bytes());
        for output in outputs {
            bytes.extend_from_slice(&output.to_bytes().unwrap());
        }
        bytes
    }

    #[test]
    fn test_group_versions_must_ascend() {
        // Group 1 written before group 0
        let bytes = [0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            InitialStates::from_slice(&codec(), &bytes),
            Err(CodecError::CanonicalOrderViolation(_))
        ));

        // Group 0 written twice
        let mut bytes = vec![0, 0, 0, 2];
        bytes.extend_from_slice(&group(0, &[transfer(1)]));
        bytes.extend_from_slice(&group(0, &[transfer(2)]));
        assert!(matches!(
            InitialStates::from_slice(&codec(), &bytes),
            Err(CodecError::CanonicalOrderViolation(_))
        ));
    }

    #[test]
    fn test_resort_merges_repeated_groups() {
        let mut bytes = vec![0, 0, 0, 2];
        bytes.extend_from_slice(&group(0, &[transfer(2)]));
        bytes.extend_from_slice(&group(0, &[transfer(1)]));

        let states = InitialStates::from_slice(&resort_codec(), &bytes).unwrap();
        assert_eq!(states.groups().count(), 1);
        assert_eq!(states.outputs(0).len(), 2);

        let mut expected = InitialStates::new();
        expected.add_output(transfer(1));
        expected.add_output(transfer(2));
        assert_eq!(states, expected);
        assert_eq!(states.to_bytes().unwrap(), expected.to_bytes().unwrap());
    }

    #[test]
    fn test_resort_reorders_descending_groups() {
        let mut v1 = transfer(5);
        v1.set_codec_id(CODEC_ONE);
        let mut bytes = vec![0, 0, 0, 2];
        bytes.extend_from_slice(&group(CODEC_ONE, &[v1.clone()]));
        bytes.extend_from_slice(&group(0, &[transfer(5)]));

        let states = InitialStates::from_slice(&resort_codec(), &bytes).unwrap();
        let versions: Vec<_> = states.groups().map(|(v, _)| v).collect();
        assert_eq!(versions, vec![0, CODEC_ONE]);

        let mut expected = InitialStates::new();
        expected.add_output(transfer(5));
        expected.add_output(v1);
        assert_eq!(states, expected);
        assert_ne!(states.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_unknown_group_version() {
        let bytes = [0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, 0];
        assert_eq!(
            InitialStates::from_slice(&codec(), &bytes),
            Err(CodecError::UnknownFormatVersion(7))
        );
    }

    #[test]
    fn test_empty_table() {
        let states = InitialStates::new();
        assert!(states.is_empty());
        assert_eq!(states.to_bytes().unwrap(), vec![0, 0, 0, 0]);
    }
}
