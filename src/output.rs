//! Output family
//!
//! Every output is locked under [`OutputOwners`]: a locktime, a threshold and
//! a canonically ordered set of addresses. Shapes:
//!
//! | shape          | body                                                   |
//! |----------------|--------------------------------------------------------|
//! | transfer       | amount(8) · owners                                     |
//! | mint           | owners                                                 |
//! | owner          | owners                                                 |
//! | nft mint       | group id(4) · owners                                   |
//! | nft transfer   | group id(4) · payload len(4) · payload · owners        |
//!
//! owners = locktime(8) · threshold(4) · address count(4) · addresses(20 each)
//!
//! On the wire an output is always preceded by its 4-byte type tag, and a
//! [`TransferableOutput`] prefixes that with the 32-byte asset id.

use crate::codec::{Codec, Family};
use crate::config::CanonicalOrder;
use crate::constants::{self, Shape, ADDRESS_LEN, LATEST_CODEC};
use crate::error::{CodecError, Result};
use crate::serialization::wire::{
    read_address, read_amount, read_count, read_id, read_prefixed, read_u32, read_u64,
    write_len, write_prefixed, write_u32, write_u64,
};
use crate::serialization::{Encoding, FieldSerializer, Serializable};
use crate::types::{Address, Amount, FormatVersion, Id, TypeTag};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::warn;

/// Threshold ownership: who may spend an output and from when.
///
/// Addresses are kept sorted ascending with no duplicates, so two equal
/// ownership sets always encode identically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    addresses: Vec<Address>,
}

impl OutputOwners {
    pub fn new(
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        let mut addresses: Vec<Address> = addresses.into_iter().collect();
        addresses.sort_unstable();
        addresses.dedup();
        Self {
            locktime,
            threshold,
            addresses,
        }
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Insert keeping canonical order; returns false if already present
    pub fn add_address(&mut self, address: Address) -> bool {
        match self.addresses.binary_search(&address) {
            Ok(_) => false,
            Err(pos) => {
                self.addresses.insert(pos, address);
                true
            }
        }
    }

    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.addresses.binary_search(address).ok().map(|i| i as u32)
    }

    /// Spendable at Unix time `time`
    pub fn is_unlocked_at(&self, time: u64) -> bool {
        time >= self.locktime
    }

    /// Indices of the first `threshold` owners that appear in `signers`,
    /// or `None` when not enough of them sign.
    pub fn signature_indices(&self, signers: &[Address]) -> Option<Vec<u32>> {
        let indices: Vec<u32> = self
            .addresses
            .iter()
            .enumerate()
            .filter(|(_, a)| signers.contains(a))
            .map(|(i, _)| i as u32)
            .take(self.threshold as usize)
            .collect();
        (indices.len() == self.threshold as usize).then_some(indices)
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        write_u64(out, self.locktime);
        write_u32(out, self.threshold);
        write_len(out, self.addresses.len())?;
        for address in &self.addresses {
            out.extend_from_slice(address.as_bytes());
        }
        Ok(())
    }

    pub(crate) fn decode(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (locktime, offset) = read_u64(data, offset)?;
        let (threshold, offset) = read_u32(data, offset)?;
        let max = codec.config().max_list_len;
        let (count, mut offset) = read_count(data, offset, max, ADDRESS_LEN)?;
        let mut addresses = Vec::with_capacity(count);
        for _ in 0..count {
            let (address, next) = read_address(data, offset)?;
            addresses.push(address);
            offset = next;
        }
        if addresses.windows(2).any(|w| w[0] >= w[1]) {
            match codec.config().canonical_order {
                CanonicalOrder::Reject => {
                    return Err(CodecError::CanonicalOrderViolation(Cow::Borrowed(
                        "owner addresses are not sorted and unique",
                    )))
                }
                CanonicalOrder::Resort => {
                    warn!(count, "re-sorting owner addresses");
                    addresses.sort_unstable();
                    addresses.dedup();
                }
            }
        }
        Ok((
            Self {
                locktime,
                threshold,
                addresses,
            },
            offset,
        ))
    }

    fn display_into(
        &self,
        fields: &FieldSerializer,
        map: &mut serde_json::Map<String, Value>,
    ) -> Result<()> {
        map.insert("locktime".into(), fields.display_number(self.locktime.into()));
        map.insert("threshold".into(), fields.display_number(self.threshold.into()));
        let addresses = self
            .addresses
            .iter()
            .map(|a| fields.display(a.as_bytes(), Encoding::Cb58))
            .collect::<Result<Vec<_>>>()?;
        map.insert("addresses".into(), Value::Array(addresses));
        Ok(())
    }
}

/// Amount-carrying output
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferOutput {
    pub codec_id: FormatVersion,
    pub amount: Amount,
    pub owners: OutputOwners,
}

impl TransferOutput {
    pub fn new(
        amount: Amount,
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            amount,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (amount, offset) = read_amount(data, offset)?;
        let (owners, offset) = OutputOwners::decode(codec, data, offset)?;
        Ok((
            Self {
                codec_id: codec.active_version(Family::Output),
                amount,
                owners,
            },
            offset,
        ))
    }
}

/// Grants the right to mint more of an asset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MintOutput {
    pub codec_id: FormatVersion,
    pub owners: OutputOwners,
}

impl MintOutput {
    pub fn new(
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (owners, offset) = OutputOwners::decode(codec, data, offset)?;
        Ok((
            Self {
                codec_id: codec.active_version(Family::Output),
                owners,
            },
            offset,
        ))
    }
}

/// Governance rights over a non-asset object such as a subnet
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerOutput {
    pub codec_id: FormatVersion,
    pub owners: OutputOwners,
}

impl OwnerOutput {
    pub fn new(
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (owners, offset) = OutputOwners::decode(codec, data, offset)?;
        Ok((
            Self {
                codec_id: codec.active_version(Family::Output),
                owners,
            },
            offset,
        ))
    }
}

/// Right to mint NFTs within one group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NftMintOutput {
    pub codec_id: FormatVersion,
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl NftMintOutput {
    pub fn new(
        group_id: u32,
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            group_id,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (group_id, offset) = read_u32(data, offset)?;
        let (owners, offset) = OutputOwners::decode(codec, data, offset)?;
        Ok((
            Self {
                codec_id: codec.active_version(Family::Output),
                group_id,
                owners,
            },
            offset,
        ))
    }
}

/// One NFT: group id plus an opaque payload
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NftTransferOutput {
    pub codec_id: FormatVersion,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    pub fn new(
        group_id: u32,
        payload: Vec<u8>,
        addresses: impl IntoIterator<Item = Address>,
        locktime: u64,
        threshold: u32,
    ) -> Self {
        Self {
            codec_id: LATEST_CODEC,
            group_id,
            payload,
            owners: OutputOwners::new(addresses, locktime, threshold),
        }
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (group_id, offset) = read_u32(data, offset)?;
        let (payload, offset) = read_prefixed(data, offset, codec.config().max_field_len)?;
        let (owners, offset) = OutputOwners::decode(codec, data, offset)?;
        Ok((
            Self {
                codec_id: codec.active_version(Family::Output),
                group_id,
                payload,
                owners,
            },
            offset,
        ))
    }
}

/// Any output shape
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Output {
    Transfer(TransferOutput),
    Mint(MintOutput),
    Owner(OwnerOutput),
    NftMint(NftMintOutput),
    NftTransfer(NftTransferOutput),
}

impl Output {
    pub fn shape(&self) -> Shape {
        match self {
            Output::Transfer(_) => Shape::TransferOutput,
            Output::Mint(_) => Shape::MintOutput,
            Output::Owner(_) => Shape::OwnerOutput,
            Output::NftMint(_) => Shape::NftMintOutput,
            Output::NftTransfer(_) => Shape::NftTransferOutput,
        }
    }

    pub fn codec_id(&self) -> FormatVersion {
        match self {
            Output::Transfer(o) => o.codec_id,
            Output::Mint(o) => o.codec_id,
            Output::Owner(o) => o.codec_id,
            Output::NftMint(o) => o.codec_id,
            Output::NftTransfer(o) => o.codec_id,
        }
    }

    /// Select the format version this output is written under
    pub fn set_codec_id(&mut self, codec_id: FormatVersion) {
        match self {
            Output::Transfer(o) => o.codec_id = codec_id,
            Output::Mint(o) => o.codec_id = codec_id,
            Output::Owner(o) => o.codec_id = codec_id,
            Output::NftMint(o) => o.codec_id = codec_id,
            Output::NftTransfer(o) => o.codec_id = codec_id,
        }
    }

    pub fn owners(&self) -> &OutputOwners {
        match self {
            Output::Transfer(o) => &o.owners,
            Output::Mint(o) => &o.owners,
            Output::Owner(o) => &o.owners,
            Output::NftMint(o) => &o.owners,
            Output::NftTransfer(o) => &o.owners,
        }
    }

    /// Amount carried, for transfer outputs only
    pub fn amount(&self) -> Option<Amount> {
        match self {
            Output::Transfer(o) => Some(o.amount),
            _ => None,
        }
    }

    pub fn type_tag(&self) -> Result<TypeTag> {
        let version = self.codec_id();
        constants::type_tag(self.shape(), version).ok_or(CodecError::UnknownFormatVersion(version))
    }

    fn encode_body(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Output::Transfer(o) => {
                out.extend_from_slice(&o.amount.to_wire()?);
                o.owners.encode(out)
            }
            Output::Mint(o) => o.owners.encode(out),
            Output::Owner(o) => o.owners.encode(out),
            Output::NftMint(o) => {
                write_u32(out, o.group_id);
                o.owners.encode(out)
            }
            Output::NftTransfer(o) => {
                write_u32(out, o.group_id);
                write_prefixed(out, &o.payload)?;
                o.owners.encode(out)
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Output::Transfer(_) => "transfer",
            Output::Mint(_) => "mint",
            Output::Owner(_) => "owner",
            Output::NftMint(_) => "nftMint",
            Output::NftTransfer(_) => "nftTransfer",
        }
    }
}

impl From<TransferOutput> for Output {
    fn from(o: TransferOutput) -> Self {
        Output::Transfer(o)
    }
}

impl From<MintOutput> for Output {
    fn from(o: MintOutput) -> Self {
        Output::Mint(o)
    }
}

impl From<OwnerOutput> for Output {
    fn from(o: OwnerOutput) -> Self {
        Output::Owner(o)
    }
}

impl From<NftMintOutput> for Output {
    fn from(o: NftMintOutput) -> Self {
        Output::NftMint(o)
    }
}

impl From<NftTransferOutput> for Output {
    fn from(o: NftTransferOutput) -> Self {
        Output::NftTransfer(o)
    }
}

impl Serializable for Output {
    /// Type tag followed by the shape's body
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(64);
        write_u32(&mut out, self.type_tag()?);
        self.encode_body(&mut out)?;
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        codec.decode_output(data, offset)
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let mut map = serde_json::Map::new();
        map.insert("type".into(), Value::from(self.kind()));
        map.insert("typeID".into(), fields.display_number(self.type_tag()?.into()));
        map.insert("codecID".into(), fields.display_number(self.codec_id().into()));
        match self {
            Output::Transfer(o) => {
                map.insert("amount".into(), fields.display_number(o.amount.0));
            }
            Output::NftMint(o) => {
                map.insert("groupID".into(), fields.display_number(o.group_id.into()));
            }
            Output::NftTransfer(o) => {
                map.insert("groupID".into(), fields.display_number(o.group_id.into()));
                map.insert("payload".into(), fields.display(&o.payload, Encoding::Hex)?);
            }
            Output::Mint(_) | Output::Owner(_) => {}
        }
        self.owners().display_into(fields, &mut map)?;
        Ok(Value::Object(map))
    }
}

/// An output tagged with the asset it denominates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferableOutput {
    pub asset_id: Option<Id>,
    pub output: Output,
}

impl TransferableOutput {
    pub fn new(asset_id: Id, output: impl Into<Output>) -> Self {
        Self {
            asset_id: Some(asset_id),
            output: output.into(),
        }
    }
}

impl Serializable for TransferableOutput {
    /// asset id(32) · type tag(4) · body
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let asset_id = self
            .asset_id
            .ok_or(CodecError::MissingRequiredField("asset_id"))?;
        let mut out = asset_id.as_bytes().to_vec();
        out.extend_from_slice(&self.output.to_bytes()?);
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (asset_id, offset) = read_id(data, offset)?;
        let (output, offset) = codec.decode_output(data, offset)?;
        Ok((
            Self {
                asset_id: Some(asset_id),
                output,
            },
            offset,
        ))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let asset_id = self
            .asset_id
            .map(|id| fields.display(id.as_bytes(), Encoding::Cb58))
            .transpose()?
            .unwrap_or(Value::Null);
        Ok(json!({
            "assetID": asset_id,
            "output": self.output.serialize_display(fields)?,
        }))
    }
}
