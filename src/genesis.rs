//! Genesis assets and the genesis bundle
//!
//! GenesisAsset layout:
//! network id(4) · alias · name · symbol · denomination(1) · initial states ·
//! memo len(4) · memo
//!
//! where alias, name and symbol are each a 4-byte length plus UTF-8 bytes.
//! GenesisData is asset count(4) followed by the assets in the order they
//! were added; unlike outputs, assets are never re-sorted.

use crate::codec::Codec;
use crate::config::CodecConfig;
use crate::error::Result;
use crate::initial_states::InitialStates;
use crate::serialization::cb58::encode_checked;
use crate::constants::MIN_GENESIS_ASSET_LEN;
use crate::serialization::wire::{
    read_count, read_prefixed, read_u32, read_u8, read_utf8, write_len, write_prefixed, write_u32,
};
use crate::serialization::{Encoding, FieldSerializer, FieldValue, Serializable};
use crate::types::NetworkId;
use serde_json::{json, Value};
use tracing::trace;

/// Definition of one asset present at genesis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenesisAsset {
    pub network_id: NetworkId,
    /// Display name for the asset; written to the block but not used by
    /// consensus
    pub alias: String,
    pub name: String,
    pub symbol: String,
    /// Decimal places
    pub denomination: u8,
    pub initial_states: InitialStates,
    pub memo: Vec<u8>,
}

impl GenesisAsset {
    pub fn new(
        config: &CodecConfig,
        alias: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        denomination: u8,
        initial_states: InitialStates,
    ) -> Self {
        Self {
            network_id: config.network_id,
            alias: alias.into(),
            name: name.into(),
            symbol: symbol.into(),
            denomination,
            initial_states,
            memo: Vec::new(),
        }
    }

    /// Set the memo from a cb58 string, verifying its checksum
    pub fn set_memo_cb58(&mut self, fields: &FieldSerializer, text: &str) -> Result<()> {
        let value = FieldValue::Text(text.to_owned());
        self.memo = fields.type_to_buffer(&value, Encoding::Cb58, None)?;
        Ok(())
    }
}

impl Serializable for GenesisAsset {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        write_u32(&mut out, self.network_id);
        write_prefixed(&mut out, self.alias.as_bytes())?;
        write_prefixed(&mut out, self.name.as_bytes())?;
        write_prefixed(&mut out, self.symbol.as_bytes())?;
        out.push(self.denomination);
        out.extend_from_slice(&self.initial_states.to_bytes()?);
        write_prefixed(&mut out, &self.memo)?;
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let max = codec.config().max_field_len;
        let (network_id, offset) = read_u32(data, offset)?;
        let (alias, offset) = read_utf8(data, offset, max)?;
        let (name, offset) = read_utf8(data, offset, max)?;
        let (symbol, offset) = read_utf8(data, offset, max)?;
        let (denomination, offset) = read_u8(data, offset)?;
        let (initial_states, offset) = InitialStates::from_bytes(codec, data, offset)?;
        let (memo, offset) = read_prefixed(data, offset, codec.config().max_memo_len)?;
        Ok((
            Self {
                network_id,
                alias,
                name,
                symbol,
                denomination,
                initial_states,
                memo,
            },
            offset,
        ))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        Ok(json!({
            "networkID": fields.display_number(self.network_id.into()),
            "alias": fields.display_text(&self.alias),
            "name": fields.display_text(&self.name),
            "symbol": fields.display_text(&self.symbol),
            "denomination": fields.display_number(self.denomination.into()),
            "initialStates": self.initial_states.serialize_display(fields)?,
            "memo": fields.display(&self.memo, Encoding::Hex)?,
        }))
    }
}

/// Every asset defined by one genesis block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenesisData {
    assets: Vec<GenesisAsset>,
}

impl GenesisData {
    pub fn new(assets: Vec<GenesisAsset>) -> Self {
        Self { assets }
    }

    pub fn push(&mut self, asset: GenesisAsset) {
        self.assets.push(asset);
    }

    pub fn assets(&self) -> &[GenesisAsset] {
        &self.assets
    }

    pub fn asset(&self, alias: &str) -> Option<&GenesisAsset> {
        self.assets.iter().find(|a| a.alias == alias)
    }

    /// Checksummed text form of the encoding
    pub fn to_cb58(&self) -> Result<String> {
        Ok(encode_checked(&self.to_bytes()?))
    }
}

impl Serializable for GenesisData {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128 * self.assets.len() + 4);
        write_len(&mut out, self.assets.len())?;
        for asset in &self.assets {
            out.extend_from_slice(&asset.to_bytes()?);
        }
        trace!(assets = self.assets.len(), len = out.len(), "encoded genesis data");
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let start = offset;
        let max = codec.config().max_list_len;
        let (count, mut offset) = read_count(data, offset, max, MIN_GENESIS_ASSET_LEN)?;
        let mut assets = Vec::with_capacity(count);
        for _ in 0..count {
            let (asset, next) = GenesisAsset::from_bytes(codec, data, offset)?;
            assets.push(asset);
            offset = next;
        }
        trace!(assets = count, len = offset - start, "decoded genesis data");
        Ok((Self { assets }, offset))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let assets = self
            .assets
            .iter()
            .map(|a| a.serialize_display(fields))
            .collect::<Result<Vec<_>>>()?;
        Ok(json!({ "assets": assets }))
    }
}
