//! Transaction family
//!
//! [`BaseTx`] is the envelope every transaction starts with. Subtypes embed a
//! `BaseTx` and append their own fields after it.
//!
//! BaseTx layout:
//! network id(4) · blockchain id(32) · output count(4) · outputs ·
//! input count(4) · inputs · memo len(4) · memo
//!
//! Outputs and inputs are written sorted by their own encoding. An
//! [`UnsignedTx`] frames a transaction as codec id(2) · tx tag(4) · body; the
//! codec id pins the format version of everything nested inside.

use crate::codec::{Codec, Family};
use crate::config::CodecConfig;
use crate::constants::{
    BASE_TX, CODEC_ID_LEN, CREATE_SUBNET_TX, LATEST_CODEC, MIN_TRANSFERABLE_INPUT_LEN,
    MIN_TRANSFERABLE_OUTPUT_LEN,
};
use crate::error::{CodecError, Result};
use crate::input::TransferableInput;
use crate::output::{Output, OwnerOutput, TransferableOutput};
use crate::serialization::wire::{
    read_count, read_id, read_prefixed, read_u16, read_u32, write_len, write_prefixed, write_u32,
};
use crate::serialization::{
    encode_sorted, enforce_order, same_elements, Encoding, FieldSerializer, Serializable,
};
use crate::types::{Amount, FormatVersion, Id, NetworkId, TypeTag};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use tracing::trace;

/// Common transaction envelope
#[derive(Debug, Clone, Default)]
pub struct BaseTx {
    pub network_id: NetworkId,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    pub fn new(network_id: NetworkId, blockchain_id: Id) -> Self {
        Self {
            network_id,
            blockchain_id,
            ..Self::default()
        }
    }

    /// Empty envelope on the configured network
    pub fn with_config(config: &CodecConfig, blockchain_id: Id) -> Self {
        Self::new(config.network_id, blockchain_id)
    }

    pub fn add_output(&mut self, output: TransferableOutput) -> &mut Self {
        self.outputs.push(output);
        self
    }

    pub fn add_input(&mut self, input: TransferableInput) -> &mut Self {
        self.inputs.push(input);
        self
    }

    pub fn set_memo(&mut self, memo: impl Into<Vec<u8>>) -> &mut Self {
        self.memo = memo.into();
        self
    }

    /// Sum of outputs denominated in `asset_id`
    pub fn output_total(&self, asset_id: &Id) -> Result<Amount> {
        self.outputs
            .iter()
            .filter(|o| o.asset_id.as_ref() == Some(asset_id))
            .filter_map(|o| o.output.amount())
            .try_fold(Amount::ZERO, checked_sum)
    }

    /// Sum of inputs spending `asset_id`
    pub fn input_total(&self, asset_id: &Id) -> Result<Amount> {
        self.inputs
            .iter()
            .filter(|i| i.asset_id.as_ref() == Some(asset_id))
            .map(|i| i.input.amount())
            .try_fold(Amount::ZERO, checked_sum)
    }

    fn set_codec_id(&mut self, codec_id: FormatVersion) {
        for output in &mut self.outputs {
            output.output.set_codec_id(codec_id);
        }
        for input in &mut self.inputs {
            input.input.set_codec_id(codec_id);
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        write_u32(out, self.network_id);
        out.extend_from_slice(self.blockchain_id.as_bytes());
        write_len(out, self.outputs.len())?;
        for encoded in encode_sorted(&self.outputs)? {
            out.extend_from_slice(&encoded);
        }
        write_len(out, self.inputs.len())?;
        for encoded in encode_sorted(&self.inputs)? {
            out.extend_from_slice(&encoded);
        }
        write_prefixed(out, &self.memo)
    }

    pub(crate) fn decode(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let config = codec.config();
        let (network_id, offset) = read_u32(data, offset)?;
        let (blockchain_id, offset) = read_id(data, offset)?;

        let max = config.max_list_len;
        let (count, mut offset) = read_count(data, offset, max, MIN_TRANSFERABLE_OUTPUT_LEN)?;
        let mut outputs = Vec::with_capacity(count);
        let mut spans = Vec::with_capacity(count);
        for _ in 0..count {
            let (output, end) = TransferableOutput::from_bytes(codec, data, offset)?;
            spans.push((offset, end));
            outputs.push(output);
            offset = end;
        }
        let outputs = enforce_order("outputs", config.canonical_order, data, outputs, &spans)?;

        let (count, mut offset) = read_count(data, offset, max, MIN_TRANSFERABLE_INPUT_LEN)?;
        let mut inputs = Vec::with_capacity(count);
        let mut spans = Vec::with_capacity(count);
        for _ in 0..count {
            let (input, end) = TransferableInput::from_bytes(codec, data, offset)?;
            spans.push((offset, end));
            inputs.push(input);
            offset = end;
        }
        let inputs = enforce_order("inputs", config.canonical_order, data, inputs, &spans)?;

        let (memo, offset) = read_prefixed(data, offset, config.max_memo_len)?;
        Ok((
            Self {
                network_id,
                blockchain_id,
                outputs,
                inputs,
                memo,
            },
            offset,
        ))
    }

    fn display_into(
        &self,
        fields: &FieldSerializer,
        map: &mut serde_json::Map<String, Value>,
    ) -> Result<()> {
        map.insert("networkID".into(), fields.display_number(self.network_id.into()));
        map.insert(
            "blockchainID".into(),
            fields.display(self.blockchain_id.as_bytes(), Encoding::Cb58)?,
        );
        let outputs = self
            .outputs
            .iter()
            .map(|o| o.serialize_display(fields))
            .collect::<Result<Vec<_>>>()?;
        map.insert("outputs".into(), Value::Array(outputs));
        let inputs = self
            .inputs
            .iter()
            .map(|i| i.serialize_display(fields))
            .collect::<Result<Vec<_>>>()?;
        map.insert("inputs".into(), Value::Array(inputs));
        map.insert("memo".into(), fields.display(&self.memo, Encoding::Hex)?);
        Ok(())
    }
}

fn checked_sum(total: Amount, amount: Amount) -> Result<Amount> {
    total
        .checked_add(amount)
        .ok_or(CodecError::Overflow(Cow::Borrowed("amount total")))
}

/// Equal when outputs and inputs match as sets, in any order
impl PartialEq for BaseTx {
    fn eq(&self, other: &Self) -> bool {
        self.network_id == other.network_id
            && self.blockchain_id == other.blockchain_id
            && self.memo == other.memo
            && same_elements(&self.outputs, &other.outputs)
            && same_elements(&self.inputs, &other.inputs)
    }
}

impl Eq for BaseTx {}

impl Serializable for BaseTx {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Self::decode(codec, data, offset)
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let mut map = serde_json::Map::new();
        self.display_into(fields, &mut map)?;
        Ok(Value::Object(map))
    }
}

/// Creates a subnet governed by `subnet_owners`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    pub subnet_owners: Option<OwnerOutput>,
}

impl CreateSubnetTx {
    pub fn new(base: BaseTx, subnet_owners: OwnerOutput) -> Self {
        Self {
            base,
            subnet_owners: Some(subnet_owners),
        }
    }

    fn set_codec_id(&mut self, codec_id: FormatVersion) {
        self.base.set_codec_id(codec_id);
        if let Some(owners) = &mut self.subnet_owners {
            owners.codec_id = codec_id;
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let owners = self
            .subnet_owners
            .as_ref()
            .ok_or(CodecError::MissingRequiredField("subnet_owners"))?;
        self.base.encode_into(out)?;
        out.extend_from_slice(&Output::Owner(owners.clone()).to_bytes()?);
        Ok(())
    }

    pub(crate) fn decode(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (base, offset) = BaseTx::decode(codec, data, offset)?;
        let (tag, _) = read_u32(data, offset)?;
        match codec.decode_output(data, offset)? {
            (Output::Owner(owners), offset) => Ok((
                Self {
                    base,
                    subnet_owners: Some(owners),
                },
                offset,
            )),
            _ => Err(CodecError::InvalidTag {
                family: Family::Output.name(),
                version: codec.active_version(Family::Output),
                tag,
            }),
        }
    }
}

impl Serializable for CreateSubnetTx {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(160);
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        Self::decode(codec, data, offset)
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let mut map = serde_json::Map::new();
        self.base.display_into(fields, &mut map)?;
        let owners = match &self.subnet_owners {
            Some(o) => Output::Owner(o.clone()).serialize_display(fields)?,
            None => Value::Null,
        };
        map.insert("subnetOwners".into(), owners);
        Ok(Value::Object(map))
    }
}

/// Any transaction, written as type tag(4) · body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Base(BaseTx),
    CreateSubnet(CreateSubnetTx),
}

impl Transaction {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Transaction::Base(_) => BASE_TX,
            Transaction::CreateSubnet(_) => CREATE_SUBNET_TX,
        }
    }

    pub fn base(&self) -> &BaseTx {
        match self {
            Transaction::Base(tx) => tx,
            Transaction::CreateSubnet(tx) => &tx.base,
        }
    }

    /// Rewrite the format version of every nested output and input
    pub fn set_codec_id(&mut self, codec_id: FormatVersion) {
        match self {
            Transaction::Base(tx) => tx.set_codec_id(codec_id),
            Transaction::CreateSubnet(tx) => tx.set_codec_id(codec_id),
        }
    }
}

impl From<BaseTx> for Transaction {
    fn from(tx: BaseTx) -> Self {
        Transaction::Base(tx)
    }
}

impl From<CreateSubnetTx> for Transaction {
    fn from(tx: CreateSubnetTx) -> Self {
        Transaction::CreateSubnet(tx)
    }
}

impl Serializable for Transaction {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(160);
        write_u32(&mut out, self.type_tag());
        match self {
            Transaction::Base(tx) => tx.encode_into(&mut out)?,
            Transaction::CreateSubnet(tx) => tx.encode_into(&mut out)?,
        }
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        codec.decode_transaction(data, offset)
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        let (kind, body) = match self {
            Transaction::Base(tx) => ("base", tx.serialize_display(fields)?),
            Transaction::CreateSubnet(tx) => ("createSubnet", tx.serialize_display(fields)?),
        };
        Ok(json!({
            "type": kind,
            "typeID": fields.display_number(self.type_tag().into()),
            "tx": body,
        }))
    }
}

/// Signing payload: a transaction framed with its codec id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    codec_id: FormatVersion,
    transaction: Transaction,
}

impl UnsignedTx {
    /// Frame `transaction` under `codec_id`, rewriting nested objects to
    /// that format version
    pub fn new(codec_id: FormatVersion, transaction: impl Into<Transaction>) -> Self {
        let mut transaction = transaction.into();
        transaction.set_codec_id(codec_id);
        Self {
            codec_id,
            transaction,
        }
    }

    pub fn latest(transaction: impl Into<Transaction>) -> Self {
        Self::new(LATEST_CODEC, transaction)
    }

    pub fn codec_id(&self) -> FormatVersion {
        self.codec_id
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }

    /// SHA-256 of the encoding; the id signers commit to
    pub fn hash(&self) -> Result<Id> {
        let digest = Sha256::digest(self.to_bytes()?);
        Ok(Id::new(digest.into()))
    }
}

impl Serializable for UnsignedTx {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let codec_id = u16::try_from(self.codec_id).map_err(|_| {
            CodecError::Overflow(Cow::Owned(format!(
                "codec id {} exceeds {CODEC_ID_LEN}-byte field",
                self.codec_id
            )))
        })?;
        let mut out = codec_id.to_be_bytes().to_vec();
        out.extend_from_slice(&self.transaction.to_bytes()?);
        trace!(
            codec_id,
            tx_type = self.transaction.type_tag(),
            len = out.len(),
            "encoded unsigned tx"
        );
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (codec_id, next) = read_u16(data, offset)?;
        let codec_id = FormatVersion::from(codec_id);
        let (transaction, next) = codec.at_version(codec_id)?.decode_transaction(data, next)?;
        trace!(codec_id, len = next - offset, "decoded unsigned tx");
        Ok((
            Self {
                codec_id,
                transaction,
            },
            next,
        ))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        Ok(json!({
            "codecID": fields.display_number(self.codec_id.into()),
            "transaction": self.transaction.serialize_display(fields)?,
        }))
    }
}
