//! Input family
//!
//! An input authorizes spending one UTXO. The spend reference is the
//! [`UtxoId`] (tx id(32) · output index(4)); a [`TransferableInput`] follows
//! it with the asset id(32), the input's type tag(4) and its body.
//!
//! Transfer input body: amount(8) · signature count(4) · indices(4 each).

use crate::codec::{Codec, Family};
use crate::config::CanonicalOrder;
use crate::constants::{self, Shape, CODEC_ID_LEN, COUNT_LEN, LATEST_CODEC};
use crate::error::{CodecError, Result};
use crate::output::Output;
use crate::serialization::wire::{
    read_amount, read_count, read_id, read_u16, read_u32, write_len, write_u32,
};
use crate::serialization::{Encoding, FieldSerializer, Serializable};
use crate::types::{Address, Amount, FormatVersion, Id, TypeTag};
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::warn;

/// Reference to an output of a prior transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: Id, output_index: u32) -> Self {
        Self { tx_id, output_index }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.tx_id.as_bytes());
        write_u32(out, self.output_index);
    }

    fn decode(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (tx_id, offset) = read_id(data, offset)?;
        let (output_index, offset) = read_u32(data, offset)?;
        Ok((Self { tx_id, output_index }, offset))
    }

    fn display(&self, fields: &FieldSerializer) -> Result<Value> {
        Ok(json!({
            "txID": fields.display(self.tx_id.as_bytes(), Encoding::Cb58)?,
            "outputIndex": fields.display_number(self.output_index.into()),
        }))
    }
}

/// Spends an amount from a transfer output
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferInput {
    pub codec_id: FormatVersion,
    pub amount: Amount,
    sig_indices: Vec<u32>,
}

impl TransferInput {
    /// Signature indices are stored ascending without duplicates
    pub fn new(amount: Amount, sig_indices: impl IntoIterator<Item = u32>) -> Self {
        let mut sig_indices: Vec<u32> = sig_indices.into_iter().collect();
        sig_indices.sort_unstable();
        sig_indices.dedup();
        Self {
            codec_id: LATEST_CODEC,
            amount,
            sig_indices,
        }
    }

    pub fn sig_indices(&self) -> &[u32] {
        &self.sig_indices
    }

    pub(crate) fn decode_body(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (amount, offset) = read_amount(data, offset)?;
        let max = codec.config().max_list_len;
        let (count, mut offset) = read_count(data, offset, max, COUNT_LEN)?;
        let mut sig_indices = Vec::with_capacity(count);
        for _ in 0..count {
            let (index, next) = read_u32(data, offset)?;
            sig_indices.push(index);
            offset = next;
        }
        if sig_indices.windows(2).any(|w| w[0] >= w[1]) {
            match codec.config().canonical_order {
                CanonicalOrder::Reject => {
                    return Err(CodecError::CanonicalOrderViolation(Cow::Borrowed(
                        "signature indices are not sorted and unique",
                    )))
                }
                CanonicalOrder::Resort => {
                    warn!(count, "re-sorting signature indices");
                    sig_indices.sort_unstable();
                    sig_indices.dedup();
                }
            }
        }
        Ok((
            Self {
                codec_id: codec.active_version(Family::Input),
                amount,
                sig_indices,
            },
            offset,
        ))
    }
}

/// Any input shape
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Input {
    Transfer(TransferInput),
}

impl Input {
    pub fn shape(&self) -> Shape {
        match self {
            Input::Transfer(_) => Shape::TransferInput,
        }
    }

    pub fn codec_id(&self) -> FormatVersion {
        match self {
            Input::Transfer(i) => i.codec_id,
        }
    }

    pub fn set_codec_id(&mut self, codec_id: FormatVersion) {
        match self {
            Input::Transfer(i) => i.codec_id = codec_id,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Input::Transfer(i) => i.amount,
        }
    }

    pub fn type_tag(&self) -> Result<TypeTag> {
        let version = self.codec_id();
        constants::type_tag(self.shape(), version).ok_or(CodecError::UnknownFormatVersion(version))
    }
}

impl From<TransferInput> for Input {
    fn from(i: TransferInput) -> Self {
        Input::Transfer(i)
    }
}

impl Serializable for Input {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(32);
        write_u32(&mut out, self.type_tag()?);
        match self {
            Input::Transfer(i) => {
                out.extend_from_slice(&i.amount.to_wire()?);
                write_len(&mut out, i.sig_indices.len())?;
                for index in &i.sig_indices {
                    write_u32(&mut out, *index);
                }
            }
        }
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        codec.decode_input(data, offset)
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        match self {
            Input::Transfer(i) => Ok(json!({
                "type": "transfer",
                "typeID": fields.display_number(self.type_tag()?.into()),
                "codecID": fields.display_number(i.codec_id.into()),
                "amount": fields.display_number(i.amount.0),
                "sigIndices": i
                    .sig_indices
                    .iter()
                    .map(|idx| fields.display_number((*idx).into()))
                    .collect::<Vec<_>>(),
            })),
        }
    }
}

/// An input tagged with the asset of the output it spends
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: Option<Id>,
    pub input: Input,
}

impl TransferableInput {
    pub fn new(utxo_id: UtxoId, asset_id: Id, input: impl Into<Input>) -> Self {
        Self {
            utxo_id,
            asset_id: Some(asset_id),
            input: input.into(),
        }
    }

    /// Build an input spending `utxo` with the signatures of `signers`.
    ///
    /// The asset id and amount are taken from the UTXO, so they always
    /// match the output being spent.
    pub fn spend(utxo: &Utxo, signers: &[Address]) -> Result<Self> {
        let Output::Transfer(output) = &utxo.output else {
            return Err(CodecError::MissingRequiredField("amount"));
        };
        let sig_indices = output
            .owners
            .signature_indices(signers)
            .ok_or(CodecError::MissingRequiredField("signers"))?;
        let mut input = TransferInput::new(output.amount, sig_indices);
        input.codec_id = utxo.output.codec_id();
        Ok(Self::new(utxo.utxo_id, utxo.asset_id, input))
    }

    /// Check that this input spends `utxo` in the UTXO's own asset and amount
    pub fn check_spends(&self, utxo: &Utxo) -> Result<()> {
        if self.utxo_id != utxo.utxo_id {
            return Err(CodecError::AssetMismatch {
                expected: format!("{}:{}", utxo.utxo_id.tx_id, utxo.utxo_id.output_index),
                found: format!("{}:{}", self.utxo_id.tx_id, self.utxo_id.output_index),
            });
        }
        let asset_id = self
            .asset_id
            .ok_or(CodecError::MissingRequiredField("asset_id"))?;
        if asset_id != utxo.asset_id {
            return Err(CodecError::AssetMismatch {
                expected: utxo.asset_id.to_string(),
                found: asset_id.to_string(),
            });
        }
        match utxo.output.amount() {
            Some(amount) if amount == self.input.amount() => Ok(()),
            Some(amount) => Err(CodecError::AssetMismatch {
                expected: format!("amount {amount}"),
                found: format!("amount {}", self.input.amount()),
            }),
            None => Err(CodecError::MissingRequiredField("amount")),
        }
    }
}

impl Serializable for TransferableInput {
    /// tx id(32) · output index(4) · asset id(32) · type tag(4) · body
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let asset_id = self
            .asset_id
            .ok_or(CodecError::MissingRequiredField("asset_id"))?;
        let mut out = Vec::with_capacity(96);
        self.utxo_id.encode(&mut out);
        out.extend_from_slice(asset_id.as_bytes());
        out.extend_from_slice(&self.input.to_bytes()?);
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (utxo_id, offset) = UtxoId::decode(data, offset)?;
        let (asset_id, offset) = read_id(data, offset)?;
        let (input, offset) = codec.decode_input(data, offset)?;
        Ok((
            Self {
                utxo_id,
                asset_id: Some(asset_id),
                input,
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
            "utxoID": self.utxo_id.display(fields)?,
            "assetID": asset_id,
            "input": self.input.serialize_display(fields)?,
        }))
    }
}

/// A stored unspent output.
///
/// codec id(2) · tx id(32) · output index(4) · asset id(32) · type tag(4) · body.
/// The codec id selects the format version of the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utxo {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub output: Output,
}

impl Utxo {
    pub fn new(utxo_id: UtxoId, asset_id: Id, output: impl Into<Output>) -> Self {
        Self {
            utxo_id,
            asset_id,
            output: output.into(),
        }
    }
}

impl Serializable for Utxo {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let codec_id = u16::try_from(self.output.codec_id()).map_err(|_| {
            CodecError::Overflow(Cow::Owned(format!(
                "codec id {} exceeds {CODEC_ID_LEN}-byte field",
                self.output.codec_id()
            )))
        })?;
        let mut out = codec_id.to_be_bytes().to_vec();
        self.utxo_id.encode(&mut out);
        out.extend_from_slice(self.asset_id.as_bytes());
        out.extend_from_slice(&self.output.to_bytes()?);
        Ok(out)
    }

    fn from_bytes(codec: &Codec, data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (codec_id, offset) = read_u16(data, offset)?;
        let codec = codec.at_version(codec_id.into())?;
        let (utxo_id, offset) = UtxoId::decode(data, offset)?;
        let (asset_id, offset) = read_id(data, offset)?;
        let (output, offset) = codec.decode_output(data, offset)?;
        Ok((
            Self {
                utxo_id,
                asset_id,
                output,
            },
            offset,
        ))
    }

    fn serialize_display(&self, fields: &FieldSerializer) -> Result<Value> {
        Ok(json!({
            "codecID": fields.display_number(self.output.codec_id().into()),
            "utxoID": self.utxo_id.display(fields)?,
            "assetID": fields.display(self.asset_id.as_bytes(), Encoding::Cb58)?,
            "output": self.output.serialize_display(fields)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::constants::CODEC_ONE;
    use crate::output::{MintOutput, TransferOutput};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn codec() -> Codec {
        Codec::asset_chain(CodecConfig::default()).unwrap()
    }

    fn utxo(amount: u128) -> Utxo {
        Utxo::new(
            UtxoId::new(Id::new([0xee; 32]), 3),
            Id::new([0x11; 32]),
            TransferOutput::new(Amount(amount), [addr(1), addr(2), addr(3)], 0, 2),
        )
    }

    #[test]
    fn test_transferable_input_layout() {
        let input = TransferableInput::new(
            UtxoId::new(Id::new([0xee; 32]), 3),
            Id::new([0x11; 32]),
            TransferInput::new(Amount(9), [0]),
        );
        let bytes = input.to_bytes().unwrap();
        assert_eq!(bytes.len(), 32 + 4 + 32 + 4 + 8 + 4 + 4);
        assert_eq!(&bytes[32..36], &[0, 0, 0, 3]);
        assert_eq!(&bytes[68..72], &[0, 0, 0, 5]);
        assert_eq!(TransferableInput::from_slice(&codec(), &bytes).unwrap(), input);
    }

    #[test]
    fn test_sig_indices_canonical() {
        let input = TransferInput::new(Amount(1), [4, 1, 4]);
        assert_eq!(input.sig_indices(), &[1, 4]);

        let mut bytes = vec![0, 0, 0, 5];
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 4, 0, 0, 0, 1]);
        assert!(matches!(
            Input::from_bytes(&codec(), &bytes, 0),
            Err(CodecError::CanonicalOrderViolation(_))
        ));
    }

    #[test]
    fn test_codec_one_input() {
        let mut input = Input::from(TransferInput::new(Amount(1), [0]));
        input.set_codec_id(CODEC_ONE);
        let bytes = input.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &65541u32.to_be_bytes());
        let one = codec().at_version(CODEC_ONE).unwrap();
        assert_eq!(Input::from_slice(&one, &bytes).unwrap(), input);
        // Version 0 does not know tag 65541.
        assert!(matches!(
            Input::from_slice(&codec(), &bytes),
            Err(CodecError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_spend_copies_asset_and_amount() {
        let utxo = utxo(500);
        let input = TransferableInput::spend(&utxo, &[addr(3), addr(2)]).unwrap();
        assert_eq!(input.asset_id, Some(utxo.asset_id));
        assert_eq!(input.input.amount(), Amount(500));
        let Input::Transfer(transfer) = &input.input;
        assert_eq!(transfer.sig_indices(), &[1, 2]);
        input.check_spends(&utxo).unwrap();
    }

    #[test]
    fn test_spend_needs_threshold_signers() {
        assert_eq!(
            TransferableInput::spend(&utxo(1), &[addr(1)]),
            Err(CodecError::MissingRequiredField("signers"))
        );
    }

    #[test]
    fn test_spend_rejects_mint_output() {
        let mint = Utxo::new(UtxoId::default(), Id::default(), MintOutput::new([addr(1)], 0, 1));
        assert!(TransferableInput::spend(&mint, &[addr(1)]).is_err());
    }

    #[test]
    fn test_check_spends_detects_asset_mismatch() {
        let utxo = utxo(7);
        let mut input = TransferableInput::spend(&utxo, &[addr(1), addr(2)]).unwrap();
        input.asset_id = Some(Id::new([0x22; 32]));
        assert!(matches!(
            input.check_spends(&utxo),
            Err(CodecError::AssetMismatch { .. })
        ));
    }

    #[test]
    fn test_utxo_round_trip_with_codec_prefix() {
        let mut utxo = utxo(100);
        utxo.output.set_codec_id(CODEC_ONE);
        let bytes = utxo.to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0, 1]);
        assert_eq!(Utxo::from_slice(&codec(), &bytes).unwrap(), utxo);
    }

    #[test]
    fn test_utxo_unknown_codec_id() {
        let mut bytes = utxo(1).to_bytes().unwrap();
        bytes[1] = 9;
        assert_eq!(
            Utxo::from_slice(&codec(), &bytes),
            Err(CodecError::UnknownFormatVersion(9))
        );
    }
}
