//! Type/version registry
//!
//! A [`Registry`] maps `(FormatVersion, TypeTag)` to the parser for one
//! concrete shape of a family. A [`Codec`] bundles the three family
//! registries, the active format version of each family and the decoding
//! configuration.
//!
//! Decoding a polymorphic region always reads the 4-byte tag first, resolves
//! the parser for the active version, then hands it the remaining bytes.
//! Registries are populated through [`CodecBuilder`] and are immutable once
//! built, so a `Codec` can be shared freely between threads.

use crate::config::CodecConfig;
use crate::constants::{self, Shape, BASE_TX, CODEC_ONE, CREATE_SUBNET_TX, LATEST_CODEC};
use crate::error::{CodecError, Result};
use crate::input::{Input, TransferInput};
use crate::output::{
    MintOutput, NftMintOutput, NftTransferOutput, Output, OwnerOutput, TransferOutput,
};
use crate::serialization::wire::read_u32;
use crate::serialization::FieldSerializer;
use crate::transaction::{BaseTx, CreateSubnetTx, Transaction};
use crate::types::{FormatVersion, TypeTag};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Object families with independent tag spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Output,
    Input,
    Transaction,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Output => "output",
            Family::Input => "input",
            Family::Transaction => "transaction",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the body that follows a type tag
pub type Parser<T> = fn(&Codec, &[u8], usize) -> Result<(T, usize)>;

/// Tag-to-parser table for one family
pub struct Registry<T> {
    family: Family,
    parsers: HashMap<(FormatVersion, TypeTag), Parser<T>>,
}

impl<T> Registry<T> {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            parsers: HashMap::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn register(
        &mut self,
        version: FormatVersion,
        tag: TypeTag,
        parser: Parser<T>,
    ) -> Result<()> {
        if self.parsers.contains_key(&(version, tag)) {
            return Err(CodecError::DuplicateRegistration {
                family: self.family.name(),
                version,
                tag,
            });
        }
        debug!(family = self.family.name(), version, tag, "registered parser");
        self.parsers.insert((version, tag), parser);
        Ok(())
    }

    pub fn resolve(&self, version: FormatVersion, tag: TypeTag) -> Result<Parser<T>> {
        self.parsers
            .get(&(version, tag))
            .copied()
            .ok_or(CodecError::InvalidTag {
                family: self.family.name(),
                version,
                tag,
            })
    }

    pub fn contains(&self, version: FormatVersion, tag: TypeTag) -> bool {
        self.parsers.contains_key(&(version, tag))
    }

    /// Format versions with at least one registered parser
    pub fn versions(&self) -> BTreeSet<FormatVersion> {
        self.parsers.keys().map(|(v, _)| *v).collect()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.parsers.keys().collect();
        keys.sort();
        f.debug_struct("Registry")
            .field("family", &self.family)
            .field("entries", &keys)
            .finish()
    }
}

/// Format version each family decodes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveVersions {
    pub output: FormatVersion,
    pub input: FormatVersion,
    pub transaction: FormatVersion,
}

impl ActiveVersions {
    pub fn uniform(version: FormatVersion) -> Self {
        Self {
            output: version,
            input: version,
            transaction: version,
        }
    }

    pub fn get(&self, family: Family) -> FormatVersion {
        match family {
            Family::Output => self.output,
            Family::Input => self.input,
            Family::Transaction => self.transaction,
        }
    }
}

/// Mutable registration phase of a [`Codec`]
pub struct CodecBuilder {
    outputs: Registry<Output>,
    inputs: Registry<Input>,
    transactions: Registry<Transaction>,
    active: ActiveVersions,
    config: CodecConfig,
}

impl CodecBuilder {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            outputs: Registry::new(Family::Output),
            inputs: Registry::new(Family::Input),
            transactions: Registry::new(Family::Transaction),
            active: ActiveVersions::default(),
            config,
        }
    }

    pub fn output(
        mut self,
        version: FormatVersion,
        tag: TypeTag,
        parser: Parser<Output>,
    ) -> Result<Self> {
        self.outputs.register(version, tag, parser)?;
        Ok(self)
    }

    pub fn input(
        mut self,
        version: FormatVersion,
        tag: TypeTag,
        parser: Parser<Input>,
    ) -> Result<Self> {
        self.inputs.register(version, tag, parser)?;
        Ok(self)
    }

    pub fn transaction(
        mut self,
        version: FormatVersion,
        tag: TypeTag,
        parser: Parser<Transaction>,
    ) -> Result<Self> {
        self.transactions.register(version, tag, parser)?;
        Ok(self)
    }

    /// Set the version a family decodes with when the bytes do not say
    pub fn active_version(mut self, family: Family, version: FormatVersion) -> Self {
        match family {
            Family::Output => self.active.output = version,
            Family::Input => self.active.input = version,
            Family::Transaction => self.active.transaction = version,
        }
        self
    }

    pub fn build(self) -> Codec {
        debug!(
            outputs = self.outputs.parsers.len(),
            inputs = self.inputs.parsers.len(),
            transactions = self.transactions.parsers.len(),
            "codec built"
        );
        Codec {
            outputs: Arc::new(self.outputs),
            inputs: Arc::new(self.inputs),
            transactions: Arc::new(self.transactions),
            active: self.active,
            config: Arc::new(self.config),
            fields: FieldSerializer::default(),
        }
    }
}

/// Tag lookup that must succeed for the built-in shapes
fn tag(shape: Shape, version: FormatVersion) -> Result<TypeTag> {
    constants::type_tag(shape, version).ok_or(CodecError::UnknownFormatVersion(version))
}

/// Immutable registry service handed to every decoder.
///
/// Cloning is cheap; clones share the registries.
#[derive(Debug, Clone)]
pub struct Codec {
    outputs: Arc<Registry<Output>>,
    inputs: Arc<Registry<Input>>,
    transactions: Arc<Registry<Transaction>>,
    active: ActiveVersions,
    config: Arc<CodecConfig>,
    fields: FieldSerializer,
}

impl Codec {
    pub fn builder(config: CodecConfig) -> CodecBuilder {
        CodecBuilder::new(config)
    }

    /// Codec for the asset chain: SECP and NFT outputs, transfer inputs and
    /// base transactions in format versions 0 and 1.
    pub fn asset_chain(config: CodecConfig) -> Result<Self> {
        let mut builder = Self::builder(config);
        for version in [LATEST_CODEC, CODEC_ONE] {
            builder = builder
                .output(version, tag(Shape::TransferOutput, version)?, |c, d, o| {
                    TransferOutput::decode_body(c, d, o).map(|(v, n)| (Output::Transfer(v), n))
                })?
                .output(version, tag(Shape::MintOutput, version)?, |c, d, o| {
                    MintOutput::decode_body(c, d, o).map(|(v, n)| (Output::Mint(v), n))
                })?
                .output(version, tag(Shape::NftMintOutput, version)?, |c, d, o| {
                    NftMintOutput::decode_body(c, d, o).map(|(v, n)| (Output::NftMint(v), n))
                })?
                .output(version, tag(Shape::NftTransferOutput, version)?, |c, d, o| {
                    NftTransferOutput::decode_body(c, d, o)
                        .map(|(v, n)| (Output::NftTransfer(v), n))
                })?
                .input(version, tag(Shape::TransferInput, version)?, |c, d, o| {
                    TransferInput::decode_body(c, d, o).map(|(v, n)| (Input::Transfer(v), n))
                })?
                .transaction(version, BASE_TX, |c, d, o| {
                    BaseTx::decode(c, d, o).map(|(v, n)| (Transaction::Base(v), n))
                })?;
        }
        Ok(builder.build())
    }

    /// Codec for the platform chain: transfer and owner outputs, transfer
    /// inputs, base and subnet-creation transactions in format version 0.
    pub fn platform_chain(config: CodecConfig) -> Result<Self> {
        let version = LATEST_CODEC;
        Ok(Self::builder(config)
            .output(version, tag(Shape::TransferOutput, version)?, |c, d, o| {
                TransferOutput::decode_body(c, d, o).map(|(v, n)| (Output::Transfer(v), n))
            })?
            .output(version, tag(Shape::OwnerOutput, version)?, |c, d, o| {
                OwnerOutput::decode_body(c, d, o).map(|(v, n)| (Output::Owner(v), n))
            })?
            .input(version, tag(Shape::TransferInput, version)?, |c, d, o| {
                TransferInput::decode_body(c, d, o).map(|(v, n)| (Input::Transfer(v), n))
            })?
            .transaction(version, BASE_TX, |c, d, o| {
                BaseTx::decode(c, d, o).map(|(v, n)| (Transaction::Base(v), n))
            })?
            .transaction(version, CREATE_SUBNET_TX, |c, d, o| {
                CreateSubnetTx::decode(c, d, o).map(|(v, n)| (Transaction::CreateSubnet(v), n))
            })?
            .build())
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldSerializer {
        &self.fields
    }

    pub fn active_version(&self, family: Family) -> FormatVersion {
        self.active.get(family)
    }

    /// Every format version known to any family
    pub fn versions(&self) -> BTreeSet<FormatVersion> {
        let mut all = self.outputs.versions();
        all.extend(self.inputs.versions());
        all.extend(self.transactions.versions());
        all
    }

    /// View of this codec with every family pinned to `version`
    pub fn at_version(&self, version: FormatVersion) -> Result<Codec> {
        if !self.versions().contains(&version) {
            return Err(CodecError::UnknownFormatVersion(version));
        }
        Ok(Codec {
            active: ActiveVersions::uniform(version),
            ..self.clone()
        })
    }

    pub fn decode_output(&self, data: &[u8], offset: usize) -> Result<(Output, usize)> {
        let (tag, next) = read_u32(data, offset)?;
        let parser = self.outputs.resolve(self.active.output, tag)?;
        parser(self, data, next)
    }

    pub fn decode_input(&self, data: &[u8], offset: usize) -> Result<(Input, usize)> {
        let (tag, next) = read_u32(data, offset)?;
        let parser = self.inputs.resolve(self.active.input, tag)?;
        parser(self, data, next)
    }

    pub fn decode_transaction(&self, data: &[u8], offset: usize) -> Result<(Transaction, usize)> {
        let (tag, next) = read_u32(data, offset)?;
        let parser = self.transactions.resolve(self.active.transaction, tag)?;
        parser(self, data, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &Codec, _: &[u8], _: usize) -> Result<(Output, usize)> {
        Err(CodecError::MissingRequiredField("test"))
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry: Registry<Output> = Registry::new(Family::Output);
        registry.register(0, 7, never).unwrap();
        assert_eq!(
            registry.register(0, 7, never).unwrap_err(),
            CodecError::DuplicateRegistration {
                family: "output",
                version: 0,
                tag: 7
            }
        );
        // Same tag under another version is a separate entry.
        registry.register(1, 7, never).unwrap();
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let registry: Registry<Output> = Registry::new(Family::Output);
        assert!(matches!(
            registry.resolve(0, 99),
            Err(CodecError::InvalidTag { family: "output", version: 0, tag: 99 })
        ));
    }

    #[test]
    fn test_chain_codecs_register_expected_versions() {
        let asset = Codec::asset_chain(CodecConfig::default()).unwrap();
        assert_eq!(asset.versions().into_iter().collect::<Vec<_>>(), vec![0, 1]);
        let platform = Codec::platform_chain(CodecConfig::default()).unwrap();
        assert_eq!(platform.versions().into_iter().collect::<Vec<_>>(), vec![0]);
        assert!(platform.at_version(1).is_err());
    }

    #[test]
    fn test_at_version_pins_all_families() {
        let codec = Codec::asset_chain(CodecConfig::default()).unwrap();
        let one = codec.at_version(1).unwrap();
        assert_eq!(one.active_version(Family::Output), 1);
        assert_eq!(one.active_version(Family::Input), 1);
        assert_eq!(one.active_version(Family::Transaction), 1);
        assert_eq!(codec.active_version(Family::Output), 0);
    }

    #[test]
    fn test_decode_unknown_output_tag() {
        let codec = Codec::asset_chain(CodecConfig::default()).unwrap();
        let data = [0, 0, 0, 42];
        assert!(matches!(
            codec.decode_output(&data, 0),
            Err(CodecError::InvalidTag { tag: 42, .. })
        ));
    }

    #[test]
    fn test_decode_truncated_tag() {
        let codec = Codec::asset_chain(CodecConfig::default()).unwrap();
        assert!(matches!(
            codec.decode_output(&[0, 0], 0),
            Err(CodecError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_builder_active_version() {
        let codec = Codec::builder(CodecConfig::default())
            .active_version(Family::Input, 3)
            .build();
        assert_eq!(codec.active_version(Family::Input), 3);
        assert_eq!(codec.active_version(Family::Output), 0);
    }
}
