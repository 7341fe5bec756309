//! # Avalanche Codec
//!
//! Canonical binary encoding of Avalanche ledger primitives: outputs,
//! inputs, transactions, UTXOs and genesis assets.
//!
//! ## Architecture
//!
//! - `serialization` - wire primitives, cb58 strings and the field serializer
//! - `codec` - registry of (format version, type tag) to parser
//! - `output`, `input`, `initial_states`, `transaction`, `genesis` - the
//!   object families, each implementing [`Serializable`]
//!
//! ## Design Principles
//!
//! 1. **Canonical bytes**: equal values always encode identically; unordered
//!    collections are sorted by their own encoding before writing
//! 2. **Explicit versions**: a format version is supplied by the caller or
//!    read from the bytes just before the object it governs, never guessed
//! 3. **No ambient state**: the [`Codec`] registry and its [`CodecConfig`]
//!    are passed to every decoder
//!
//! ## Usage
//!
//! ```rust
//! use avalanche_codec::{Amount, Address, BaseTx, Codec, CodecConfig, Id, Serializable};
//! use avalanche_codec::{TransferOutput, TransferableOutput, UnsignedTx};
//!
//! let codec = Codec::asset_chain(CodecConfig::default()).unwrap();
//! let mut tx = BaseTx::with_config(codec.config(), Id::default());
//! tx.add_output(TransferableOutput::new(
//!     Id::new([1; 32]),
//!     TransferOutput::new(Amount(1000), [Address::new([2; 20])], 0, 1),
//! ));
//! let unsigned = UnsignedTx::latest(tx);
//! let bytes = unsigned.to_bytes().unwrap();
//! assert_eq!(UnsignedTx::from_slice(&codec, &bytes).unwrap(), unsigned);
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod genesis;
pub mod initial_states;
pub mod input;
pub mod output;
pub mod serialization;
pub mod transaction;
pub mod types;

pub use codec::{Codec, CodecBuilder, Family};
pub use config::{CanonicalOrder, CodecConfig};
pub use error::{CodecError, Result};
pub use genesis::{GenesisAsset, GenesisData};
pub use initial_states::InitialStates;
pub use input::{Input, TransferInput, TransferableInput, Utxo, UtxoId};
pub use output::{
    MintOutput, NftMintOutput, NftTransferOutput, Output, OutputOwners, OwnerOutput,
    TransferOutput, TransferableOutput,
};
pub use serialization::{Encoding, FieldSerializer, FieldValue, Serializable, StringCodec};
pub use transaction::{BaseTx, CreateSubnetTx, Transaction, UnsignedTx};
pub use types::{Address, Amount, FormatVersion, Id, NetworkId, TypeTag};
