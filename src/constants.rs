//! Wire constants: field widths, format versions and type tags

use crate::types::{FormatVersion, TypeTag};

/// Width of an asset, transaction or blockchain id
pub const ID_LEN: usize = 32;

/// Width of an address (RIPEMD-160 of a public key)
pub const ADDRESS_LEN: usize = 20;

/// Width of a serialized amount
pub const AMOUNT_LEN: usize = 8;

/// Bytes of SHA-256 appended to a cb58 payload
pub const CHECKSUM_LEN: usize = 4;

/// Width of the codec id that prefixes unsigned transactions and UTXOs
pub const CODEC_ID_LEN: usize = 2;

/// Width of a type tag, count or length field
pub const COUNT_LEN: usize = 4;

/// Smallest encodings of list elements. A decoded count is rejected when
/// the remaining buffer cannot hold that many elements of this size.
pub const MIN_OWNERS_LEN: usize = 8 + COUNT_LEN + COUNT_LEN;
pub const MIN_OUTPUT_LEN: usize = COUNT_LEN + MIN_OWNERS_LEN;
pub const MIN_TRANSFERABLE_OUTPUT_LEN: usize = ID_LEN + MIN_OUTPUT_LEN;
pub const MIN_TRANSFERABLE_INPUT_LEN: usize =
    ID_LEN + COUNT_LEN + ID_LEN + COUNT_LEN + AMOUNT_LEN + COUNT_LEN;
pub const MIN_STATE_GROUP_LEN: usize = COUNT_LEN + COUNT_LEN;
pub const MIN_GENESIS_ASSET_LEN: usize = 4 + 3 * COUNT_LEN + 1 + COUNT_LEN + COUNT_LEN;

/// Network id of a local test network
pub const DEFAULT_NETWORK_ID: u32 = 12345;

/// Format version written when an object does not carry one
pub const LATEST_CODEC: FormatVersion = 0;

/// Format version with the relocated type-tag space
pub const CODEC_ONE: FormatVersion = 1;

/// Transaction type tags (identical in every format version)
pub const BASE_TX: TypeTag = 0;
pub const CREATE_SUBNET_TX: TypeTag = 16;

/// Shapes in the output/input family.
///
/// A shape's tag depends on the format version it is written under; see
/// [`type_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    TransferInput,
    MintOutput,
    TransferOutput,
    NftMintOutput,
    NftTransferOutput,
    OwnerOutput,
}

/// Look up the tag a shape is written with under `version`.
///
/// Returns `None` when the shape does not exist in that version.
pub fn type_tag(shape: Shape, version: FormatVersion) -> Option<TypeTag> {
    match (version, shape) {
        (LATEST_CODEC, Shape::TransferInput) => Some(5),
        (LATEST_CODEC, Shape::MintOutput) => Some(6),
        (LATEST_CODEC, Shape::TransferOutput) => Some(7),
        (LATEST_CODEC, Shape::NftMintOutput) => Some(10),
        (LATEST_CODEC, Shape::NftTransferOutput) => Some(11),
        // Platform chain only; the asset chain uses 11 for NFT transfers.
        (LATEST_CODEC, Shape::OwnerOutput) => Some(11),
        (CODEC_ONE, Shape::MintOutput) => Some(65537),
        (CODEC_ONE, Shape::TransferOutput) => Some(65538),
        (CODEC_ONE, Shape::NftTransferOutput) => Some(65539),
        (CODEC_ONE, Shape::NftMintOutput) => Some(65540),
        (CODEC_ONE, Shape::TransferInput) => Some(65541),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_one_tags_are_distinct_from_codec_zero() {
        for shape in [
            Shape::TransferInput,
            Shape::MintOutput,
            Shape::TransferOutput,
            Shape::NftMintOutput,
            Shape::NftTransferOutput,
        ] {
            let zero = type_tag(shape, LATEST_CODEC).unwrap();
            let one = type_tag(shape, CODEC_ONE).unwrap();
            assert_ne!(zero, one, "{shape:?}");
        }
    }

    #[test]
    fn test_owner_output_only_in_codec_zero() {
        assert_eq!(type_tag(Shape::OwnerOutput, LATEST_CODEC), Some(11));
        assert_eq!(type_tag(Shape::OwnerOutput, CODEC_ONE), None);
        assert_eq!(type_tag(Shape::TransferOutput, 7), None);
    }
}
