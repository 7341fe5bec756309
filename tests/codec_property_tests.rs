//! Property-based tests for the codec
//!
//! Uses PropTest to check the checksum law and the round-trip law over
//! generated outputs, inputs and transactions.

use avalanche_codec::serialization::cb58::{decode_checked, encode_checked};
use avalanche_codec::{
    Address, Amount, BaseTx, Codec, CodecConfig, Id, MintOutput, NftTransferOutput, Output,
    Serializable, TransferInput, TransferOutput, TransferableInput, TransferableOutput, UtxoId,
};
use proptest::prelude::*;

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn codec() -> Codec {
    Codec::asset_chain(CodecConfig::default()).unwrap()
}

fn addresses() -> impl Strategy<Value = Vec<Address>> {
    prop::collection::vec(any::<[u8; 20]>().prop_map(Address::new), 0..6)
}

fn output() -> impl Strategy<Value = Output> {
    prop_oneof![
        (any::<u64>(), addresses(), any::<u64>(), any::<u32>()).prop_map(|(a, addrs, l, t)| {
            Output::from(TransferOutput::new(Amount::from(a), addrs, l, t))
        }),
        (addresses(), any::<u64>(), any::<u32>())
            .prop_map(|(addrs, l, t)| Output::from(MintOutput::new(addrs, l, t))),
        (
            any::<u32>(),
            prop::collection::vec(any::<u8>(), 0..64),
            addresses(),
            any::<u32>()
        )
            .prop_map(|(g, payload, addrs, t)| {
                Output::from(NftTransferOutput::new(g, payload, addrs, 0, t))
            }),
    ]
}

fn transferable_output() -> impl Strategy<Value = TransferableOutput> {
    (any::<[u8; 32]>(), output()).prop_map(|(id, o)| TransferableOutput::new(Id::new(id), o))
}

fn transferable_input() -> impl Strategy<Value = TransferableInput> {
    (
        any::<[u8; 32]>(),
        any::<u32>(),
        any::<[u8; 32]>(),
        any::<u64>(),
        prop::collection::vec(any::<u32>(), 0..4),
    )
        .prop_map(|(tx, idx, asset, amount, sigs)| {
            TransferableInput::new(
                UtxoId::new(Id::new(tx), idx),
                Id::new(asset),
                TransferInput::new(Amount::from(amount), sigs),
            )
        })
}

proptest! {
    #[test]
    fn cb58_round_trip(data in prop::collection::vec(any::<u8>(), 0..128)) {
        let text = encode_checked(&data);
        prop_assert_eq!(decode_checked(&text).unwrap(), data);
    }

    #[test]
    fn cb58_single_char_mutation_fails(
        data in prop::collection::vec(any::<u8>(), 1..64),
        position in any::<prop::sample::Index>(),
        shift in 1usize..58,
    ) {
        let text = encode_checked(&data);
        let mut chars = text.into_bytes();
        let i = position.index(chars.len());
        let current = BASE58.iter().position(|c| *c == chars[i]).unwrap();
        chars[i] = BASE58[(current + shift) % 58];
        let mutated = String::from_utf8(chars).unwrap();
        prop_assert!(decode_checked(&mutated).is_err());
    }

    #[test]
    fn output_round_trip(output in output()) {
        let bytes = output.to_bytes().unwrap();
        let (decoded, end) = Output::from_bytes(&codec(), &bytes, 0).unwrap();
        prop_assert_eq!(end, bytes.len());
        prop_assert_eq!(decoded, output);
    }

    #[test]
    fn transferable_input_round_trip(input in transferable_input()) {
        let bytes = input.to_bytes().unwrap();
        prop_assert_eq!(TransferableInput::from_slice(&codec(), &bytes).unwrap(), input);
    }

    #[test]
    fn base_tx_round_trip_and_order_independence(
        outputs in prop::collection::vec(transferable_output(), 0..5),
        inputs in prop::collection::vec(transferable_input(), 0..5),
        memo in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut tx = BaseTx::new(1, Id::default());
        tx.outputs = outputs.clone();
        tx.inputs = inputs.clone();
        tx.memo = memo.clone();

        let mut reversed = BaseTx::new(1, Id::default());
        reversed.outputs = outputs.into_iter().rev().collect();
        reversed.inputs = inputs.into_iter().rev().collect();
        reversed.memo = memo;

        let bytes = tx.to_bytes().unwrap();
        prop_assert_eq!(&bytes, &reversed.to_bytes().unwrap());
        prop_assert_eq!(BaseTx::from_slice(&codec(), &bytes).unwrap(), tx);
    }
}
