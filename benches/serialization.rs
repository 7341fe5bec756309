use avalanche_codec::serialization::cb58::{decode_checked, encode_checked};
use avalanche_codec::{
    Address, Amount, BaseTx, Codec, CodecConfig, Id, Serializable, TransferInput, TransferOutput,
    TransferableInput, TransferableOutput, UnsignedTx, UtxoId,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn create_test_transaction(size: u8) -> UnsignedTx {
    let mut tx = BaseTx::new(1, Id::new([0xab; 32]));
    for i in 0..size {
        tx.add_output(TransferableOutput::new(
            Id::new([i; 32]),
            TransferOutput::new(
                Amount(1_000_000 + i as u128),
                (0..3u8).map(|a| Address::new([a ^ i; 20])),
                0,
                2,
            ),
        ));
        tx.add_input(TransferableInput::new(
            UtxoId::new(Id::new([i.wrapping_mul(7); 32]), i as u32),
            Id::new([i; 32]),
            TransferInput::new(Amount(1_000_000), [0, 1]),
        ));
    }
    tx.set_memo(b"benchmark".to_vec());
    UnsignedTx::latest(tx)
}

fn benchmark_encode(c: &mut Criterion) {
    let small = create_test_transaction(1);
    let large = create_test_transaction(32);

    c.bench_function("unsigned_tx_to_bytes_small", |b| {
        b.iter(|| black_box(black_box(&small).to_bytes()))
    });
    c.bench_function("unsigned_tx_to_bytes_large", |b| {
        b.iter(|| black_box(black_box(&large).to_bytes()))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let codec = Codec::asset_chain(CodecConfig::default()).unwrap();
    let bytes = create_test_transaction(32).to_bytes().unwrap();

    c.bench_function("unsigned_tx_from_bytes_large", |b| {
        b.iter(|| black_box(UnsignedTx::from_slice(&codec, black_box(&bytes))))
    });
}

fn benchmark_cb58(c: &mut Criterion) {
    let payload = [0x5a; 32];
    let text = encode_checked(&payload);

    c.bench_function("cb58_encode_id", |b| {
        b.iter(|| black_box(encode_checked(black_box(&payload))))
    });
    c.bench_function("cb58_decode_id", |b| {
        b.iter(|| black_box(decode_checked(black_box(&text))))
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode, benchmark_cb58);
criterion_main!(benches);
