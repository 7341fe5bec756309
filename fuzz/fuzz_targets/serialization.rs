#![no_main]
use avalanche_codec::serialization::cb58::{decode_checked, encode_checked};
use avalanche_codec::{Codec, CodecConfig, GenesisData, Serializable, UnsignedTx, Utxo};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = CodecConfig::default();
    let codecs = [
        Codec::asset_chain(config.clone()).expect("asset chain codec"),
        Codec::platform_chain(config).expect("platform chain codec"),
    ];

    for codec in &codecs {
        // The default policy rejects non-canonical order, so anything that
        // decodes must re-encode to exactly the input.
        if let Ok(tx) = UnsignedTx::from_slice(codec, data) {
            let encoded = tx.to_bytes().expect("decoded tx must encode");
            assert_eq!(encoded, data, "Unsigned tx round trip must be byte-identical");
        }
        if let Ok(utxo) = Utxo::from_slice(codec, data) {
            let encoded = utxo.to_bytes().expect("decoded utxo must encode");
            assert_eq!(encoded, data, "UTXO round trip must be byte-identical");
        }
        if let Ok(genesis) = GenesisData::from_slice(codec, data) {
            let encoded = genesis.to_bytes().expect("decoded genesis must encode");
            assert_eq!(encoded, data, "Genesis round trip must be byte-identical");
        }
    }

    // Checksum law
    let text = encode_checked(data);
    assert_eq!(decode_checked(&text).expect("own cb58 must decode"), data);
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = decode_checked(text);
    }
});
