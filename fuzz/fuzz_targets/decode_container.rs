#![no_main]

use blte_decoder::{BlteDecoder, DecoderConfig};
use libfuzzer_sys::fuzz_target;

// Fuzz target: full streaming decode of arbitrary bytes, with block
// checksum verification on.
//
// Catches bugs in:
// - Header / table parsing against the stream
// - Hostile encoded_size values (negative, huge)
// - Iterator fusing after errors
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig {
        verify: true,
        max_decoded_block_size: 1 << 20,
        ..DecoderConfig::default()
    };
    let Ok(mut decoder) = BlteDecoder::with_config(data, config) else {
        return;
    };

    let mut failed = false;
    if let Ok(blocks) = decoder.blocks() {
        for block in blocks {
            assert!(!failed, "iterator yielded after an error");
            failed = block.is_err();
        }
    }
});
