#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: tag dispatch and raw inflate on one block's bytes.
fuzz_target!(|data: &[u8]| {
    let _ = blte_decoder::codec::decode_block_with_limit(data, 1 << 20);
});
