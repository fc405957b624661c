#![no_main]

use arbitrary::Arbitrary;
use blte_decoder::BlteDecoder;
use blte_encoder::{BlockEncoding, BlteEncoder};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzBlock {
    deflate: bool,
    data: Vec<u8>,
}

// Fuzz target: encoder output decodes back, verified, to the input blocks.
fuzz_target!(|blocks: Vec<FuzzBlock>| {
    if blocks.is_empty() {
        return;
    }

    let mut encoder = BlteEncoder::new();
    for block in &blocks {
        let encoding = if block.deflate {
            BlockEncoding::Deflate
        } else {
            BlockEncoding::Stored
        };
        encoder.add_block(encoding, &block.data);
    }
    let container = encoder.encode().unwrap();

    let mut decoder =
        BlteDecoder::new(container.bytes.as_slice(), &container.header_hash, true).unwrap();
    let decoded: Vec<Vec<u8>> = decoder.blocks().unwrap().map(Result::unwrap).collect();

    assert_eq!(decoded.len(), blocks.len());
    for (out, block) in decoded.iter().zip(&blocks) {
        assert_eq!(out, &block.data);
    }
});
