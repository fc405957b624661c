#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: BlockTable::read_from on an arbitrary block-info region.
//
// Catches bugs in:
// - 24-bit count decoding
// - Count larger than the region
// - Descriptor slicing
fuzz_target!(|data: &[u8]| {
    if let Ok(table) = blte_wire::BlockTable::read_from(data) {
        assert!(table.encoded_len() <= data.len());
    }
});
