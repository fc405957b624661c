#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: BlteHeader::read_from on the 9-byte fixed header.
//
// Catches bugs in:
// - Magic comparison on short input
// - Negative / zero / oversized header_size
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = blte_wire::BlteHeader::read_from(data) {
        assert!(header.table_len() >= 3);
    }
});
