//! The decoder reads lazily from arbitrary `Read` sources.

use std::io::Cursor;

use blte_decoder::{BlteDecoder, DecoderConfig};
use blte_tests::{CountingReader, Fixture, RawBlock, TrickleReader};

fn three_blocks() -> Fixture {
    Fixture::build(&[
        RawBlock::stored(b"one"),
        RawBlock::deflated(&b"two ".repeat(100)),
        RawBlock::stored(b"three"),
    ])
}

#[test]
fn construction_reads_only_the_header() {
    let fixture = three_blocks();
    let mut reader = CountingReader::new(fixture.bytes.as_slice());
    let decoder = BlteDecoder::new(&mut reader, &fixture.header_hash, true).unwrap();
    assert_eq!(decoder.block_table().len(), 3);
    drop(decoder);
    assert_eq!(reader.consumed, fixture.header_size);
}

#[test]
fn each_step_reads_exactly_one_block() {
    let fixture = three_blocks();
    let mut reader = CountingReader::new(fixture.bytes.as_slice());
    let mut decoder =
        BlteDecoder::with_config(&mut reader, DecoderConfig::default()).unwrap();

    let mut blocks = decoder.blocks().unwrap();
    assert_eq!(blocks.size_hint(), (0, Some(3)));
    blocks.next().unwrap().unwrap();
    blocks.next().unwrap().unwrap();
    assert_eq!(blocks.size_hint(), (0, Some(1)));
    drop(blocks);
    drop(decoder);

    assert_eq!(reader.consumed, fixture.block_offsets[2]);
}

#[test]
fn short_reads_are_reassembled() {
    let fixture = three_blocks();
    for chunk in [1, 2, 7, 64] {
        let reader = TrickleReader::new(fixture.bytes.as_slice(), chunk);
        let mut decoder = BlteDecoder::new(reader, &fixture.header_hash, true).unwrap();
        let blocks: Vec<Vec<u8>> = decoder.blocks().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks[0], b"one");
        assert_eq!(blocks[1], b"two ".repeat(100));
        assert_eq!(blocks[2], b"three");
    }
}

#[test]
fn caller_keeps_the_stream() {
    let fixture = three_blocks();
    let mut cursor = Cursor::new(fixture.bytes.clone());
    {
        let mut decoder = BlteDecoder::new(&mut cursor, &fixture.header_hash, true).unwrap();
        decoder.decode_all().unwrap();
    }
    assert_eq!(cursor.position(), fixture.bytes.len() as u64);
}

#[test]
fn raw_view_then_decode_each_block() {
    let fixture = three_blocks();
    let mut decoder =
        BlteDecoder::new(fixture.bytes.as_slice(), &fixture.header_hash, true).unwrap();

    let mut decoded = Vec::new();
    for raw in decoder.encoded_blocks().unwrap() {
        let raw = raw.unwrap();
        assert_eq!(raw.checksum_hex(), raw.descriptor.checksum_hex());
        decoded.extend(raw.decode().unwrap());
    }
    assert_eq!(decoded, [&b"one"[..], &b"two ".repeat(100)[..], &b"three"[..]].concat());
}
