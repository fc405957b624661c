use blte_wire::block_table::DESCRIPTOR_SIZE;
use blte_wire::header::{FIXED_HEADER_SIZE, MIN_HEADER_SIZE};
use blte_wire::{BlockDescriptor, BlockEncoding, BlockTable, BlteHeader};
use tracing::{debug, trace};

use crate::compression::{self, DEFAULT_COMPRESSION_LEVEL};
use crate::error::EncodeError;

/// Default maximum size of one block's input (16 MiB).
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Deflate level for `Z` blocks, 0–9.
    pub compression_level: u32,

    /// Largest decoded block accepted by [`BlteEncoder::encode`].
    pub max_block_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_block_size: MAX_BLOCK_SIZE,
        }
    }
}

/// BLTE encoder: builds a container from a list of blocks.
///
/// Builder-style: `add_*` methods append a block and return `&mut Self`,
/// and [`encode`](Self::encode) serializes everything in one pass.
///
/// ```rust
/// use blte_encoder::BlteEncoder;
///
/// let container = BlteEncoder::new()
///     .add_stored(b"abcd")
///     .add_deflate(b"xyz")
///     .encode()
///     .unwrap();
///
/// assert_eq!(&container.bytes[..4], b"BLTE");
/// assert_eq!(container.table.len(), 2);
/// assert_eq!(container.header_hash.len(), 32);
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────┐
/// │ [8 bytes]    │ "BLTE" + header_size (i32 BE)                │
/// │ [1 byte]     │ format version 0x0F                          │
/// │ [3 bytes]    │ block count (u24 BE)                         │
/// │ [24 × n]     │ descriptors: encoded, decoded, MD5(block)    │
/// │ [N bytes]    │ block 0: tag + payload                       │
/// │ ...          │                                              │
/// └──────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default)]
pub struct BlteEncoder {
    blocks: Vec<PendingBlock>,
    config: EncoderConfig,
}

#[derive(Clone, Debug)]
struct PendingBlock {
    encoding: BlockEncoding,
    data: Vec<u8>,
}

impl BlteEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            blocks: Vec::new(),
            config,
        }
    }

    /// Append a block stored verbatim (`N`).
    pub fn add_stored(&mut self, data: &[u8]) -> &mut Self {
        self.add_block(BlockEncoding::Stored, data)
    }

    /// Append a raw-deflate block (`Z`).
    pub fn add_deflate(&mut self, data: &[u8]) -> &mut Self {
        self.add_block(BlockEncoding::Deflate, data)
    }

    pub fn add_block(&mut self, encoding: BlockEncoding, data: &[u8]) -> &mut Self {
        self.blocks.push(PendingBlock {
            encoding,
            data: data.to_vec(),
        });
        self
    }

    /// Split `data` into `chunk_size` pieces, one block each.
    ///
    /// Empty `data` still produces one (empty) block. A `chunk_size` of
    /// zero puts everything in a single block.
    pub fn add_chunked(
        &mut self,
        encoding: BlockEncoding,
        data: &[u8],
        chunk_size: usize,
    ) -> &mut Self {
        if data.is_empty() || chunk_size == 0 {
            return self.add_block(encoding, data);
        }
        for chunk in data.chunks(chunk_size) {
            self.add_block(encoding, chunk);
        }
        self
    }

    /// Number of blocks added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize all blocks into a container.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::EmptyPayload`] if no blocks were added.
    /// - [`EncodeError::BlockTooLarge`] if a block exceeds
    ///   [`EncoderConfig::max_block_size`] or its encoded form does not fit
    ///   the signed 32-bit size fields.
    /// - [`EncodeError::Wire`] if the block count exceeds the 24-bit limit.
    pub fn encode(&self) -> Result<EncodedContainer, EncodeError> {
        if self.blocks.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut descriptors = Vec::with_capacity(self.blocks.len());
        let mut bodies = Vec::with_capacity(self.blocks.len());

        for (index, pending) in self.blocks.iter().enumerate() {
            let too_large = |size| EncodeError::BlockTooLarge {
                index,
                size,
                limit: self.config.max_block_size,
            };
            if pending.data.len() > self.config.max_block_size {
                return Err(too_large(pending.data.len()));
            }

            let body = self.encode_block(pending)?;
            let encoded_size = i32::try_from(body.len()).map_err(|_| too_large(body.len()))?;
            let decoded_size =
                i32::try_from(pending.data.len()).map_err(|_| too_large(pending.data.len()))?;

            trace!(
                block = index,
                encoding = pending.encoding.name(),
                decoded = decoded_size,
                encoded = encoded_size,
                "encoded block"
            );

            descriptors.push(BlockDescriptor {
                encoded_size,
                decoded_size,
                checksum: md5::compute(&body).0,
            });
            bodies.push(body);
        }

        let table = BlockTable::new(descriptors);
        let header_size = table.header_size();
        let header = BlteHeader::new(
            u32::try_from(header_size).map_err(|_| blte_wire::WireError::TooManyBlocks {
                count: table.len(),
                limit: blte_wire::block_table::MAX_BLOCK_COUNT,
            })?,
        );

        let payload_len: usize = bodies.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(header_size + payload_len);
        bytes.resize(FIXED_HEADER_SIZE, 0);
        header.write_to(&mut bytes)?;
        table.write_to(&mut bytes)?;

        let header_hash = hex::encode(md5::compute(&bytes).0);

        for body in &bodies {
            bytes.extend_from_slice(body);
        }

        debug!(
            blocks = table.len(),
            header_size,
            total = bytes.len(),
            "encoded BLTE container"
        );

        Ok(EncodedContainer {
            bytes,
            header_hash,
            table,
        })
    }

    fn encode_block(&self, pending: &PendingBlock) -> Result<Vec<u8>, EncodeError> {
        let payload = match pending.encoding {
            BlockEncoding::Stored => pending.data.clone(),
            BlockEncoding::Deflate => {
                compression::deflate_raw(&pending.data, self.config.compression_level)?
            }
        };

        let mut body = Vec::with_capacity(1 + payload.len());
        body.push(pending.encoding.tag());
        body.extend_from_slice(&payload);
        Ok(body)
    }
}

/// Output of [`BlteEncoder::encode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedContainer {
    /// The complete container.
    pub bytes: Vec<u8>,

    /// Lowercase hex MD5 of the header (the first `header_size` bytes).
    /// This is what a decoder is handed as its expected hash.
    pub header_hash: String,

    /// The block table written into the header.
    pub table: BlockTable,
}

impl EncodedContainer {
    #[must_use]
    pub fn header_size(&self) -> usize {
        self.table.header_size()
    }

    /// Container offset of descriptor `index` (its `encoded_size` field).
    #[must_use]
    pub fn descriptor_offset(&self, index: usize) -> usize {
        MIN_HEADER_SIZE + index * DESCRIPTOR_SIZE
    }

    /// Container offset of block `index` (its tag byte).
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the table.
    #[must_use]
    pub fn block_offset(&self, index: usize) -> usize {
        let preceding: usize = self.table.descriptors()[..index]
            .iter()
            .map(|d| d.encoded_size.unsigned_abs() as usize)
            .sum();
        self.header_size() + preceding
    }
}

#[cfg(test)]
mod tests {
    use blte_decoder::{BlteDecoder, DecoderConfig};

    use super::*;

    #[test]
    fn empty_encoder_is_rejected() {
        assert!(matches!(
            BlteEncoder::new().encode(),
            Err(EncodeError::EmptyPayload)
        ));
    }

    #[test]
    fn header_layout() {
        let container = BlteEncoder::new().add_stored(b"abcd").encode().unwrap();
        let bytes = &container.bytes;

        assert_eq!(&bytes[0..4], b"BLTE");
        assert_eq!(&bytes[4..8], &36i32.to_be_bytes());
        assert_eq!(bytes[8], 0x0F);
        assert_eq!(&bytes[9..12], &[0, 0, 1]);
        assert_eq!(&bytes[12..16], &5i32.to_be_bytes());
        assert_eq!(&bytes[16..20], &4i32.to_be_bytes());
        assert_eq!(&bytes[36..], b"Nabcd");
        assert_eq!(container.header_size(), 36);
    }

    #[test]
    fn header_hash_covers_exactly_the_header() {
        let container = BlteEncoder::new()
            .add_stored(b"abcd")
            .add_deflate(b"xyz")
            .encode()
            .unwrap();
        let header = &container.bytes[..container.header_size()];
        assert_eq!(container.header_hash, hex::encode(md5::compute(header).0));
    }

    #[test]
    fn descriptor_checksums_cover_tag_and_payload() {
        let container = BlteEncoder::new()
            .add_stored(b"abcd")
            .add_deflate(b"xyz")
            .encode()
            .unwrap();

        for (index, descriptor) in container.table.iter().enumerate() {
            let start = container.block_offset(index);
            let end = start + descriptor.encoded_size as usize;
            assert_eq!(
                md5::compute(&container.bytes[start..end]).0,
                descriptor.checksum
            );
        }
        assert_eq!(container.bytes[container.block_offset(1)], b'Z');
    }

    #[test]
    fn chunked_splits_into_blocks() {
        let data = vec![7u8; 100];
        let container = BlteEncoder::new()
            .add_chunked(BlockEncoding::Stored, &data, 30)
            .encode()
            .unwrap();

        let sizes: Vec<i32> = container.table.iter().map(|d| d.decoded_size).collect();
        assert_eq!(sizes, vec![30, 30, 30, 10]);
        assert_eq!(container.table.total_decoded_size(), 100);
    }

    #[test]
    fn chunked_empty_input_is_one_empty_block() {
        let mut encoder = BlteEncoder::new();
        encoder.add_chunked(BlockEncoding::Deflate, b"", 64);
        assert_eq!(encoder.len(), 1);

        let container = encoder.encode().unwrap();
        assert_eq!(container.table.get(0).unwrap().decoded_size, 0);
    }

    #[test]
    fn block_size_limit_enforced() {
        let config = EncoderConfig {
            max_block_size: 8,
            ..EncoderConfig::default()
        };
        let result = BlteEncoder::with_config(config)
            .add_stored(b"small")
            .add_stored(b"larger than eight")
            .encode();
        assert!(matches!(
            result,
            Err(EncodeError::BlockTooLarge {
                index: 1,
                size: 17,
                limit: 8
            })
        ));
    }

    #[test]
    fn decoder_reads_back_with_verification() {
        let text = "fn main() { println!(\"hello\"); }\n".repeat(20);
        let container = BlteEncoder::new()
            .add_deflate(text.as_bytes())
            .add_stored(b"\x00\xff")
            .encode()
            .unwrap();

        let mut decoder = BlteDecoder::with_config(
            container.bytes.as_slice(),
            DecoderConfig {
                check_decoded_size: true,
                ..DecoderConfig::verified(&container.header_hash)
            },
        )
        .unwrap();

        let blocks: Vec<Vec<u8>> = decoder.blocks().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks, vec![text.into_bytes(), b"\x00\xff".to_vec()]);
    }
}
