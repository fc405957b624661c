use std::io::{self, Read};
use std::iter::FusedIterator;

use blte_wire::header::{FIXED_HEADER_SIZE, PREFIX_SIZE};
use blte_wire::{BlockDescriptor, BlockTable, BlteHeader, WireError};
use tracing::{debug, trace, warn};

use crate::checksum::{hex_matches, md5_hex, md5_hex_parts};
use crate::codec::{self, BlockEncoding};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Streaming BLTE decoder over any [`Read`] source.
///
/// Construction reads and validates the header and block table eagerly;
/// block payloads are read lazily, one per iterator step, straight from
/// the underlying reader. Nothing is buffered beyond the block currently
/// being decoded.
///
/// ```text
///   new / with_config
///     │  read 8-byte prefix         → magic, header_size
///     │  read 1 byte                → version
///     │  read header_size - 9 bytes → block-info region
///     │  [verify] MD5(header) == expected_hash
///     │  parse block table
///     ▼
///   blocks() / encoded_blocks()      ← exactly one, exactly once
///     │  per step: read encoded_size bytes
///     │            [verify] MD5(block) == descriptor.checksum
///     │            decode by tag ('N' | 'Z')   (blocks() only)
///     ▼
///   exhausted
/// ```
///
/// The reader is never closed. To keep ownership, pass `&mut reader`;
/// `&mut R` is itself a [`Read`].
///
/// # Example
///
/// ```rust
/// use blte_decoder::BlteDecoder;
/// use blte_encoder::BlteEncoder;
///
/// let container = BlteEncoder::new()
///     .add_stored(b"abcd")
///     .add_deflate(b"xyz")
///     .encode()
///     .unwrap();
///
/// let mut decoder =
///     BlteDecoder::new(container.bytes.as_slice(), &container.header_hash, true).unwrap();
/// assert_eq!(decoder.block_table().len(), 2);
///
/// let blocks: Vec<Vec<u8>> = decoder.blocks().unwrap().collect::<Result<_, _>>().unwrap();
/// assert_eq!(blocks, vec![b"abcd".to_vec(), b"xyz".to_vec()]);
/// ```
pub struct BlteDecoder<R> {
    reader: R,
    config: DecoderConfig,
    header: BlteHeader,
    table: BlockTable,
    /// Index of the next block to read. Shared by both iterator views.
    next_block: usize,
    traversal_started: bool,
}

impl<R: Read> BlteDecoder<R> {
    /// Parse the header of a container, optionally verifying it against
    /// `expected_hash` (hex MD5 of the header bytes).
    ///
    /// With `verify` false no checksum is computed, here or per block.
    ///
    /// # Errors
    ///
    /// See [`with_config`](Self::with_config).
    pub fn new(
        reader: R,
        expected_hash: impl Into<String>,
        verify: bool,
    ) -> Result<Self, DecodeError> {
        Self::with_config(
            reader,
            DecoderConfig {
                verify,
                expected_hash: Some(expected_hash.into()),
                ..DecoderConfig::default()
            },
        )
    }

    /// Parse the header of a container with an explicit configuration.
    ///
    /// Consumes exactly `header_size` bytes from `reader`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidHeader`] for a bad magic, unsupported
    ///   version, out-of-range or zero `header_size`, or a stream that ends
    ///   inside the header.
    /// - [`DecodeError::HeaderChecksumMismatch`] if verification is on and
    ///   the header MD5 differs from the expected hash.
    /// - [`DecodeError::Io`] if the reader fails.
    pub fn with_config(mut reader: R, config: DecoderConfig) -> Result<Self, DecodeError> {
        let mut fixed = read_up_to(&mut reader, PREFIX_SIZE)?;
        BlteHeader::read_prefix(&fixed).map_err(DecodeError::InvalidHeader)?;
        fixed.extend(read_header_part(&mut reader, 1, PREFIX_SIZE)?);
        let header = BlteHeader::read_from(&fixed).map_err(DecodeError::InvalidHeader)?;
        let region = read_header_part(&mut reader, header.table_len(), FIXED_HEADER_SIZE)?;

        if config.verify {
            verify_header(&config, &fixed, &region)?;
        }

        let table = BlockTable::read_from(&region).map_err(DecodeError::InvalidHeader)?;
        if table.encoded_len() < region.len() {
            debug!(
                unused = region.len() - table.encoded_len(),
                "block-info region has bytes past the last descriptor"
            );
        }

        debug!(
            header_size = header.header_size,
            blocks = table.len(),
            verify = config.verify,
            "parsed BLTE header"
        );

        Ok(Self {
            reader,
            config,
            header,
            table,
            next_block: 0,
            traversal_started: false,
        })
    }

    /// Lazily decode every block, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::AlreadyIterated`] if this decoder has
    /// already handed out a traversal, from either this method or
    /// [`encoded_blocks`](Self::encoded_blocks).
    pub fn blocks(&mut self) -> Result<Blocks<'_, R>, DecodeError> {
        Ok(Blocks {
            inner: self.encoded_blocks()?,
        })
    }

    /// Lazily read every block's encoded bytes without decoding them.
    ///
    /// Checksums are still verified when verification is on. Shares the
    /// one-shot cursor with [`blocks`](Self::blocks).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::AlreadyIterated`] on a second traversal.
    pub fn encoded_blocks(&mut self) -> Result<EncodedBlocks<'_, R>, DecodeError> {
        if self.traversal_started {
            return Err(DecodeError::AlreadyIterated);
        }
        self.traversal_started = true;

        Ok(EncodedBlocks {
            decoder: self,
            finished: false,
        })
    }

    /// Decode every block and concatenate the results.
    ///
    /// # Errors
    ///
    /// Any error from [`blocks`](Self::blocks) or from a block step.
    pub fn decode_all(&mut self) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        for block in self.blocks()? {
            out.extend_from_slice(&block?);
        }
        Ok(out)
    }

    /// Read block `index` from the stream and verify it.
    fn read_block(&mut self, index: usize) -> Result<EncodedBlock, DecodeError> {
        let descriptor = self.table.descriptors()[index];
        let expected =
            usize::try_from(descriptor.encoded_size).map_err(|_| DecodeError::NegativeBlockSize {
                index,
                size: descriptor.encoded_size,
            })?;

        let data = read_up_to(&mut self.reader, expected)?;
        if data.len() < expected {
            return Err(DecodeError::TruncatedBlock {
                index,
                expected,
                actual: data.len(),
            });
        }

        if self.config.verify {
            let digest = md5::compute(&data);
            if digest.0 != descriptor.checksum {
                return Err(DecodeError::BlockChecksumMismatch {
                    index,
                    expected: descriptor.checksum_hex(),
                    actual: hex::encode(digest.0),
                });
            }
            trace!(block = index, "block checksum verified");
        }

        Ok(EncodedBlock {
            index,
            descriptor,
            data,
            limits: DecodeLimits::from(&self.config),
        })
    }
}

impl<R> BlteDecoder<R> {
    #[must_use]
    pub fn header(&self) -> &BlteHeader {
        &self.header
    }

    /// The parsed block table. Available immediately after construction
    /// and unaffected by iteration.
    #[must_use]
    pub fn block_table(&self) -> &BlockTable {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of blocks read from the stream so far.
    #[must_use]
    pub fn blocks_read(&self) -> usize {
        self.next_block
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Give the reader back, positioned wherever iteration stopped.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// One block as read from the stream, before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBlock {
    /// Position in the block table.
    pub index: usize,

    /// The table entry this block was read against.
    pub descriptor: BlockDescriptor,

    /// Exactly `descriptor.encoded_size` bytes: tag byte plus payload.
    pub data: Vec<u8>,

    limits: DecodeLimits,
}

/// The parts of [`DecoderConfig`] that govern decoding a block, carried
/// by each [`EncodedBlock`] so it decodes under the same rules as
/// [`BlteDecoder::blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DecodeLimits {
    max_decoded_block_size: usize,
    check_decoded_size: bool,
}

impl From<&DecoderConfig> for DecodeLimits {
    fn from(config: &DecoderConfig) -> Self {
        Self {
            max_decoded_block_size: config.max_decoded_block_size,
            check_decoded_size: config.check_decoded_size,
        }
    }
}

impl EncodedBlock {
    #[must_use]
    pub fn tag(&self) -> Option<u8> {
        self.data.first().copied()
    }

    #[must_use]
    pub fn encoding(&self) -> Option<BlockEncoding> {
        self.tag().and_then(BlockEncoding::from_tag)
    }

    /// MD5 of the encoded bytes, as lowercase hex.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        md5_hex(&self.data)
    }

    /// Run the codec on this block, under the decompression limit and
    /// decoded-size policy of the decoder that read it.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Codec`] tagged with this block's index.
    /// - [`DecodeError::DecodedSizeMismatch`] if the decoder was built
    ///   with `check_decoded_size` and the output length disagrees with
    ///   the descriptor.
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        let limit = self.limits.max_decoded_block_size;
        let decoded = codec::decode_block_with_limit(&self.data, limit).map_err(|source| {
            DecodeError::Codec {
                index: self.index,
                source,
            }
        })?;

        let declared = self.descriptor.decoded_size;
        if usize::try_from(declared).ok() != Some(decoded.len()) {
            if self.limits.check_decoded_size {
                return Err(DecodeError::DecodedSizeMismatch {
                    index: self.index,
                    expected: declared,
                    actual: decoded.len(),
                });
            }
            warn!(
                block = self.index,
                declared,
                actual = decoded.len(),
                "decoded size differs from block table"
            );
        }

        trace!(
            block = self.index,
            encoding = self.encoding().map_or("?", BlockEncoding::name),
            encoded = self.data.len(),
            decoded = decoded.len(),
            "decoded block"
        );
        Ok(decoded)
    }
}

/// Iterator over encoded blocks. See [`BlteDecoder::encoded_blocks`].
///
/// Stops after the first error: the stream position is unknown at that
/// point, so later blocks cannot be located.
pub struct EncodedBlocks<'a, R> {
    decoder: &'a mut BlteDecoder<R>,
    finished: bool,
}

impl<R: Read> Iterator for EncodedBlocks<'_, R> {
    type Item = Result<EncodedBlock, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let index = self.decoder.next_block;
        if index >= self.decoder.table.len() {
            self.finished = true;
            return None;
        }

        let result = self.decoder.read_block(index);
        match result {
            Ok(_) => self.decoder.next_block += 1,
            Err(ref e) => {
                debug!(block = index, error = %e, "block read failed");
                self.finished = true;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = self.decoder.table.len() - self.decoder.next_block;
        (0, Some(remaining))
    }
}

impl<R: Read> FusedIterator for EncodedBlocks<'_, R> {}

/// Iterator over decoded blocks. See [`BlteDecoder::blocks`].
pub struct Blocks<'a, R> {
    inner: EncodedBlocks<'a, R>,
}

impl<R: Read> Iterator for Blocks<'_, R> {
    type Item = Result<Vec<u8>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = match self.inner.next()? {
            Ok(block) => block,
            Err(e) => return Some(Err(e)),
        };

        let result = block.decode();
        if result.is_err() {
            self.inner.finished = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<R: Read> FusedIterator for Blocks<'_, R> {}

/// Read up to `len` bytes. Returns fewer only if the reader hits EOF.
///
/// Grows the buffer as data arrives instead of allocating `len` up front,
/// so a lying size field cannot force a huge allocation on a short stream.
fn read_up_to<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read a header section, reporting a short read as a truncated header.
fn read_header_part<R: Read>(
    reader: &mut R,
    len: usize,
    offset: usize,
) -> Result<Vec<u8>, DecodeError> {
    let buf = read_up_to(reader, len)?;
    if buf.len() < len {
        return Err(DecodeError::InvalidHeader(WireError::UnexpectedEof {
            offset: offset + buf.len(),
        }));
    }
    Ok(buf)
}

fn verify_header(config: &DecoderConfig, fixed: &[u8], region: &[u8]) -> Result<(), DecodeError> {
    let Some(expected) = config.expected_hash.as_deref() else {
        debug!("no expected header hash; header checksum not verified");
        return Ok(());
    };

    let actual = md5_hex_parts(&[fixed, region]);
    if !hex_matches(expected, &actual) {
        return Err(DecodeError::HeaderChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }

    trace!(hash = %actual, "header checksum verified");
    Ok(())
}
