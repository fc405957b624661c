use crate::error::WireError;
use crate::header::{FIXED_HEADER_SIZE, MIN_HEADER_SIZE};

/// Size of the big-endian block count that opens the block-info region.
pub const BLOCK_COUNT_SIZE: usize = 3;

/// Size of one block descriptor on the wire: two i32 sizes plus an MD5.
pub const DESCRIPTOR_SIZE: usize = 4 + 4 + 16;

/// Largest count a 24-bit field can hold.
pub const MAX_BLOCK_COUNT: usize = 0x00FF_FFFF;

/// One entry of the block table.
///
/// ```text
/// ┌────────┬──────────┬──────────────────────────────────────────┐
/// │ Offset │ Size     │ Description                              │
/// ├────────┼──────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 4 bytes  │ encoded_size, i32 BE (includes tag byte) │
/// │ 0x04   │ 4 bytes  │ decoded_size, i32 BE                     │
/// │ 0x08   │ 16 bytes │ MD5 of the block's encoded bytes         │
/// └────────┴──────────┴──────────────────────────────────────────┘
/// ```
///
/// Sizes stay signed because that is how they are declared on the wire;
/// the decoder decides what a negative value means when it reaches the
/// block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Bytes to read from the stream for this block, tag byte included.
    pub encoded_size: i32,

    /// Declared size after decoding. Informational.
    pub decoded_size: i32,

    /// Raw MD5 digest of the encoded bytes.
    pub checksum: [u8; 16],
}

impl BlockDescriptor {
    /// The checksum as a lowercase hex string.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        hex::encode(self.checksum)
    }

    /// Parse one descriptor from the first 24 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`DESCRIPTOR_SIZE`]. The reported offset is relative to `buf`.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        let Some(raw) = buf.get(..DESCRIPTOR_SIZE) else {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        };

        let encoded_size = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let decoded_size = i32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]);
        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&raw[8..24]);

        Ok(Self {
            encoded_size,
            decoded_size,
            checksum,
        })
    }

    /// Write the 24-byte descriptor.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the writer.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<(), WireError> {
        w.write_all(&self.encoded_size.to_be_bytes())?;
        w.write_all(&self.decoded_size.to_be_bytes())?;
        w.write_all(&self.checksum)?;
        Ok(())
    }
}

/// The ordered list of block descriptors from a container header.
///
/// Table order is decode order. The table is parsed in one go from the
/// block-info region and never changes afterwards.
///
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ block_count   (u24 BE, 3 bytes)              │
/// │ descriptor 0  (24 bytes)                     │
/// │ descriptor 1  (24 bytes)                     │
/// │ ...                                          │
/// └──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTable {
    descriptors: Vec<BlockDescriptor>,
}

impl BlockTable {
    #[must_use]
    pub fn new(descriptors: Vec<BlockDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Parse the block-info region (everything after the version byte,
    /// up to `header_size`).
    ///
    /// Bytes past the last descriptor are left unread; callers that care
    /// can compare [`encoded_len`](Self::encoded_len) against the region
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if the region is too short for
    /// the count it declares. Offsets are container-relative.
    pub fn read_from(region: &[u8]) -> Result<Self, WireError> {
        let Some(count_bytes) = region.get(..BLOCK_COUNT_SIZE) else {
            return Err(WireError::UnexpectedEof {
                offset: FIXED_HEADER_SIZE + region.len(),
            });
        };
        // Zero-extend the 24-bit count to 32 bits.
        let count =
            u32::from_be_bytes([0, count_bytes[0], count_bytes[1], count_bytes[2]]) as usize;

        let needed = BLOCK_COUNT_SIZE + count * DESCRIPTOR_SIZE;
        if region.len() < needed {
            return Err(WireError::UnexpectedEof {
                offset: FIXED_HEADER_SIZE + region.len(),
            });
        }

        let descriptors = region[BLOCK_COUNT_SIZE..needed]
            .chunks_exact(DESCRIPTOR_SIZE)
            .map(BlockDescriptor::read_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { descriptors })
    }

    /// Write the block count followed by every descriptor.
    ///
    /// # Returns
    ///
    /// Total number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`WireError::TooManyBlocks`] if the table has more than
    ///   [`MAX_BLOCK_COUNT`] entries.
    /// - [`WireError::Io`] if the writer fails.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        let count = self.descriptors.len();
        if count > MAX_BLOCK_COUNT {
            return Err(WireError::TooManyBlocks {
                count,
                limit: MAX_BLOCK_COUNT,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let count_bytes = (count as u32).to_be_bytes();
        w.write_all(&count_bytes[1..])?;

        for descriptor in &self.descriptors {
            descriptor.write_to(w)?;
        }

        Ok(self.encoded_len())
    }

    /// Bytes this table occupies in the block-info region.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        BLOCK_COUNT_SIZE + self.descriptors.len() * DESCRIPTOR_SIZE
    }

    /// Value of `header_size` for a container carrying this table.
    #[must_use]
    pub fn header_size(&self) -> usize {
        MIN_HEADER_SIZE + self.descriptors.len() * DESCRIPTOR_SIZE
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BlockDescriptor> {
        self.descriptors.get(index)
    }

    #[must_use]
    pub fn descriptors(&self) -> &[BlockDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockDescriptor> {
        self.descriptors.iter()
    }

    /// Sum of declared encoded sizes. Should equal the number of payload
    /// bytes that follow the header.
    #[must_use]
    pub fn total_encoded_size(&self) -> i64 {
        self.descriptors
            .iter()
            .map(|d| i64::from(d.encoded_size))
            .sum()
    }

    /// Sum of declared decoded sizes.
    #[must_use]
    pub fn total_decoded_size(&self) -> i64 {
        self.descriptors
            .iter()
            .map(|d| i64::from(d.decoded_size))
            .sum()
    }
}

impl<'a> IntoIterator for &'a BlockTable {
    type Item = &'a BlockDescriptor;
    type IntoIter = std::slice::Iter<'a, BlockDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
