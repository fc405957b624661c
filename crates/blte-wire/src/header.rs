use crate::block_table::{BLOCK_COUNT_SIZE, DESCRIPTOR_SIZE, MAX_BLOCK_COUNT};
use crate::error::WireError;

/// Magic number: ASCII "BLTE".
/// Compared as raw bytes so byte order never comes into it.
pub const BLTE_MAGIC: [u8; 4] = *b"BLTE";

/// Magic plus the big-endian `header_size` field.
pub const PREFIX_SIZE: usize = 8;

/// Prefix plus the format-version byte. Everything after this (up to
/// `header_size`) is the block-info region.
pub const FIXED_HEADER_SIZE: usize = PREFIX_SIZE + 1;

/// The only format-version marker this crate understands.
pub const FORMAT_VERSION: u8 = 0x0F;

/// Smallest `header_size` that can hold a block count.
pub const MIN_HEADER_SIZE: usize = FIXED_HEADER_SIZE + BLOCK_COUNT_SIZE;

/// Largest `header_size` a 24-bit block count can describe.
pub const MAX_HEADER_SIZE: usize = MIN_HEADER_SIZE + MAX_BLOCK_COUNT * DESCRIPTOR_SIZE;

/// The fixed part of a BLTE header.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Magic: "BLTE" (0x424C5445)               │
/// │ 0x04   │ 4 bytes │ header_size, i32 big-endian              │
/// │ 0x08   │ 1 byte  │ Format version (0x0F)                    │
/// │ 0x09   │ ...     │ Block-info region (header_size - 9)      │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// `header_size` counts every header byte, magic and size field included,
/// so the first block payload starts exactly `header_size` bytes into the
/// container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlteHeader {
    pub header_size: u32,
    pub format_version: u8,
}

impl BlteHeader {
    /// Create a header for a container whose header spans `header_size`
    /// bytes. Usually obtained from [`BlockTable::header_size`](crate::BlockTable::header_size).
    #[must_use]
    pub fn new(header_size: u32) -> Self {
        Self {
            header_size,
            format_version: FORMAT_VERSION,
        }
    }

    /// Length of the block-info region that follows the fixed header.
    #[must_use]
    pub fn table_len(&self) -> usize {
        (self.header_size as usize).saturating_sub(FIXED_HEADER_SIZE)
    }

    /// Write the 9-byte fixed header into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`FIXED_HEADER_SIZE`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < FIXED_HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        buf[0..4].copy_from_slice(&BLTE_MAGIC);
        buf[4..8].copy_from_slice(&self.header_size.to_be_bytes());
        buf[8] = self.format_version;

        Ok(())
    }

    /// Validate the 8-byte prefix (magic and `header_size`) and return the
    /// header size. Lets a stream reader reject a foreign file before it
    /// asks for the version byte.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if the buffer is too short.
    /// - [`WireError::InvalidMagic`] if the magic is not `BLTE`.
    /// - [`WireError::HeaderlessUnsupported`] if `header_size` is zero.
    /// - [`WireError::InvalidHeaderSize`] if `header_size` is out of range.
    pub fn read_prefix(buf: &[u8]) -> Result<u32, WireError> {
        if buf.len() < 4 {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }
        if buf[0..4] != BLTE_MAGIC {
            let found = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
            return Err(WireError::InvalidMagic { found });
        }
        if buf.len() < PREFIX_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let size = i32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if size == 0 {
            return Err(WireError::HeaderlessUnsupported);
        }
        u32::try_from(size)
            .ok()
            .filter(|&s| (MIN_HEADER_SIZE..=MAX_HEADER_SIZE).contains(&(s as usize)))
            .ok_or(WireError::InvalidHeaderSize { size })
    }

    /// Parse the fixed header from the first 9 bytes of `buf`.
    ///
    /// Checks run in wire order: magic, then `header_size`, then the
    /// version byte. A zero `header_size` is reported before the version
    /// byte is looked at, since in that shorthand the ninth byte is a
    /// block tag rather than a version.
    ///
    /// # Errors
    ///
    /// - Any error from [`read_prefix`](Self::read_prefix).
    /// - [`WireError::UnexpectedEof`] if the version byte is missing.
    /// - [`WireError::UnsupportedVersion`] if the version byte is not 0x0F.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        let header_size = Self::read_prefix(buf)?;

        let &format_version = buf
            .get(PREFIX_SIZE)
            .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
        if format_version != FORMAT_VERSION {
            return Err(WireError::UnsupportedVersion {
                found: format_version,
            });
        }

        Ok(Self {
            header_size,
            format_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(header_size: i32, version: u8) -> [u8; FIXED_HEADER_SIZE] {
        let mut buf = [0u8; FIXED_HEADER_SIZE];
        buf[0..4].copy_from_slice(&BLTE_MAGIC);
        buf[4..8].copy_from_slice(&header_size.to_be_bytes());
        buf[8] = version;
        buf
    }

    #[test]
    fn write_then_read() {
        let header = BlteHeader::new(60);
        let mut buf = [0u8; FIXED_HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        assert_eq!(&buf[0..4], b"BLTE");
        assert_eq!(BlteHeader::read_from(&buf).unwrap(), header);
    }

    #[test]
    fn table_len_excludes_fixed_part() {
        assert_eq!(BlteHeader::new(60).table_len(), 51);
        assert_eq!(BlteHeader::new(12).table_len(), 3);
    }

    #[test]
    fn reject_bad_magic() {
        let mut buf = fixed(36, FORMAT_VERSION);
        buf[0..4].copy_from_slice(b"NOPE");
        let result = BlteHeader::read_from(&buf);
        assert!(matches!(
            result,
            Err(WireError::InvalidMagic { found: 0x4E4F_5045 })
        ));
    }

    #[test]
    fn magic_checked_before_length() {
        let result = BlteHeader::read_from(b"XXXX\0\0\0\x0c");
        assert!(matches!(
            result,
            Err(WireError::InvalidMagic { found: 0x5858_5858 })
        ));

        let result = BlteHeader::read_from(b"BLTE\0\0\0\x0c");
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 8 })));
    }

    #[test]
    fn prefix_without_version_byte() {
        assert_eq!(BlteHeader::read_prefix(b"BLTE\0\0\0\x24").unwrap(), 36);
        assert!(matches!(
            BlteHeader::read_prefix(b"BLT"),
            Err(WireError::UnexpectedEof { offset: 3 })
        ));
    }

    #[test]
    fn reject_unsupported_version() {
        let buf = fixed(36, 0x10);
        let result = BlteHeader::read_from(&buf);
        assert!(matches!(
            result,
            Err(WireError::UnsupportedVersion { found: 0x10 })
        ));
    }

    #[test]
    fn reject_headerless_shorthand() {
        // 'N' where the version byte would be
        let buf = fixed(0, b'N');
        let result = BlteHeader::read_from(&buf);
        assert!(matches!(result, Err(WireError::HeaderlessUnsupported)));
    }

    #[test]
    fn reject_header_size_too_small() {
        for size in [-1, 1, 9, 11] {
            let result = BlteHeader::read_from(&fixed(size, FORMAT_VERSION));
            assert!(
                matches!(result, Err(WireError::InvalidHeaderSize { size: s }) if s == size),
                "size {size} should be rejected"
            );
        }
    }

    #[test]
    fn reject_header_size_beyond_block_count_limit() {
        let too_big = i32::try_from(MAX_HEADER_SIZE + 1).unwrap();
        let result = BlteHeader::read_from(&fixed(too_big, FORMAT_VERSION));
        assert!(matches!(result, Err(WireError::InvalidHeaderSize { .. })));
    }

    #[test]
    fn reject_buffer_too_short() {
        let result = BlteHeader::read_from(b"BLTE\0\0");
        assert!(matches!(
            result,
            Err(WireError::UnexpectedEof { offset: 6 })
        ));
    }
}
