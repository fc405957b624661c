/// Structural errors in the fixed BLTE header or the block table.
///
/// Every variant describes a malformed prefix: the bytes on the wire do
/// not form a container this crate understands. Offsets are measured from
/// the first byte of the container (the `B` of the magic).
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before the header or block table was complete.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The first four bytes were not `BLTE`.
    #[error("invalid magic number: expected 0x424C5445, got {found:#010X}")]
    InvalidMagic { found: u32 },

    /// The format-version byte was not `0x0F`.
    #[error("unsupported format version {found:#04X}, expected 0x0F")]
    UnsupportedVersion { found: u8 },

    /// `header_size` was zero: the single-block, table-less shorthand.
    #[error("headerless containers (header_size == 0) are not supported")]
    HeaderlessUnsupported,

    /// `header_size` cannot cover the version byte and block count, or
    /// exceeds what a 24-bit block count can describe.
    #[error("invalid header size {size}")]
    InvalidHeaderSize { size: i32 },

    /// More blocks than a 24-bit count can hold.
    #[error("too many blocks: {count} (limit {limit})")]
    TooManyBlocks { count: usize, limit: usize },

    /// I/O error while writing a header or block table.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
