use blte_wire::WireError;

/// Errors raised while decoding a single block's encoded bytes.
///
/// Produced by [`decode_block`](crate::codec::decode_block), which has no
/// notion of where the block sits in a container. The streaming decoder
/// wraps these in [`DecodeError::Codec`] together with the block index.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The block had zero bytes, so there is no encoding tag to dispatch on.
    #[error("empty block: no encoding tag")]
    EmptyBlock,

    /// The tag byte names no known encoding.
    #[error("unknown block encoding tag {tag:#04X}")]
    UnknownEncoding { tag: u8 },

    /// The raw deflate stream was malformed.
    #[error("raw deflate decompression failed: {0}")]
    InflateFailed(String),

    /// Inflating the payload produced more than the configured limit.
    #[error("decompressed block exceeds limit of {limit} bytes")]
    DecompressionBomb { limit: usize },
}

/// Errors that can occur while decoding a BLTE container.
///
/// Nothing is retried inside the decoder: a stream that produced a bad
/// read cannot be rewound, so retrying belongs to whoever can re-fetch the
/// source bytes. Each variant carries the context needed for that decision
/// (block index, expected and actual checksum, tag byte).
///
/// Error hierarchy, grouped by [`ErrorKind`]:
///
/// ```text
///   DecodeError
///   ├── Format
///   │   ├── InvalidHeader(WireError)  ← magic, header size, version, truncated table
///   │   ├── NegativeBlockSize         ← descriptor declares encoded_size < 0
///   │   ├── TruncatedBlock            ← stream ended inside a block
///   │   └── DecodedSizeMismatch       ← strict size check enabled and violated
///   ├── Checksum
///   │   ├── HeaderChecksumMismatch    ← MD5 of header != expected hash
///   │   └── BlockChecksumMismatch     ← MD5 of block != table entry
///   ├── Codec
///   │   └── Codec { index, CodecError }
///   ├── Usage
///   │   └── AlreadyIterated           ← second traversal requested
///   └── Io(std::io::Error)            ← underlying reader failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The fixed header or block table failed validation.
    #[error("invalid header: {0}")]
    InvalidHeader(WireError),

    /// A descriptor declared a negative encoded size.
    #[error("block {index} declares negative encoded size {size}")]
    NegativeBlockSize { index: usize, size: i32 },

    /// The stream ended before a block's declared bytes were read.
    #[error("block {index} truncated: expected {expected} bytes, read {actual}")]
    TruncatedBlock {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// A decoded block's length differed from its descriptor. Only raised
    /// when [`DecoderConfig::check_decoded_size`](crate::DecoderConfig::check_decoded_size)
    /// is set.
    #[error("block {index} decoded to {actual} bytes, table declares {expected}")]
    DecodedSizeMismatch {
        index: usize,
        expected: i32,
        actual: usize,
    },

    /// MD5 over the header bytes did not match the expected hash.
    #[error("header checksum mismatch: expected {expected}, got {actual}")]
    HeaderChecksumMismatch { expected: String, actual: String },

    /// MD5 over a block's encoded bytes did not match its table entry.
    #[error("block {index} checksum mismatch: expected {expected}, got {actual}")]
    BlockChecksumMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// The block's encoding tag was unknown or its payload failed to decode.
    #[error("block {index}: {source}")]
    Codec {
        index: usize,
        #[source]
        source: CodecError,
    },

    /// The block sequence was already traversed. The underlying stream
    /// cannot be rewound; buffer the output or open a fresh decoder.
    #[error("blocks have already been iterated; the stream cannot be rewound")]
    AlreadyIterated,

    /// An I/O error from the underlying reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Checksum,
    Codec,
    Usage,
    Io,
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHeader(_)
            | Self::NegativeBlockSize { .. }
            | Self::TruncatedBlock { .. }
            | Self::DecodedSizeMismatch { .. } => ErrorKind::Format,
            Self::HeaderChecksumMismatch { .. } | Self::BlockChecksumMismatch { .. } => {
                ErrorKind::Checksum
            }
            Self::Codec { .. } => ErrorKind::Codec,
            Self::AlreadyIterated => ErrorKind::Usage,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Index of the block the error refers to, if it is block-specific.
    #[must_use]
    pub fn block_index(&self) -> Option<usize> {
        match self {
            Self::NegativeBlockSize { index, .. }
            | Self::TruncatedBlock { index, .. }
            | Self::DecodedSizeMismatch { index, .. }
            | Self::BlockChecksumMismatch { index, .. }
            | Self::Codec { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        assert_eq!(
            DecodeError::InvalidHeader(WireError::HeaderlessUnsupported).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            DecodeError::BlockChecksumMismatch {
                index: 0,
                expected: String::new(),
                actual: String::new(),
            }
            .kind(),
            ErrorKind::Checksum
        );
        assert_eq!(
            DecodeError::Codec {
                index: 1,
                source: CodecError::UnknownEncoding { tag: b'X' },
            }
            .kind(),
            ErrorKind::Codec
        );
        assert_eq!(DecodeError::AlreadyIterated.kind(), ErrorKind::Usage);
    }

    #[test]
    fn codec_error_display_names_tag_and_block() {
        let err = DecodeError::Codec {
            index: 3,
            source: CodecError::UnknownEncoding { tag: b'X' },
        };
        assert_eq!(err.to_string(), "block 3: unknown block encoding tag 0x58");
        assert_eq!(err.block_index(), Some(3));
    }

    #[test]
    fn header_errors_have_no_block_index() {
        let err = DecodeError::HeaderChecksumMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(err.block_index(), None);
        assert_eq!(
            err.to_string(),
            "header checksum mismatch: expected aa, got bb"
        );
    }
}
