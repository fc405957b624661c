use crate::codec::MAX_DECODED_BLOCK_SIZE;

/// Configuration for a [`BlteDecoder`](crate::BlteDecoder).
///
/// Captured once at construction. Every checksum step is gated on
/// `verify`; with it off no digest is computed at either granularity.
///
/// ```text
/// ┌────────────────────────┬──────────────────────────────────────────────┐
/// │ Field                  │ Purpose                                      │
/// ├────────────────────────┼──────────────────────────────────────────────┤
/// │ verify                 │ Check header and per-block MD5 checksums     │
/// │ expected_hash          │ Hex MD5 of the header, supplied by caller    │
/// │ check_decoded_size     │ Fail when output length != decoded_size      │
/// │ max_decoded_block_size │ Ceiling for a single inflated block          │
/// └────────────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// With `verify` set but no `expected_hash`, the header check is skipped
/// and only block checksums are verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Verify checksums at header and block level.
    pub verify: bool,

    /// Expected MD5 of the header bytes, as hex. Compared
    /// case-insensitively. Ignored unless `verify` is set.
    pub expected_hash: Option<String>,

    /// Treat a decoded length that differs from the descriptor's
    /// `decoded_size` as a format error. Off by default: the declared
    /// size is informational and a mismatch is only logged.
    pub check_decoded_size: bool,

    /// Upper bound on the output of one deflate block.
    pub max_decoded_block_size: usize,
}

impl Default for DecoderConfig {
    /// No verification, no size check, 256 MiB inflate limit.
    fn default() -> Self {
        Self {
            verify: false,
            expected_hash: None,
            check_decoded_size: false,
            max_decoded_block_size: MAX_DECODED_BLOCK_SIZE,
        }
    }
}

impl DecoderConfig {
    /// Verification on, checking the header against `expected_hash`.
    #[must_use]
    pub fn verified(expected_hash: impl Into<String>) -> Self {
        Self {
            verify: true,
            expected_hash: Some(expected_hash.into()),
            ..Self::default()
        }
    }
}
