use blte_wire::WireError;

/// Errors that can occur while building a BLTE container.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── EmptyPayload         ← no blocks were added before .encode()
///   ├── BlockTooLarge        ← a block exceeds the configured size limit
///   ├── Wire(WireError)      ← from blte-wire serialization
///   └── Io(std::io::Error)   ← from the deflate writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no blocks have been added to the encoder")]
    EmptyPayload,

    #[error("block {index} exceeds maximum size ({size} bytes, limit {limit})")]
    BlockTooLarge {
        index: usize,
        size: usize,
        limit: usize,
    },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
