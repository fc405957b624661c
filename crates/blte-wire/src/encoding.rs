/// Block encodings, keyed by the tag byte that opens every block.
///
/// ```text
/// ┌─────┬──────────┬─────────────────────────────────────────────┐
/// │ Tag │ Variant  │ Payload                                     │
/// ├─────┼──────────┼─────────────────────────────────────────────┤
/// │ 'N' │ Stored   │ decoded bytes, as is                        │
/// │ 'Z' │ Deflate  │ raw deflate stream (no zlib header/trailer) │
/// └─────┴──────────┴─────────────────────────────────────────────┘
/// ```
///
/// The set is closed: any other tag is rejected by the decoder. New
/// encodings are added as variants here plus one match arm in the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockEncoding {
    Stored,
    Deflate,
}

impl BlockEncoding {
    pub const STORED_TAG: u8 = b'N';
    pub const DEFLATE_TAG: u8 = b'Z';

    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            Self::STORED_TAG => Some(Self::Stored),
            Self::DEFLATE_TAG => Some(Self::Deflate),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Stored => Self::STORED_TAG,
            Self::Deflate => Self::DEFLATE_TAG,
        }
    }

    /// Short lowercase name, used in logs and CLI output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Deflate => "deflate",
        }
    }
}
