#![warn(clippy::pedantic)]

pub mod checksum;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;

pub use codec::{decode_block, BlockEncoding};
pub use config::DecoderConfig;
pub use decoder::{BlteDecoder, Blocks, EncodedBlock, EncodedBlocks};
pub use error::{CodecError, DecodeError, ErrorKind};
