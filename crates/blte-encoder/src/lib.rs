#![warn(clippy::pedantic)]

pub mod compression;
pub mod encoder;
pub mod error;

pub use encoder::{BlteEncoder, EncodedContainer, EncoderConfig};
pub use error::EncodeError;

pub use blte_wire::BlockEncoding;
