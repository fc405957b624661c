#![warn(clippy::pedantic)]

pub mod block_table;
pub mod encoding;
pub mod error;
pub mod header;

pub use block_table::{BlockDescriptor, BlockTable};
pub use encoding::BlockEncoding;
pub use error::WireError;
pub use header::BlteHeader;
