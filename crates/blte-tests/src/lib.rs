//! Shared fixtures for the BLTE integration tests and benches.
//!
//! Containers built here bypass `blte-encoder` and lay the bytes out by
//! hand, so the decoder is checked against an independent writer.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::write::DeflateEncoder;

/// Raw deflate of `data`, no zlib wrapper.
#[must_use]
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// One block's encoded bytes plus the decoded size its descriptor claims.
pub struct RawBlock {
    pub data: Vec<u8>,
    pub decoded_size: i32,
}

impl RawBlock {
    #[must_use]
    pub fn stored(payload: &[u8]) -> Self {
        let mut data = vec![b'N'];
        data.extend_from_slice(payload);
        Self {
            data,
            decoded_size: i32::try_from(payload.len()).unwrap(),
        }
    }

    #[must_use]
    pub fn deflated(payload: &[u8]) -> Self {
        let mut data = vec![b'Z'];
        data.extend_from_slice(&deflate(payload));
        Self {
            data,
            decoded_size: i32::try_from(payload.len()).unwrap(),
        }
    }

    /// A block with an arbitrary tag byte.
    #[must_use]
    pub fn tagged(tag: u8, payload: &[u8]) -> Self {
        let mut data = vec![tag];
        data.extend_from_slice(payload);
        Self {
            data,
            decoded_size: i32::try_from(payload.len()).unwrap(),
        }
    }
}

/// A hand-assembled container and the header hash that goes with it.
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub header_hash: String,
    pub header_size: usize,
    /// Container offset of each block's tag byte.
    pub block_offsets: Vec<usize>,
}

impl Fixture {
    #[must_use]
    pub fn build(blocks: &[RawBlock]) -> Self {
        let header_size = 12 + 24 * blocks.len();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"BLTE");
        bytes.extend_from_slice(&i32::try_from(header_size).unwrap().to_be_bytes());
        bytes.push(0x0F);
        bytes.extend_from_slice(&u32::try_from(blocks.len()).unwrap().to_be_bytes()[1..]);

        for block in blocks {
            bytes.extend_from_slice(&i32::try_from(block.data.len()).unwrap().to_be_bytes());
            bytes.extend_from_slice(&block.decoded_size.to_be_bytes());
            bytes.extend_from_slice(&md5::compute(&block.data).0);
        }
        let header_hash = hex::encode(md5::compute(&bytes).0);

        let mut block_offsets = Vec::with_capacity(blocks.len());
        for block in blocks {
            block_offsets.push(bytes.len());
            bytes.extend_from_slice(&block.data);
        }

        Self {
            bytes,
            header_hash,
            header_size,
            block_offsets,
        }
    }

    /// Container offset of descriptor `index`'s checksum field.
    #[must_use]
    pub fn checksum_offset(index: usize) -> usize {
        12 + 24 * index + 8
    }
}

/// Reader that hands out at most `chunk` bytes per `read` call.
pub struct TrickleReader<R> {
    inner: R,
    chunk: usize,
}

impl<R> TrickleReader<R> {
    pub fn new(inner: R, chunk: usize) -> Self {
        Self { inner, chunk }
    }
}

impl<R: Read> Read for TrickleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..limit])
    }
}

/// Reader that counts the bytes it has handed out.
pub struct CountingReader<R> {
    inner: R,
    pub consumed: usize,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n;
        Ok(n)
    }
}

/// Reader that fails after `ok_bytes` bytes.
pub struct FailingReader<R> {
    inner: R,
    remaining: usize,
}

impl<R> FailingReader<R> {
    pub fn new(inner: R, ok_bytes: usize) -> Self {
        Self {
            inner,
            remaining: ok_bytes,
        }
    }
}

impl<R: Read> Read for FailingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream reset"));
        }
        let limit = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..limit])?;
        self.remaining -= n;
        Ok(n)
    }
}
