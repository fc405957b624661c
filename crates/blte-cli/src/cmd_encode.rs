/// Implementation of `blte encode`.
///
/// Splits a plain input file into fixed-size blocks, encodes each as
/// deflate (`Z`) or stored (`N`), and writes the container to `-o`.
/// Prints the header MD5, which is the hash `decode` and `validate`
/// expect via `--hash`.
///
/// ```text
/// $ blte encode notes.txt -o notes.blte --block-size 4096
/// Wrote notes.blte: 3 blocks, 2291 bytes (header 84 bytes)
/// Header MD5: 5d0f0c1b6a3e2f4e8d7c9b0a1f2e3d4c
/// ```
use std::fs;

use anyhow::{Context, Result};
use blte_encoder::{BlockEncoding, BlteEncoder, EncodedContainer, EncoderConfig};

use crate::EncodeArgs;

/// Run the `blte encode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, a block exceeds the
/// encoder limits, or the output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let data =
        fs::read(&args.input).with_context(|| format!("cannot read {}", args.input.display()))?;

    let container = encode(&data, args)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    fs::write(&args.output, &container.bytes)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    println!(
        "Wrote {}: {} block{}, {} bytes (header {} bytes)",
        args.output.display(),
        container.table.len(),
        if container.table.len() == 1 { "" } else { "s" },
        container.bytes.len(),
        container.header_size()
    );
    println!("Header MD5: {}", container.header_hash);
    Ok(())
}

fn encode(data: &[u8], args: &EncodeArgs) -> Result<EncodedContainer> {
    let encoding = if args.store {
        BlockEncoding::Stored
    } else {
        BlockEncoding::Deflate
    };
    let config = EncoderConfig {
        compression_level: args.level,
        ..EncoderConfig::default()
    };

    let container = BlteEncoder::with_config(config)
        .add_chunked(encoding, data, args.block_size)
        .encode()?;
    Ok(container)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use blte_decoder::BlteDecoder;

    use super::*;

    fn args(block_size: usize, store: bool) -> EncodeArgs {
        EncodeArgs {
            input: PathBuf::from("in"),
            output: PathBuf::from("out"),
            block_size,
            store,
            level: 6,
        }
    }

    #[test]
    fn chunks_by_block_size() {
        let data = vec![b'a'; 10_000];
        let container = encode(&data, &args(4096, false)).unwrap();
        assert_eq!(container.table.len(), 3);
        assert!(container.table.iter().all(|d| d.encoded_size < d.decoded_size));
    }

    #[test]
    fn store_flag_emits_stored_blocks() {
        let container = encode(b"plain text", &args(4, true)).unwrap();
        let mut decoder =
            BlteDecoder::new(container.bytes.as_slice(), &container.header_hash, true).unwrap();
        let tags: Vec<Option<u8>> = decoder
            .encoded_blocks()
            .unwrap()
            .map(|b| b.unwrap().tag())
            .collect();
        assert_eq!(tags, vec![Some(b'N'); 3]);
    }

    #[test]
    fn empty_input_still_produces_a_container() {
        let container = encode(b"", &args(4096, false)).unwrap();
        assert_eq!(container.table.len(), 1);
        assert_eq!(container.table.total_decoded_size(), 0);
    }

    #[test]
    fn writes_file_that_decodes_back() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.blte");
        let text = "line of text\n".repeat(500);
        fs::write(&input, &text).unwrap();

        let args = EncodeArgs {
            input,
            output: output.clone(),
            block_size: 1024,
            store: false,
            level: 9,
        };
        run(&args).unwrap();

        let bytes = fs::read(&output).unwrap();
        let hash = blte_decoder::checksum::header_checksum(&bytes).unwrap();
        let mut decoder = BlteDecoder::new(bytes.as_slice(), hash, true).unwrap();
        assert_eq!(decoder.decode_all().unwrap(), text.as_bytes());
    }
}
