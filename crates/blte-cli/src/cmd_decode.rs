/// Implementation of `blte decode`.
///
/// Streams the container from disk one block at a time and writes each
/// decoded block to stdout or to `-o <file>` as soon as it is produced,
/// so memory use is bounded by the largest block rather than the file.
///
/// ```text
/// ┌────────────────┬────────────────────────────────────────────────────┐
/// │ Option         │ Effect                                             │
/// ├────────────────┼────────────────────────────────────────────────────┤
/// │ --hash HEX     │ Verify the header and every block checksum         │
/// │ --strict-sizes │ Fail on decoded length != table's decoded_size     │
/// │ -o / --output  │ Write to a file instead of stdout                  │
/// └────────────────┴────────────────────────────────────────────────────┘
/// ```
///
/// Output already written is not rolled back when a later block fails.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use blte_decoder::{BlteDecoder, DecoderConfig};
use tracing::debug;

use crate::DecodeArgs;

/// Run the `blte decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened, any block fails to
/// read, verify, or decode, or the output cannot be written.
pub fn run(args: &DecodeArgs, expected_hash: Option<&str>) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let config = config_for(expected_hash, args.strict_sizes);

    let written = if let Some(path) = &args.output {
        let out = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        let written = decode_into(BufReader::new(file), config, BufWriter::new(out))
            .with_context(|| format!("failed to decode {}", args.file.display()))?;
        debug!(path = %path.display(), "wrote decoded output");
        written
    } else {
        let stdout = io::stdout();
        decode_into(BufReader::new(file), config, stdout.lock())
            .with_context(|| format!("failed to decode {}", args.file.display()))?
    };

    debug!(bytes = written, "decode finished");
    Ok(())
}

fn config_for(expected_hash: Option<&str>, strict_sizes: bool) -> DecoderConfig {
    DecoderConfig {
        verify: expected_hash.is_some(),
        expected_hash: expected_hash.map(str::to_string),
        check_decoded_size: strict_sizes,
        ..DecoderConfig::default()
    }
}

/// Decode every block from `reader` into `out`. Returns bytes written.
fn decode_into<R: Read, W: Write>(reader: R, config: DecoderConfig, mut out: W) -> Result<usize> {
    let mut decoder = BlteDecoder::with_config(reader, config)?;
    let mut written = 0;

    for block in decoder.blocks()? {
        let block = block?;
        out.write_all(&block).context("cannot write decoded output")?;
        written += block.len();
    }

    out.flush().context("cannot flush decoded output")?;
    Ok(written)
}

/// Whole-file variant used by tests.
#[cfg(test)]
fn decode_file(path: &std::path::Path, expected_hash: Option<&str>) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    let mut out = Vec::new();
    decode_into(bytes.as_slice(), config_for(expected_hash, true), &mut out)?;
    Ok(out)
}
