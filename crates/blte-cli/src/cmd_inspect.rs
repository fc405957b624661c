/// Implementation of `blte inspect`.
///
/// Reads a container, prints its header and block table, and reads each
/// block's encoded bytes (without decoding or verifying them) to report
/// the encoding tag. With `--block N` only that block is shown.
///
/// # Output format
///
/// ```text
/// Header: BLTE v0x0F, header_size=60, 2 blocks
/// Header MD5: 07096639212d77a64b3e839c31a1e13d
/// Block 0: [N stored] encoded=5 decoded=4 md5=7b50a09215f4ac9115eea8d49a6d3985
/// Block 1: [Z deflate] encoded=15 decoded=12 md5=...
/// ---
/// Payload: 20 bytes encoded, 16 bytes decoded
/// ```
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use blte_decoder::checksum::header_checksum;
use blte_decoder::{BlteDecoder, DecoderConfig, EncodedBlock};

use crate::InspectArgs;

/// Run the `blte inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header is invalid,
/// the stream ends inside a block, or `--block` is out of range.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let report = render(&bytes, args.show_hex, args.block)
        .with_context(|| format!("failed to inspect {}", args.file.display()))?;
    print!("{report}");
    Ok(())
}

/// Build the inspect report for an in-memory container.
fn render(bytes: &[u8], show_hex: bool, only: Option<usize>) -> Result<String> {
    let header_hash = header_checksum(bytes)?;
    let mut decoder = BlteDecoder::with_config(bytes, DecoderConfig::default())?;

    let header = *decoder.header();
    let table = decoder.block_table().clone();
    if let Some(target) = only
        && target >= table.len()
    {
        bail!("block {target} out of range ({} blocks)", table.len());
    }

    let mut out = String::new();
    writeln!(
        out,
        "Header: BLTE v{:#04X}, header_size={}, {} block{}",
        header.format_version,
        header.header_size,
        table.len(),
        if table.len() == 1 { "" } else { "s" }
    )?;
    writeln!(out, "Header MD5: {header_hash}")?;

    for block in decoder.encoded_blocks()? {
        let block = block?;
        if only.is_some_and(|target| target != block.index) {
            continue;
        }

        writeln!(
            out,
            "Block {}: [{}] encoded={} decoded={} md5={}",
            block.index,
            encoding_label(&block),
            block.descriptor.encoded_size,
            block.descriptor.decoded_size,
            block.descriptor.checksum_hex()
        )?;

        if show_hex {
            out.push_str("         Hex dump:\n");
            hex_dump(&mut out, &block.data)?;
        }
    }

    out.push_str("---\n");
    writeln!(
        out,
        "Payload: {} bytes encoded, {} bytes decoded",
        table.total_encoded_size(),
        table.total_decoded_size()
    )?;

    Ok(out)
}

/// `N stored`, `Z deflate`, or the raw tag for anything unrecognised.
fn encoding_label(block: &EncodedBlock) -> String {
    match (block.tag(), block.encoding()) {
        (Some(tag), Some(encoding)) => format!("{} {}", tag as char, encoding.name()),
        (Some(tag), None) => format!("{tag:#04X} unknown"),
        (None, _) => "empty".to_string(),
    }
}

fn hex_dump(out: &mut String, raw: &[u8]) -> std::fmt::Result {
    for (i, chunk) in raw.chunks(16).enumerate() {
        let offset = i * 16;
        let hex = chunk
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        writeln!(out, "           {offset:04x}  {hex:<48}  {ascii}")?;
    }
    Ok(())
}
