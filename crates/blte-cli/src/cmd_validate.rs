/// Implementation of `blte validate`.
///
/// Decodes the whole container with verification on and the strict
/// decoded-size check enabled, then reports a series of success
/// checkmarks (`✓`) or the checks that passed followed by a diagnostic
/// failure line (`✗`). Exit code 1 on failure comes from the dispatcher
/// in `main.rs`.
///
/// # Success output
///
/// ```text
/// ✓ Header: valid (BLTE v0x0F, header_size=60)
/// ✓ Header checksum: 07096639212d77a64b3e839c31a1e13d matches
/// ✓ Blocks: 2 blocks, all checksums verified
/// ✓ Decode: 16 bytes, sizes match block table
/// ```
///
/// Without `--hash` the second line reads
/// `✓ Header checksum: <md5> (not compared, pass --hash to verify)`.
///
/// # Failure output
///
/// ```text
/// ✓ Header: valid (BLTE v0x0F, header_size=60)
/// ✗ Error [checksum]: block 1 checksum mismatch: table has 7b50…, computed 9e10…
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use blte_decoder::checksum::header_checksum;
use blte_decoder::{BlteDecoder, DecodeError, DecoderConfig, ErrorKind};

use crate::ValidateArgs;

/// Run the `blte validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any check fails.
pub fn run(args: &ValidateArgs, expected_hash: Option<&str>) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let report = validate(&bytes, expected_hash);
    for line in &report.lines {
        println!("{line}");
    }

    match report.error {
        None => Ok(()),
        Some(e) => {
            println!("✗ Error [{}]: {}", kind_label(e.kind()), diagnostic(&e));
            Err(anyhow!("validation failed"))
        }
    }
}

/// Checks that passed, and the error that stopped validation if any.
struct Report {
    lines: Vec<String>,
    error: Option<DecodeError>,
}

fn validate(bytes: &[u8], expected_hash: Option<&str>) -> Report {
    let mut lines = Vec::new();
    let error = run_checks(bytes, expected_hash, &mut lines).err();
    Report { lines, error }
}

fn run_checks(
    bytes: &[u8],
    expected_hash: Option<&str>,
    lines: &mut Vec<String>,
) -> Result<(), DecodeError> {
    let actual_hash = header_checksum(bytes).map_err(DecodeError::InvalidHeader)?;

    let config = DecoderConfig {
        verify: true,
        expected_hash: expected_hash.map(str::to_string),
        check_decoded_size: true,
        ..DecoderConfig::default()
    };

    // Header structure is checked before the checksum, so report it
    // separately from a checksum failure.
    let structural = BlteDecoder::with_config(bytes, DecoderConfig::default())?;
    let header = *structural.header();
    lines.push(format!(
        "✓ Header: valid (BLTE v{:#04X}, header_size={})",
        header.format_version, header.header_size
    ));

    let mut decoder = BlteDecoder::with_config(bytes, config)?;
    lines.push(match expected_hash {
        Some(_) => format!("✓ Header checksum: {actual_hash} matches"),
        None => format!("✓ Header checksum: {actual_hash} (not compared, pass --hash to verify)"),
    });

    let count = decoder.block_table().len();
    let mut decoded = 0usize;
    for block in decoder.blocks()? {
        decoded += block?.len();
    }

    lines.push(format!(
        "✓ Blocks: {count} block{}, all checksums verified",
        if count == 1 { "" } else { "s" }
    ));
    lines.push(format!("✓ Decode: {decoded} bytes, sizes match block table"));
    Ok(())
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Format => "format",
        ErrorKind::Checksum => "checksum",
        ErrorKind::Codec => "codec",
        ErrorKind::Usage => "usage",
        ErrorKind::Io => "io",
    }
}

/// Human-readable diagnostic for a `DecodeError`.
///
/// ```text
/// ┌────────────────────────┬──────────────────────────────────────────────┐
/// │ DecodeError variant    │ Diagnostic                                   │
/// ├────────────────────────┼──────────────────────────────────────────────┤
/// │ InvalidHeader          │ "invalid header: <inner error>"              │
/// │ HeaderChecksumMismatch │ "header checksum mismatch: expected, comp."  │
/// │ BlockChecksumMismatch  │ "block N checksum mismatch: table, computed" │
/// │ everything else        │ "<error Display>"                            │
/// └────────────────────────┴──────────────────────────────────────────────┘
/// ```
fn diagnostic(e: &DecodeError) -> String {
    match e {
        DecodeError::HeaderChecksumMismatch { expected, actual } => {
            format!("header checksum mismatch: expected {expected}, computed {actual}")
        }
        DecodeError::BlockChecksumMismatch {
            index,
            expected,
            actual,
        } => format!("block {index} checksum mismatch: table has {expected}, computed {actual}"),
        other => other.to_string(),
    }
}
