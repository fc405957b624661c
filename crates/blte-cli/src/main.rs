/// BLTE command-line tool: inspect, validate, decode, and build BLTE
/// containers.
///
/// # Command overview
///
/// ```text
/// blte <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print the header and block table of a container
///   validate   Decode everything with checksum verification
///   decode     Write the concatenated decoded blocks
///   encode     Build a container from a plain file
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder progress to stderr
///   --hash <HEX>     Expected MD5 of the container header
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                         |
/// |------|-------------------------------------------------|
/// | 0    | Success                                         |
/// | 1    | Error (I/O failure, invalid container, etc.)    |
///
/// All error details and logs are written to stderr so stdout can be
/// piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The BLTE (block table encoded) container tool.
#[derive(Parser)]
#[command(name = "blte", version, about = "BLTE container CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log header parsing and per-block progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Expected MD5 of the container header, as hex (the content key a
    /// CDN index publishes for this file).
    #[arg(long, global = true, value_name = "HEX")]
    hash: Option<String>,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the header and block table of a BLTE container.
    Inspect(InspectArgs),
    /// Decode a container with checksum verification and report the result.
    Validate(ValidateArgs),
    /// Write the decoded content of a container to stdout or a file.
    Decode(DecodeArgs),
    /// Build a BLTE container from a plain file.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `blte inspect`.
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────────────────┐
/// │ Flag       │ Effect                                               │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ --show-hex │ Hex dump of each block's encoded bytes (tag first)   │
/// │ --block N  │ Show only the block at index N                       │
/// └────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the BLTE container.
    pub file: PathBuf,

    /// Show a hex dump of each block's encoded bytes (16 bytes per line).
    #[arg(long)]
    pub show_hex: bool,

    /// Inspect only the block at this zero-based index.
    #[arg(long)]
    pub block: Option<usize>,
}

/// Arguments for `blte validate`.
///
/// Verifies every block checksum and the decoded sizes. The header
/// checksum is compared only when `--hash` is given; otherwise it is
/// printed so it can be recorded.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the BLTE container.
    pub file: PathBuf,
}

/// Arguments for `blte decode`.
///
/// Streams the container block by block. Checksums are verified when
/// `--hash` is given.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the BLTE container.
    pub file: PathBuf,

    /// Write decoded bytes to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when a block decodes to a length other than its table entry.
    #[arg(long)]
    pub strict_sizes: bool,
}

/// Arguments for `blte encode`.
///
/// ```text
/// ┌──────────────┬────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                             │
/// ├──────────────┼────────────────────────────────────────────────────┤
/// │ --block-size │ Bytes of input per block (default 65536)           │
/// │ --store      │ Emit stored ('N') blocks instead of deflate ('Z')  │
/// │ --level      │ Deflate level 0-9 (default 6)                      │
/// └──────────────┴────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// File whose content becomes the container payload.
    pub input: PathBuf,

    /// Output container path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Bytes of input per block.
    #[arg(long, default_value_t = 65_536)]
    pub block_size: usize,

    /// Store blocks uncompressed.
    #[arg(long)]
    pub store: bool,

    /// Deflate compression level.
    #[arg(long, default_value_t = blte_encoder::compression::DEFAULT_COMPRESSION_LEVEL,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let hash = cli.hash.as_deref();
    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args, hash),
        Commands::Decode(args) => cmd_decode::run(&args, hash),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Install a stderr subscriber: `warn` by default, `debug` with
/// `--verbose`. `RUST_LOG` takes precedence over both.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
