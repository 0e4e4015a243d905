//! Command-line decoder for protocol buffer payloads.
//!
//! ```bash
//! # Decode a raw payload file
//! protospan payload.bin
//!
//! # Decode hex text, listing every interpretation of each field
//! protospan --hex --all-types payload.hex
//!
//! # Decode 12 bytes starting at offset 5 with options from a file
//! protospan --options decode.toml --offset 5 --length 12 capture.bin
//! ```

use anyhow::Context;
use clap::Parser;
use protospan::schema::Schemaless;
use protospan::{DecodeOptions, Decoder};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protospan")]
#[command(about = "Decode protocol buffer payloads without a schema")]
#[command(long_about = None)]
struct Cli
{
    /// Payload file
    input: PathBuf,

    /// The input file holds hex text instead of raw bytes
    #[arg(long)]
    hex: bool,

    /// TOML file with decode options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Display bytes fields as strings
    #[arg(long)]
    bytes_as_string: bool,

    /// Guess length-delimited fields to be strings
    #[arg(long)]
    guess_string: bool,

    /// List every type each field could be
    #[arg(long)]
    all_types: bool,

    /// Offset of the message in the payload
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Length of the message (default: rest of the payload)
    #[arg(long)]
    length: Option<usize>,

    /// Log decoding details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()>
{
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        true => "debug",
        false => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = match &cli.options {
        Some(path) => DecodeOptions::from_file(path)?,
        None => DecodeOptions::default(),
    };
    // Flags only ever switch options on.
    options.treat_bytes_as_string |= cli.bytes_as_string;
    options.guess_unknown_as_string |= cli.guess_string;
    options.show_all_candidate_types |= cli.all_types;

    let content = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let data = match cli.hex {
        true => {
            let text: String = String::from_utf8(content)
                .context("Hex input is not text")?
                .split_whitespace()
                .collect();
            hex::decode(text).context("Invalid hex input")?
        }
        false => content,
    };
    let data = bytes::Bytes::from(data);

    let length = cli
        .length
        .unwrap_or_else(|| data.len().saturating_sub(cli.offset));
    tracing::debug!(bytes = data.len(), offset = cli.offset, length, "Decoding payload");

    let msg = Decoder::new(options).decode_window::<Schemaless>(&data, cli.offset, length, None);
    print!("{}", msg);

    Ok(())
}
