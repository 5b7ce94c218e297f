use clap::Parser;
use huffpack::{
    io_utils::{huffpack_cli_error, init_logging, io_cli_error, simple_cli_error},
    decode_from_bits, BitArray, Codebook,
};
use std::fs;
use std::path::PathBuf;

/// Decode strings packed by huffpack_encode.
#[derive(Parser)]
struct Args {
    /// Codebook used for encoding
    codebook: PathBuf,
    /// Packed input
    input: PathBuf,
    /// Output text, one string per line
    output: PathBuf,
    /// Number of strings to decode; all of them when omitted
    #[arg(long)]
    count: Option<usize>,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let codec = Codebook::load(&args.codebook)
        .and_then(|book| book.to_list_codec())
        .map_err(|e| huffpack_cli_error("loading codebook", e))?;
    let data = fs::read(&args.input).map_err(|e| io_cli_error("reading input", &args.input, e))?;
    let mut bits =
        BitArray::from_framed_bytes(data).map_err(|e| huffpack_cli_error("reading input", e))?;

    let strings = decode_from_bits(&codec, &mut bits, args.count)
        .map_err(|e| huffpack_cli_error("decoding", e))?;
    if let Some(expected) = args.count {
        if strings.len() < expected {
            return Err(simple_cli_error(&format!(
                "input holds {} strings, {} requested",
                strings.len(),
                expected
            ))
            .into());
        }
    }

    let mut text = strings.join("\n");
    if !strings.is_empty() {
        text.push('\n');
    }
    fs::write(&args.output, text).map_err(|e| io_cli_error("writing output", &args.output, e))?;
    Ok(())
}
