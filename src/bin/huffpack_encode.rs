use clap::Parser;
use huffpack::{
    io_utils::{huffpack_cli_error, init_logging, io_cli_error, read_lines},
    CodecStats, Codebook,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Encode one string per line with a trained codebook.
#[derive(Parser)]
struct Args {
    /// Codebook written by huffpack_train
    codebook: PathBuf,
    /// Input text, one string per line
    input: PathBuf,
    /// Output path: bit-length header followed by the packed bits
    output: PathBuf,
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
    let start = Instant::now();

    let stats = Arc::new(CodecStats::new());
    let codec = Codebook::load(&args.codebook)
        .and_then(|book| book.to_observed_list_codec(stats.clone()))
        .map_err(|e| huffpack_cli_error("loading codebook", e))?;
    let lines = read_lines(&args.input)?;

    let bits = codec
        .encode_list(&lines)
        .map_err(|e| huffpack_cli_error("encoding", e))?;
    let bit_len = bits.len_bits();
    let bytes = bits.to_framed_bytes();
    fs::write(&args.output, &bytes).map_err(|e| io_cli_error("writing output", &args.output, e))?;

    stats.report();
    let escaped = stats.snapshot().escapes_encoded;
    let raw_len: usize = lines.iter().map(|l| l.len() + 1).sum();
    let summary = serde_json::json!({
        "strings": lines.len(),
        "bits": bit_len,
        "bytes": bytes.len(),
        "escapes": escaped,
        "input_bytes": raw_len,
        "elapsed_ms": start.elapsed().as_millis() as u64,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
