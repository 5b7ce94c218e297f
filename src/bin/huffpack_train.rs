use clap::Parser;
use huffpack::{
    io_utils::{huffpack_cli_error, init_logging, io_cli_error, read_lines},
    CharacterCodec, CodecConfig, Codebook, ListCodec, StringCodec, StringPool,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Train a list codebook from sample strings.
#[derive(Parser)]
struct Args {
    /// Training samples, one string per line
    samples: PathBuf,
    /// Output codebook path
    output: PathBuf,
    /// JSON object of string -> count used as the vocabulary instead of the samples
    #[arg(long)]
    frequencies: Option<PathBuf>,
    /// JSON codec configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Longest code any symbol may receive
    #[arg(long)]
    max_length: Option<u8>,
    /// Shortest code any symbol may receive
    #[arg(long)]
    min_length: Option<u8>,
    /// Also export the codebook as JSON
    #[arg(long)]
    json: Option<PathBuf>,
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

    let mut config = match &args.config {
        Some(path) => CodecConfig::from_json_file(path)
            .map_err(|e| huffpack_cli_error("loading config", e))?,
        None => CodecConfig::default(),
    };
    if let Some(max) = args.max_length {
        config.maximum_length = max;
    }
    if let Some(min) = args.min_length {
        config.minimum_length = min;
    }

    let samples = read_lines(&args.samples)?;
    let chars = Arc::new(
        CharacterCodec::train(&samples, &config)
            .map_err(|e| huffpack_cli_error("training characters", e))?,
    );

    let strings = match &args.frequencies {
        Some(path) => {
            let text =
                fs::read_to_string(path).map_err(|e| io_cli_error("reading frequencies", path, e))?;
            let freqs: BTreeMap<String, u64> = serde_json::from_str(&text)?;
            StringCodec::from_frequencies(freqs, chars, &config)
        }
        None => StringCodec::train(&samples, &mut StringPool::new(), chars, &config),
    }
    .map_err(|e| huffpack_cli_error("training strings", e))?;

    let codec = ListCodec::new(Arc::new(strings));
    let book = Codebook::from_list_codec(&codec);
    book.save(&args.output)
        .map_err(|e| huffpack_cli_error("writing codebook", e))?;
    if let Some(path) = &args.json {
        let json = book.to_json()?;
        fs::write(path, json).map_err(|e| io_cli_error("writing json", path, e))?;
    }

    info!(
        samples = samples.len(),
        characters = book.characters.entries.len(),
        strings = book.strings.entries.len(),
        output = %args.output.display(),
        "codebook written"
    );
    Ok(())
}
