use clap::Parser;
use huffpack::{
    io_utils::{huffpack_cli_error, init_logging, io_cli_error},
    CharSymbol, Codebook, StringSymbol,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Print or export the code tables of a codebook.
#[derive(Parser)]
struct Args {
    /// Codebook written by huffpack_train
    codebook: PathBuf,
    /// Write rows as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write rows as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct Row {
    table: &'static str,
    symbol: String,
    length: u8,
    code: String,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn char_label(symbol: &CharSymbol) -> String {
    match symbol {
        CharSymbol::Char(c) => c.escape_debug().to_string(),
        CharSymbol::Escape => "<ESCAPE>".into(),
        CharSymbol::EndOfString => "<END_OF_STRING>".into(),
    }
}

fn string_label(symbol: &StringSymbol) -> String {
    match symbol {
        StringSymbol::Word(w) => w.escape_debug().to_string(),
        StringSymbol::Escape => "<ESCAPE>".into(),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let book = Codebook::load(&args.codebook)
        .map_err(|e| huffpack_cli_error("loading codebook", e))?;
    let chars = book
        .characters
        .to_table()
        .map_err(|e| huffpack_cli_error("rebuilding character table", e))?;
    let strings = book
        .strings
        .to_table()
        .map_err(|e| huffpack_cli_error("rebuilding string table", e))?;

    let mut rows: Vec<Row> = chars
        .iter()
        .map(|(symbol, code)| Row {
            table: "character",
            symbol: char_label(symbol),
            length: code.length,
            code: code.to_string(),
        })
        .collect();
    rows.extend(strings.iter().map(|(symbol, code)| Row {
        table: "string",
        symbol: string_label(symbol),
        length: code.length,
        code: code.to_string(),
    }));

    if let Some(path) = &args.csv {
        let file = File::create(path).map_err(|e| io_cli_error("creating csv", path, e))?;
        let mut wtr = csv::Writer::from_writer(file);
        for row in &rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    }
    if let Some(path) = &args.json {
        let file = File::create(path).map_err(|e| io_cli_error("creating json", path, e))?;
        serde_json::to_writer_pretty(file, &rows)?;
    }
    if args.csv.is_none() && args.json.is_none() {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for row in &rows {
            writeln!(out, "{:<9} {:>3} {:<24} {}", row.table, row.length, row.code, row.symbol)?;
        }
    }
    Ok(())
}
