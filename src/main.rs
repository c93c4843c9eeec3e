//! csv-scribe CLI - rewrite CSV files in a configurable dialect

use clap::Parser;
use csv_scribe::{Quote, Writer, WriterBuilder, decode_to_utf8};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Rewrite CSV files using a custom delimiter, quote character and line terminator.
///
/// Reads standard comma separated input and writes every record back out in
/// the requested dialect.
#[derive(Parser, Debug)]
#[command(name = "csv-scribe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV file(s); reads stdin when omitted or for "-"
    files: Vec<PathBuf>,

    /// Delimiter of the input (single ASCII character)
    #[arg(long, default_value = ",", value_parser = parse_input_delimiter)]
    input_delimiter: u8,

    /// Output delimiter (single character)
    #[arg(short = 'd', long, default_value = ",")]
    delimiter: char,

    /// Output quote character (single character, or 'none')
    #[arg(short = 'q', long, default_value = "\"")]
    quote: String,

    /// Quote every output field
    #[arg(short = 'a', long)]
    always_quote: bool,

    /// End output records with \r\n instead of \n
    #[arg(long)]
    crlf: bool,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error creating {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    let mut writer = match build_writer(&args, sink) {
        Ok(writer) => writer,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut exit_code = ExitCode::SUCCESS;

    let stdin = [PathBuf::from("-")];
    let files = if args.files.is_empty() {
        &stdin[..]
    } else {
        &args.files[..]
    };

    for file in files {
        if let Err(e) = rewrite_file(file, &args, &mut writer) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
            // A latched sink failure will fail every remaining file too
            if writer.error().is_some() {
                break;
            }
        }
    }

    if let Err(e) = writer.flush() {
        eprintln!("Error writing output: {e}");
        exit_code = ExitCode::FAILURE;
    }

    exit_code
}

fn parse_input_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("expected a single ASCII character, got {s:?}")),
    }
}

fn build_writer<W: Write>(args: &Args, sink: W) -> csv_scribe::Result<Writer<W>> {
    let quote = if args.quote.eq_ignore_ascii_case("none") {
        Quote::None
    } else {
        let mut chars = args.quote.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Quote::Some(c),
            _ => {
                return Err(csv_scribe::EncodeError::InvalidConfig(format!(
                    "quote must be a single character or 'none', got {:?}",
                    args.quote
                )));
            }
        }
    };

    WriterBuilder::new()
        .delimiter(args.delimiter)
        .quote(quote)
        .always_quote(args.always_quote)
        .use_crlf(args.crlf)
        .build(sink)
}

fn rewrite_file<W: Write>(
    path: &Path,
    args: &Args,
    writer: &mut Writer<W>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut data = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        File::open(path)?.read_to_end(&mut data)?;
    }

    let decoded = decode_to_utf8(&data);
    if decoded.was_transcoded() {
        tracing::info!(
            file = %path.display(),
            encoding = decoded.encoding.name(),
            "transcoded input to utf-8"
        );
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(args.input_delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(decoded.text.as_bytes());

    let mut records = 0usize;
    for record in reader.records() {
        writer.write_record(&record?)?;
        records += 1;
    }

    tracing::debug!(file = %path.display(), records, "rewrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_delimiter_must_be_ascii() {
        assert_eq!(parse_input_delimiter(";"), Ok(b';'));
        assert_eq!(parse_input_delimiter("\t"), Ok(b'\t'));
        assert!(parse_input_delimiter("¦").is_err());
        assert!(parse_input_delimiter(";;").is_err());
        assert!(parse_input_delimiter("").is_err());
    }

    #[test]
    fn test_bad_input_delimiter_rejected_before_any_file() {
        let result =
            Args::try_parse_from(["csv-scribe", "--input-delimiter", "¦", "a.csv", "b.csv"]);
        assert!(result.is_err());

        let args =
            Args::try_parse_from(["csv-scribe", "--input-delimiter", "|", "a.csv"]).unwrap();
        assert_eq!(args.input_delimiter, b'|');
    }

    #[test]
    fn test_build_writer_quote_parsing() {
        let args = Args::try_parse_from(["csv-scribe", "-q", "none", "-d", ";"]).unwrap();
        let writer = build_writer(&args, Vec::new()).unwrap();
        assert_eq!(writer.dialect().quote, Quote::None);
        assert_eq!(writer.dialect().delimiter, ';');

        let args = Args::try_parse_from(["csv-scribe", "-q", "ab"]).unwrap();
        assert!(build_writer(&args, Vec::new()).is_err());
    }
}
