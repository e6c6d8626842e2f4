//! Extract form fields from a PDF and print them as JSON
//!
//! Usage:
//!   pdf-formscan form.pdf
//!   pdf-formscan form.pdf --config formscan.json --pretty
//!
//! Set RUST_LOG=debug to see per-page decisions.

use pdf_formscan::{ExtractionConfig, ExtractionStatus, FormFieldExtractor};
use std::path::PathBuf;

struct CliArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    pretty: bool,
}

impl CliArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut config = None;
        let mut pretty = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    i += 1;
                    match args.get(i) {
                        Some(path) => config = Some(PathBuf::from(path)),
                        None => return Err("--config needs a file path".to_string()),
                    }
                },
                "--pretty" | "-p" => {
                    pretty = true;
                },
                "--help" | "-h" => {
                    return Err(String::new());
                },
                other if other.starts_with('-') => {
                    return Err(format!("unknown option {}", other));
                },
                other => {
                    if input.is_some() {
                        return Err(format!("unexpected argument {}", other));
                    }
                    input = Some(PathBuf::from(other));
                },
            }
            i += 1;
        }

        let input = input.ok_or_else(|| "missing input PDF".to_string())?;
        Ok(Self {
            input,
            config,
            pretty,
        })
    }
}

fn usage() {
    eprintln!("Usage: pdf-formscan <file.pdf> [--config cfg.json] [--pretty]");
}

fn main() {
    env_logger::init();

    let args = match CliArgs::from_args() {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
            }
            usage();
            std::process::exit(2);
        },
    };

    let config = match &args.config {
        Some(path) => match ExtractionConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(2);
            },
        },
        None => ExtractionConfig::default(),
    };

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.input.display(), e);
            std::process::exit(1);
        },
    };

    let extractor = FormFieldExtractor::new(config);
    let report = match extractor.extract_with_status(&bytes) {
        ExtractionStatus::Success(report) => report,
        status => {
            eprintln!("{}", status.user_message().unwrap_or("Failed to process the document"));
            std::process::exit(1);
        },
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize fields: {}", e);
            std::process::exit(1);
        },
    }
}
