//! Command-line access to maybe-path resolution
//!
//! Resolves key paths against a JSON document, a query string / form body
//! pair, or the process environment, and prints the value or a default.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use maybe_path::{Maybe, PathKey, Precedence, RequestSources, SourcesConfig, format_path, resolve_path};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(name = "maybe-path")]
#[command(about = "Resolve key paths in nested data without failing on missing keys")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Printed when the path resolves to nothing
    #[arg(short, long)]
    default: Option<String>,
    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,
    /// Suppress informational messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a key path in a JSON document
    Get {
        /// Keys to descend through; decimal integers address array positions
        keys: Vec<String>,
        /// JSON file to read (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Resolve a key path in request parameters
    Request {
        /// Keys to descend through
        keys: Vec<String>,
        /// URL-encoded query string
        #[arg(long, default_value = "")]
        query: String,
        /// URL-encoded form body
        #[arg(long, default_value = "")]
        form: String,
        /// Source consulted first: query or form
        #[arg(long)]
        prefer: Option<Precedence>,
        /// JSON file with source settings
        #[arg(long)]
        config: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Resolve a variable name in the process environment
    Env {
        /// Variable name
        keys: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Exit status when a value or default was printed
const EXIT_FOUND: i32 = 0;
/// Exit status when the path resolved to nothing and no default was given
const EXIT_ABSENT: i32 = 1;
/// Exit status for unreadable or malformed input
const EXIT_ERROR: i32 = 2;

/// Output of a resolved command
#[derive(Debug, PartialEq)]
struct Report {
    /// Line for stdout
    stdout: Option<String>,
    /// Informational line for stderr
    notice: Option<String>,
    code: i32,
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Get { keys, file, output } => handle_get(&keys, file.as_deref(), &output),
        Commands::Request {
            keys,
            query,
            form,
            prefer,
            config,
            output,
        } => handle_request(&keys, &query, &form, prefer, config.as_deref(), &output),
        Commands::Env { keys, output } => handle_env(&keys, &output),
    };

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(EXIT_ERROR);
        }
    };

    if let Some(text) = &report.stdout {
        println!("{text}");
    }
    if let Some(notice) = &report.notice {
        eprintln!("{notice}");
    }
    process::exit(report.code);
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn handle_get(tokens: &[String], file: Option<&str>, output: &OutputArgs) -> Result<Report> {
    let document = if let Some(filename) = file {
        fs::read_to_string(filename).with_context(|| format!("reading file '{filename}'"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading from stdin")?;
        buffer
    };

    resolve_document(tokens, &document, output)
}

fn resolve_document(tokens: &[String], document: &str, output: &OutputArgs) -> Result<Report> {
    let keys = PathKey::parse_all(tokens)?;
    let root: JsonValue = serde_json::from_str(document)
        .map_err(maybe_path::MaybeError::from)
        .context("parsing JSON document")?;

    emit(&keys, resolve_path(Some(&root), &keys), output)
}

fn handle_request(
    tokens: &[String],
    query: &str,
    form: &str,
    prefer: Option<Precedence>,
    config_file: Option<&str>,
    output: &OutputArgs,
) -> Result<Report> {
    let mut config = match config_file {
        Some(filename) => {
            let text = fs::read_to_string(filename)
                .with_context(|| format!("reading config '{filename}'"))?;
            SourcesConfig::from_json(&text).with_context(|| format!("parsing config '{filename}'"))?
        }
        None => SourcesConfig::default(),
    };
    if let Some(precedence) = prefer {
        config = config.with_precedence(precedence);
    }

    resolve_request(tokens, query, form, &config, output)
}

fn resolve_request(
    tokens: &[String],
    query: &str,
    form: &str,
    config: &SourcesConfig,
    output: &OutputArgs,
) -> Result<Report> {
    let keys = PathKey::parse_all(tokens)?;
    let sources = RequestSources::from_config(config, query, form)?;
    emit(&keys, sources.preferred(&keys), output)
}

fn handle_env(tokens: &[String], output: &OutputArgs) -> Result<Report> {
    let keys = PathKey::parse_all(tokens)?;
    let sources = RequestSources::new().with_environment();
    emit(&keys, sources.server(&keys), output)
}

fn emit(keys: &[PathKey], result: Maybe<JsonValue>, output: &OutputArgs) -> Result<Report> {
    let notice = |message: String| (!output.quiet).then_some(message);

    Ok(match (&result, output.default.as_deref()) {
        (Maybe::Present(_), _) => Report {
            stdout: Some(render(&result, output.pretty)?),
            notice: None,
            code: EXIT_FOUND,
        },
        (Maybe::Absent, Some(default)) => Report {
            stdout: Some(default.to_string()),
            notice: notice(format!("No value at '{}', printed default", format_path(keys))),
            code: EXIT_FOUND,
        },
        (Maybe::Absent, None) => Report {
            stdout: None,
            notice: notice(format!("No value at '{}'", format_path(keys))),
            code: EXIT_ABSENT,
        },
    })
}

fn render(result: &Maybe<JsonValue>, pretty: bool) -> Result<String> {
    Ok(match result {
        Maybe::Present(value @ (JsonValue::Array(_) | JsonValue::Object(_))) if pretty => {
            serde_json::to_string_pretty(value)?
        }
        _ => result.to_plain_text(),
    })
}
