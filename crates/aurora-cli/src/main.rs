mod diagnostic;

use std::path::Path;

use aurora_lexer::{Token, Tokenizer};
use aurora_parser::{ParseError, ParseOptions};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::diagnostic::ParseDiagnostic;

#[derive(Parser)]
#[command(name = "aurora")]
#[command(about = "Aurora language front end: tokenize and parse source files")]
#[command(version)]
struct Cli {
    /// Name used for the source in diagnostics (defaults to the path)
    #[arg(long, global = true)]
    source_id: Option<String>,

    /// Characters that form single-character punctuation tokens
    #[arg(long, global = true)]
    punctuation: Option<String>,

    /// How failures are reported on stderr
    #[arg(long, global = true, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of an .aurora file, one per line
    Tokens {
        /// Input .aurora file
        path: String,

        /// Leave whitespace tokens out of the listing
        #[arg(long)]
        skip_whitespace: bool,
    },

    /// Parse an .aurora file and print its syntax tree as JSON
    Parse {
        /// Input .aurora file
        path: String,

        /// Print the document on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Check an .aurora file for errors without printing the tree
    Check {
        /// Input .aurora file
        path: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    /// Source snippet with the failing rule chain
    Human,
    /// One JSON object per failure
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Tokens {
            path,
            skip_whitespace,
        } => cmd_tokens(&cli, path, *skip_whitespace),
        Command::Parse { path, compact } => cmd_parse(&cli, path, *compact),
        Command::Check { path } => cmd_check(&cli, path),
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "aurora_lexer=debug,aurora_parser=debug",
        _ => "aurora_lexer=trace,aurora_parser=trace",
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => {
            debug!(path, chars = source.chars().count(), "read source");
            source
        }
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn options_for(cli: &Cli, path: &str) -> ParseOptions {
    let source_id = cli.source_id.clone().unwrap_or_else(|| path.to_string());
    let options = ParseOptions::new().with_source_id(source_id);
    match &cli.punctuation {
        Some(punctuation) => options.with_punctuation(punctuation.clone()),
        None => options,
    }
}

fn report(err: &ParseError, source: String, format: ErrorFormat) -> ! {
    match format {
        ErrorFormat::Human => {
            let report = miette::Report::new(ParseDiagnostic::new(err, source));
            eprintln!("{report:?}");
        }
        ErrorFormat::Json => match serde_json::to_string(err) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => eprintln!("Error: {err} ({e})"),
        },
    }
    std::process::exit(1);
}

/// `identifier  "name"  1:5`
fn format_token(token: &Token) -> String {
    format!(
        "{:<12} {:?} {}:{}",
        token.token_type().to_string(),
        token.raw,
        token.span.line,
        token.span.column
    )
}

fn cmd_tokens(cli: &Cli, path: &str, skip_whitespace: bool) {
    let source = read_source(path);
    let options = options_for(cli, path);

    let tokens = match Tokenizer::tokenize_with(&source, &options) {
        Ok(tokens) => tokens,
        Err(e) => report(&ParseError::from(e), source, cli.error_format),
    };

    for token in tokens
        .iter()
        .filter(|token| !(skip_whitespace && token.is_whitespace()))
    {
        println!("{}", format_token(token));
    }
}

fn cmd_parse(cli: &Cli, path: &str, compact: bool) {
    let source = read_source(path);
    let options = options_for(cli, path);

    let program = match aurora_parser::parse_with(&source, &options) {
        Ok(program) => program,
        Err(e) => report(&e, source, cli.error_format),
    };

    match aurora_parser::to_json_string(&program, !compact) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(cli: &Cli, path: &str) {
    let source = read_source(path);
    let options = options_for(cli, path);

    if let Err(e) = aurora_parser::parse_with(&source, &options) {
        report(&e, source, cli.error_format);
    }

    eprintln!("OK: {path}");
}
