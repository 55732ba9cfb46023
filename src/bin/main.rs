//! Turtle / JSON-LD Conversion CLI
//!
//! Thin command-line wrapper around the conversion pipeline: one
//! subcommand per direction, reading from a file or stdin.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use turtle_jsonld::{compact_from_turtle, from_jsonld_to_turtle, ConvertError};

#[derive(Parser)]
#[command(name = "turtle-jsonld")]
#[command(about = "Convert between Turtle and JSON-LD RDF serializations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Turtle to a compacted JSON-LD document
    ToJsonld(ToJsonldArgs),
    /// Convert a JSON-LD document to Turtle
    ToTurtle(ToTurtleArgs),
}

#[derive(Args)]
struct ToJsonldArgs {
    /// Input Turtle file ("-" or omitted: stdin)
    input: Option<PathBuf>,

    /// JSON file with a context to compact against instead of the
    /// prefixes declared in the input
    #[arg(long)]
    context: Option<PathBuf>,

    /// Reorganize the output into a single tree rooted at this node id
    /// (matched against the compacted @id form)
    #[arg(long)]
    root: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ToTurtleArgs {
    /// Input JSON-LD file ("-" or omitted: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Read input from a file, or stdin when the path is "-" or absent
fn read_input(input: Option<&PathBuf>) -> Result<String, ConvertError> {
    match input {
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Write output to a file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), ConvertError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Wrote output to {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_to_jsonld(args: ToJsonldArgs) -> Result<(), ConvertError> {
    let turtle = read_input(args.input.as_ref())?;

    let explicit_context: Option<Value> = match &args.context {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };

    let doc = compact_from_turtle(
        &turtle,
        explicit_context.as_ref(),
        args.root.as_deref(),
    )?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    write_output(&rendered, args.output.as_ref())
}

fn run_to_turtle(args: ToTurtleArgs) -> Result<(), ConvertError> {
    let jsonld = read_input(args.input.as_ref())?;
    let turtle = from_jsonld_to_turtle(&jsonld)?;
    // the serializer already terminates its output with a newline
    match args.output.as_ref() {
        Some(path) => {
            fs::write(path, &turtle)?;
            eprintln!("Wrote output to {}", path.display());
        }
        None => print!("{}", turtle),
    }
    Ok(())
}

fn main() {
    // Log to stderr so piped output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ToJsonld(args) => run_to_jsonld(args),
        Commands::ToTurtle(args) => run_to_turtle(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
