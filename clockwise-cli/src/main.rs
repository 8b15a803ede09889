use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clockwise_core::compiler::{dump_tokens, format_units};
use clockwise_core::sources::load_sources;
use clockwise_core::{CompileOptions, CoreError, TypeMode, compile_units};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Compile Clockwise sources to a single Go file.
#[derive(Parser, Debug)]
#[command(name = "cw", version, about, long_about = None)]
struct Cli {
    #[arg(
        value_name = "INPUTS",
        help = "Source files or directories of .cw files (reads stdin when omitted)"
    )]
    inputs: Vec<PathBuf>,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "go",
        help = "Output format: go, fmt, tokens"
    )]
    emit: String,

    #[arg(
        long,
        help = "Resolve identifier and call types instead of treating them as int"
    )]
    resolve_types: bool,

    #[arg(long, help = "Skip literal constant folding")]
    no_fold: bool,

    #[arg(short, long, help = "Log pipeline stages to stderr")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let sources = read_inputs(&cli.inputs)?;
    let units: Vec<&str> = sources.iter().map(String::as_str).collect();
    debug!(units = units.len(), emit = %cli.emit, "read inputs");

    match cli.emit.as_str() {
        "go" => {
            let options = CompileOptions {
                type_mode: if cli.resolve_types {
                    TypeMode::Resolved
                } else {
                    TypeMode::Literal
                },
                fold_constants: !cli.no_fold,
            };
            let artifact = compile_units(&units, &options)?;
            for warning in &artifact.warnings {
                eprintln!("warning: {warning}");
            }
            write_output(&cli.output, artifact.go_source.as_bytes())?;
        }
        "fmt" => {
            let text = format_units(&units)?;
            write_output(&cli.output, text.as_bytes())?;
        }
        "tokens" => {
            let dump: String = units.iter().map(|unit| dump_tokens(unit)).collect();
            write_output(&cli.output, dump.as_bytes())?;
        }
        other => return Err(CoreError::UnsupportedFormat(other.to_string()).into()),
    }

    Ok(())
}

fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<String>> {
    if inputs.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read source from stdin")?;
        return Ok(vec![buffer]);
    }

    let mut sources = Vec::new();
    for path in inputs {
        if path.is_dir() {
            let files = load_sources(path)?;
            sources.extend(files.into_iter().map(|file| file.contents));
        } else {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            sources.push(source);
        }
    }
    Ok(sources)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}
