use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use optlayer_core::{Diagnostics, ResolutionReport, Schema, parse, validate_schema};
use optlayer_fs::{FsEnvironment, load_schema};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for reports.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optlayer")]
#[command(version, about = "Check option schemas and resolve layered command-line options")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an option schema file.
    Check(CheckArgs),
    /// Resolve arguments against a schema, its configuration modules, and defaults.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Working directory for configuration modules, files, and globs
    /// (default: current directory).
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to resolve, given after `--`.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    schema: String,
    options: usize,
    diagnostics: Diagnostics,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Resolve(args) => run_resolve(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let schema = read_schema(&args.schema)?;
    let diagnostics = validate_schema(&schema);

    let output = CheckOutput {
        schema: args.schema.display().to_string(),
        options: schema.len(),
        diagnostics,
    };
    println!("{}", render(&output, args.format)?);

    fail_on_diagnostics(&output.diagnostics)
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let schema = read_schema(&args.schema)?;
    let cwd = match args.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().map_err(|err| format!("Failed to read current directory: {err}"))?,
    };
    let cwd = std::fs::canonicalize(&cwd)
        .map_err(|err| format!("Failed to resolve working directory '{}': {err}", cwd.display()))?;
    tracing::debug!(cwd = %cwd.display(), args = args.argv.len(), "resolving");

    let env = Arc::new(FsEnvironment::new(cwd));
    let state = parse(args.argv, schema, env).map_err(|err| err.to_string())?;
    let report = ResolutionReport::from_state(&state);
    println!("{}", render(&report, args.format)?);

    fail_on_diagnostics(&report.diagnostics)
}

fn read_schema(path: &Path) -> Result<Schema, String> {
    load_schema(path).map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))
        }
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("Failed to serialize output: {e}"))
        }
    }
}

fn fail_on_diagnostics(diagnostics: &Diagnostics) -> Result<(), String> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    for diagnostic in diagnostics {
        eprintln!("{}: {}", diagnostic.code, diagnostic.message);
    }
    Err(format!("{} diagnostic(s) reported", diagnostics.len()))
}
