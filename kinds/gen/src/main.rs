//! Kinds Code Generator
//!
//! Generates typed Rust resources, controllers and a client from resource
//! schema documents.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use kinds_define::Schemas;
use kinds_gen::config::{CONFIG_FILE, SOURCE_TREE_ENV};
use kinds_gen::{Generator, GeneratorConfig, GeneratorError, Report};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Generate Rust types, controllers and a client from resource schemas
#[derive(Parser, Debug)]
#[command(name = "kinds-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema document (.json, .yaml or .yml)
    #[arg(short, long, value_name = "FILE")]
    schemas: PathBuf,

    /// Configuration file (defaults to ./kinds.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base source tree the packages are resolved against
    #[arg(long, env = SOURCE_TREE_ENV, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Package receiving type artifacts and the client
    #[arg(long, value_name = "PATH")]
    type_package: Option<String>,

    /// Package receiving controller artifacts
    #[arg(long, value_name = "PATH")]
    controller_package: Option<String>,

    /// Reserved file name prefix for generated files (lowercase)
    #[arg(long)]
    prefix: Option<String>,

    /// Rust path of the type package imported by controllers (e.g. crate::types)
    #[arg(long, value_name = "PATH")]
    type_module: Option<String>,

    /// Fail on type names missing from the registry
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initialize tracing subscriber based on verbosity level.
///
/// `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,kinds_gen=info".to_string(),
            2 => "info,kinds_gen=debug,kinds_define=debug".to_string(),
            _ => "debug,kinds_gen=trace,kinds_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Defaults, then the config file, then flags.
fn resolve_config(cli: &Cli) -> Result<GeneratorConfig, GeneratorError> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None if PathBuf::from(CONFIG_FILE).is_file() => {
            GeneratorConfig::load(&PathBuf::from(CONFIG_FILE))?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(base_dir) = &cli.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(package) = &cli.type_package {
        config.type_package = package.clone();
    }
    if let Some(package) = &cli.controller_package {
        config.controller_package = package.clone();
    }
    if let Some(prefix) = &cli.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(module) = &cli.type_module {
        config.type_module = Some(module.clone());
    }
    if cli.strict {
        config.strict_references = true;
    }

    Ok(config)
}

fn print_summary(report: &Report) {
    eprintln!(
        "{} {} schemas, {} controllers, {} files",
        "Generated".green().bold(),
        report.generated.len(),
        report.controllers.len(),
        report.files.len()
    );

    if !report.skipped.is_empty() {
        eprintln!("  {} {}", "skipped:".dimmed(), report.skipped.join(", "));
    }

    for (schema, name) in &report.degraded {
        eprintln!(
            "  {} '{}' in schema '{}' is not defined; assumed '{}'",
            "warning:".yellow().bold(),
            name,
            schema,
            kinds_define::naming::capitalize(name)
        );
    }
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    let registry = Schemas::load(&cli.schemas)?;

    if cli.verbose > 1 {
        eprintln!("Loaded {} schemas from {}", registry.len(), cli.schemas.display());
    }

    let report = Generator::new(config).run(&registry)?;
    print_summary(&report);

    Ok(())
}
