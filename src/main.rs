//! combinefn CLI - validate combine candidates described in a manifest.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use combinefn::core::error::CandidateOutcome;
use combinefn::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable verdicts and diagnostics
    Text,
    /// The full validation report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "combinefn")]
#[command(about = "Validate combine-function candidates", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every candidate in a manifest
    Check {
        /// Path to the TOML manifest
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Validate candidates one at a time
        #[arg(long)]
        sequential: bool,

        /// Maximum worker threads (overrides the manifest)
        #[arg(long, env = "COMBINEFN_THREADS")]
        threads: Option<usize>,
    },

    /// List the validation rules
    Rules,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            manifest,
            format,
            sequential,
            threads,
        } => check(&manifest, format, sequential, threads),
        Commands::Rules => {
            print_rules();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn check(manifest: &Path, format: OutputFormat, sequential: bool, threads: Option<usize>) -> Result<ExitCode> {
    let loaded = load_manifest(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

    let mut options = loaded.options.clone();
    if sequential {
        options.parallel = false;
    }
    if let Some(threads) = threads {
        options.max_threads = threads;
    }
    log::debug!("Validating with {:?}", options);

    let report = Validator::new(options).report(&loaded.candidates);

    match format {
        OutputFormat::Json => println!("{}", report.to_json().context("Failed to serialize report")?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &ValidationReport) {
    for outcome in &report.outcomes {
        match outcome {
            CandidateOutcome::Valid { descriptor } => {
                println!(
                    "✓ {} ({}): {} -> [{}] -> {}",
                    descriptor.name, descriptor.form, descriptor.input, descriptor.accumulator, descriptor.output
                );
                for op in &descriptor.operations {
                    let mut flags = Vec::new();
                    if op.accepts_context {
                        flags.push("context");
                    }
                    if op.returns_failure {
                        flags.push("failure");
                    }
                    if flags.is_empty() {
                        println!("    {}", op.shape);
                    } else {
                        println!("    {} [{}]", op.shape, flags.join(", "));
                    }
                }
            }
            CandidateOutcome::Invalid { failure } => {
                println!("✗ {}", failure);
            }
        }
    }

    println!();
    println!("{} ({} ms)", report.summary(), report.duration_ms);
}

fn print_rules() {
    println!("Recognized operations:");
    println!();
    for kind in OperationKind::ALL {
        let presence = if kind.is_mandatory() { "mandatory" } else { "optional" };
        println!("  • {:<18} {:<14} ({})", kind.name(), kind.expected_shape(), presence);
    }
    println!();
    println!("Any operation may take a leading context and return a trailing failure.");
    println!();
    println!("Validation rules:");
    println!();
    for rule in Rule::ALL {
        let id = serde_json::to_value(rule)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        println!("  • {} - {}", id, rule.description());
        println!("      {}", rule.advice());
    }
}
