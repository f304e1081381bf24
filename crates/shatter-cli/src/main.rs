//! shatter-cli: command-line front end for the fragment generator.
//!
//! Runs the fracture pipeline offline: inspect meshes, tune site grids,
//! and bake fragment OBJs for asset pipelines.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=shatter_core=info` - Basic operation logging
//! - `RUST_LOG=shatter_core=debug` - Per-group detail
//! - `RUST_LOG=shatter_core::timing=debug` - Performance timing
//!
//! # Example
//!
//! ```bash
//! shatter info crate.obj
//! shatter fracture crate.obj -o fragments/ --size 0.2 --seed 42 --validate
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{fracture, info, sites};

/// shatter - fracture meshes into simulate-able fragment shells.
#[derive(Parser)]
#[command(name = "shatter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh statistics and information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Fracture a mesh and write one OBJ per fragment
    Fracture {
        /// Input mesh file
        input: PathBuf,

        /// Output directory for fragment OBJs
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Site-grid extent fraction (0-1); controls fragment granularity
        #[arg(long, default_value = "0.2")]
        size: f64,

        /// Seed for the interior anchor jitter (reproducible output)
        #[arg(long)]
        seed: Option<u64>,

        /// Check every emitted shell for closure and weld issues
        #[arg(long)]
        validate: bool,
    },

    /// Print the site grid a mesh would be partitioned with
    Sites {
        /// Input mesh file
        input: PathBuf,

        /// Site-grid extent fraction (0-1)
        #[arg(long, default_value = "0.2")]
        size: f64,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "shatter_core=info",
            2 => "shatter_core=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Fracture {
            input,
            output,
            size,
            seed,
            validate,
        } => fracture::run(input, output.as_deref(), *size, *seed, *validate, &cli),
        Commands::Sites { input, size } => sites::run(input, *size, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(err) = e.downcast_ref::<shatter_core::ShatterError>() {
                eprintln!("{}: {}", "Error".red().bold(), err);
                eprintln!("  {}: {}", "Code".cyan(), err.code());
                eprintln!("  {}: {}", "Suggestion".green(), err.recovery_suggestion());
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
