//! pricecalc - tax-included price calculator
//!
//! Reads `id,title,price` lines, applies each configured tax rate and
//! writes one pretty-printed JSON array per rate.

mod config;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use pricecalc_core::application::{JobRunner, RunSummary};
use pricecalc_core::domain::TaxRate;
use pricecalc_core::port::time_provider::SystemTimeProvider;
use pricecalc_core::port::JobFactory;
use pricecalc_infra_fs::{ConsoleJobFactory, ConsoleOutput, FileJobFactory};

use crate::config::{AppConfig, Overrides};

const EXIT_JOB_FAILURES: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "pricecalc")]
#[command(about = "Apply tax rates to a price list", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "PRICECALC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a file for every tax rate
    Run {
        /// Price file (`id,title,price` per line)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,

        /// Field delimiter of the price file
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Jobs to run at the same time
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Enter prices on the terminal, once per tax rate
    Interactive {
        #[command(flatten)]
        output: OutputArgs,

        /// Print JSON to stdout instead of writing files
        #[arg(long, conflicts_with_all = ["output_dir", "prefix"])]
        stdout: bool,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory for the JSON artifacts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Artifact file prefix (`<prefix>_<percent>.json`)
    #[arg(long)]
    prefix: Option<String>,

    /// Comma-separated tax rates, e.g. 0,0.07,0.1
    #[arg(short, long, value_delimiter = ',')]
    rates: Option<Vec<TaxRate>>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let app_config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return Ok(config_failure(e)),
    };
    let log_format = match app_config.log_format() {
        Ok(f) => f,
        Err(e) => return Ok(config_failure(e)),
    };
    logging::init(log_format);

    match cli.command {
        Commands::Run {
            input,
            output,
            delimiter,
            workers,
        } => {
            let overrides = Overrides {
                input_path: input,
                delimiter,
                max_workers: workers,
                ..output.into_overrides()
            };
            let settings = match app_config.settings(&overrides) {
                Ok(s) => s,
                Err(e) => return Ok(config_failure(e)),
            };

            info!(
                input = %settings.input_path.display(),
                output_dir = %settings.layout.dir.display(),
                rates = settings.tax_rates.len(),
                "pricecalc v{} starting",
                pricecalc_core::VERSION
            );

            let factory = FileJobFactory::new(
                settings.input_path.clone(),
                settings.delimiter,
                settings.layout.clone(),
            );
            let summary = runner(factory)
                .run_concurrent(&settings.tax_rates, settings.max_workers)
                .await;

            report::print_summary(&summary, false);
            Ok(exit_code(&summary))
        }

        Commands::Interactive { output, stdout } => {
            let settings = match app_config.settings(&output.into_overrides()) {
                Ok(s) => s,
                Err(e) => return Ok(config_failure(e)),
            };

            let console_output = if stdout {
                ConsoleOutput::Stdout
            } else {
                ConsoleOutput::Files(settings.layout.clone())
            };
            let factory = ConsoleJobFactory::new(console_output);

            // Jobs share stdin, so they always run one after another
            let summary = runner(factory).run(&settings.tax_rates).await;

            report::print_summary(&summary, stdout);
            Ok(exit_code(&summary))
        }

        Commands::ShowConfig => {
            let rendered = serde_json::to_string_pretty(&app_config)
                .context("Failed to serialize configuration")?;
            println!("{}", "Effective configuration".cyan().bold());
            println!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
    }
}

impl OutputArgs {
    fn into_overrides(self) -> Overrides {
        Overrides {
            output_dir: self.output_dir,
            output_prefix: self.prefix,
            tax_rates: self.rates,
            ..Default::default()
        }
    }
}

fn runner(factory: impl JobFactory + 'static) -> JobRunner {
    JobRunner::new(Arc::new(factory), Arc::new(SystemTimeProvider))
}

fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_JOB_FAILURES)
    }
}

fn config_failure(err: pricecalc_core::AppError) -> ExitCode {
    eprintln!("{} {}", "✗".red().bold(), err);
    ExitCode::from(EXIT_CONFIG_ERROR)
}
