use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use testcost::augment::{augment_dataset, AugmentOptions};
use testcost::breakdown::CostBreakdown;
use testcost::calculator::compute_cost_detailed;
use testcost::classifier::{ClassificationPolicy, ResourceClassifier};
use testcost::config::{init_config, Config};
use testcost::exit_codes::exit_code_for_anyhow;
use testcost::measurements::MeasurementDataset;
use testcost::report::{self, OutputFormat};
use testcost::validation::{parse_runtime, validate_input_file};

#[derive(Parser)]
#[command(name = "testcost")]
#[command(
    about = "Attribute cloud costs to infrastructure test runs",
    long_about = "testcost computes what individual infrastructure test runs cost in the cloud.\n\nIt reads the hourly rates of an Infracost breakdown, classifies every resource as\nbilled fine granular (per second) or per started hour, and applies those rates to\nmeasured runtimes. When several test cases share one deployment, the deployment's\napply and destroy time is distributed across them."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TESTCOST_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the cost of a single runtime
    CalculateCosts {
        /// Path to the Infracost breakdown JSON
        #[arg(long)]
        infracost_json: PathBuf,
        /// Runtime in seconds
        #[arg(long, allow_hyphen_values = true)]
        runtime: String,
        /// Number of test cases sharing the hourly interval costs
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        split_by: i64,
        /// Fail on resource types missing from the billing table
        #[arg(long)]
        strict: bool,
    },
    /// Extend a measurements CSV with the cost of every dynamic test
    AugmentMeasurements {
        /// Path to the Infracost breakdown JSON
        #[arg(long)]
        infracost_json: PathBuf,
        /// Path to the measurements CSV, rewritten in place
        #[arg(long)]
        measurements_csv: PathBuf,
        /// Compute costs and report without writing the CSV
        #[arg(long)]
        dry_run: bool,
        /// Fail on resource types missing from the billing table
        #[arg(long)]
        strict: bool,
    },
    /// Show how each resource of a breakdown is billed
    Classify {
        /// Path to the Infracost breakdown JSON
        #[arg(long)]
        infracost_json: PathBuf,
        /// Fail on resource types missing from the billing table
        #[arg(long)]
        strict: bool,
    },
    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(default_value = ".testcost.toml")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging - only warnings and errors unless verbose, stdout is kept for results
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for_anyhow(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let classifier_for = |strict: bool| {
        let policy = if strict {
            ClassificationPolicy::Strict
        } else {
            config.classification.policy
        };
        ResourceClassifier::new(policy)
    };

    match cli.command {
        Commands::CalculateCosts {
            infracost_json,
            runtime,
            split_by,
            strict,
        } => {
            let runtime = parse_runtime(&runtime, "--runtime")?;
            validate_input_file(&infracost_json, "Infracost JSON")?;
            let breakdown = CostBreakdown::load(&infracost_json)?;
            let sums = classifier_for(strict).classify(&breakdown)?;
            let computation = compute_cost_detailed(&sums, runtime, split_by)?;
            println!("{}", report::render_cost(&computation, cli.output)?);
        }
        Commands::AugmentMeasurements {
            infracost_json,
            measurements_csv,
            dry_run,
            strict,
        } => {
            validate_input_file(&infracost_json, "Infracost JSON")?;
            validate_input_file(&measurements_csv, "measurements CSV")?;

            let breakdown = CostBreakdown::load(&infracost_json)?;
            let dataset = MeasurementDataset::load(&measurements_csv)?;
            let options = AugmentOptions {
                dynamic_approaches: config.measurements.dynamic_approaches.clone(),
            };
            let (augmented, summary) =
                augment_dataset(&dataset, &breakdown, &classifier_for(strict), &options)?;

            if dry_run {
                info!("Dry run, not writing {}", measurements_csv.display());
            } else {
                augmented.persist(&measurements_csv)?;
                info!("Updated {}", measurements_csv.display());
            }
            println!(
                "{}",
                report::render_augment_report(&summary, dry_run, cli.output)?
            );
        }
        Commands::Classify {
            infracost_json,
            strict,
        } => {
            validate_input_file(&infracost_json, "Infracost JSON")?;
            let breakdown = CostBreakdown::load(&infracost_json)?;
            let classification = classifier_for(strict).classify_detailed(&breakdown)?;
            println!(
                "{}",
                report::render_classification(&classification, cli.output)?
            );
        }
        Commands::Init { path } => {
            init_config(&path)?;
        }
    }

    Ok(())
}
