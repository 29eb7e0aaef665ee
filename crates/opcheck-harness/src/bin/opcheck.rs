//! opcheck CLI: run conformance suites, generate and replay artifacts.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use opcheck_core::logging::{init_logging, LogLevel, LoggingConfig};
use opcheck_harness::{
    generate_fill_any_like, replay_artifact, run_hub_check, run_selection, select_cases,
    CaseSelection, CaseStatus, Driver, HarnessConfig, ModelHub, Tier,
};
use opcheck_ir::{Precision, TargetDevice};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "opcheck")]
#[command(about = "Operator conformance checks for framework-to-IR conversion")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RunTarget {
    /// Target device
    #[arg(long)]
    device: Option<String>,

    /// Execution precision (FP32 or FP16)
    #[arg(long)]
    precision: Option<String>,

    /// Serialize and reload the IR at this version before executing
    #[arg(long)]
    ir_version: Option<i64>,

    /// Seed for input sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Run cases one at a time
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run conformance cases
    Run {
        /// Only this suite
        #[arg(long)]
        suite: Option<String>,

        /// Only cases in this tier (precommit or nightly)
        #[arg(long)]
        tier: Option<String>,

        /// Only case ids containing this substring
        #[arg(long)]
        filter: Option<String>,

        #[command(flatten)]
        target: RunTarget,
    },

    /// Print case ids
    List {
        /// Only this suite
        #[arg(long)]
        suite: Option<String>,

        /// Only cases in this tier
        #[arg(long)]
        tier: Option<String>,

        /// Only case ids containing this substring
        #[arg(long)]
        filter: Option<String>,
    },

    /// Write the fill_any_like artifacts
    Generate {
        /// Output directory
        out_dir: PathBuf,

        /// Seed for the sampled inputs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Re-execute one saved artifact
    Replay {
        /// Artifact directory
        dir: PathBuf,

        #[command(flatten)]
        target: RunTarget,
    },

    /// Run the conversion check on a hub model
    Hub {
        /// Model name
        model_name: String,

        #[command(flatten)]
        target: RunTarget,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(
        LoggingConfig::new()
            .with_level(LogLevel::from_verbosity(cli.verbose))
            .with_json_format(cli.json_logs)
            .with_span_timings(cli.verbose >= 2),
    );

    match cli.command {
        Commands::Run {
            suite,
            tier,
            filter,
            target,
        } => cmd_run(selection(suite, tier, filter)?, &target),
        Commands::List {
            suite,
            tier,
            filter,
        } => cmd_list(&selection(suite, tier, filter)?),
        Commands::Generate { out_dir, seed } => {
            let provision = HarnessConfig::from_env()?.provision;
            let provision = match seed {
                Some(seed) => provision.with_seed(Some(seed)),
                None => provision,
            };
            for dir in generate_fill_any_like(&out_dir, provision)? {
                println!("{}", dir.display());
            }
            Ok(())
        }
        Commands::Replay { dir, target } => {
            let driver = Driver::new(config(&target)?);
            finish_one(&dir.display().to_string(), replay_artifact(&dir, &driver)?)
        }
        Commands::Hub { model_name, target } => {
            let model = ModelHub::load(&model_name)?;
            let config = config(&target)?;
            let provision = config.provision.clone();
            let driver = Driver::new(config);
            finish_one(&model.name, run_hub_check(&driver, &model, provision)?)
        }
    }
}

fn selection(
    suite: Option<String>,
    tier: Option<String>,
    filter: Option<String>,
) -> Result<CaseSelection> {
    let tier = tier.map(|t| t.parse::<Tier>()).transpose()?;
    Ok(CaseSelection {
        suite,
        tier,
        filter,
    })
}

/// Environment first, then flags.
fn config(target: &RunTarget) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::from_env()?;
    if let Some(device) = &target.device {
        config = config.with_device(device.parse::<TargetDevice>()?);
    }
    if let Some(precision) = &target.precision {
        config = config.with_precision(precision.parse::<Precision>()?);
    }
    if let Some(version) = target.ir_version {
        config = config.with_ir_version(version)?;
    }
    if let Some(seed) = target.seed {
        config.provision = config.provision.with_seed(Some(seed));
    }
    Ok(config.with_parallel(!target.sequential))
}

fn cmd_run(selection: CaseSelection, target: &RunTarget) -> Result<()> {
    let driver = Driver::new(config(target)?);
    let reports = run_selection(&driver, &selection)?;
    if reports.is_empty() {
        bail!("no cases match the selection");
    }

    let mut all_passed = true;
    for report in &reports {
        println!(
            "{:<14} {:>3}/{:<3} passed",
            report.suite, report.pass_count, report.case_count
        );
        for failure in &report.failures {
            println!("  FAIL  {failure}");
        }
        for error in &report.errors {
            println!("  ERROR {error}");
        }
        all_passed &= report.all_passed();
    }
    if !all_passed {
        bail!("conformance failures");
    }
    Ok(())
}

fn cmd_list(selection: &CaseSelection) -> Result<()> {
    for case in select_cases(selection)? {
        println!("{}", case.id);
    }
    Ok(())
}

fn finish_one(name: &str, status: CaseStatus) -> Result<()> {
    match status {
        CaseStatus::Passed => {
            println!("{name}: passed");
            Ok(())
        }
        CaseStatus::Failed(mismatch) => bail!("{name}: {mismatch}"),
        CaseStatus::Error(err) => bail!("{name}: {err}"),
    }
}
