//! Parameter-sweep driver for the path-tracing renderer.
//!
//! Runs the renderer once per (profile, case) pair of the sweep matrix and
//! then compares every exported illumination image against the `reference`
//! profile's output.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p pbrt-sweep -- <RENDERER> <DATA_DIR> [OPTIONS]
//! ```
//!
//! ## Output layout
//!
//! One directory per profile under the working directory, each holding
//! `out_<case>.txt` (renderer stdout, first line = arguments) and the exported
//! `.exr` images. With `--perf` the stdout file is `perf_<case>.csv` and no
//! images are exported or compared.
//!
//! ## Examples
//!
//! ```bash
//! # Full sweep from the directory holding test<N>.json camera files
//! cargo run -p pbrt-sweep -- ../build/VulkanPBRT /data/clouds/
//!
//! # Only two profiles, no comparison pass
//! cargo run -p pbrt-sweep -- ../build/VulkanPBRT /data/clouds/ \
//!     --profile reference --profile fast --skip-compare
//!
//! # Show the matrix without running anything
//! cargo run -p pbrt-sweep -- --list
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pbrt_sweep_core::{Catalog, RunMode, SweepLayout};
use pbrt_sweep_test::{CompareConfig, ComparisonSweep, Runner, Sweep};

#[derive(Parser, Debug)]
#[command(name = "pbrt-sweep", version, about = "Run the renderer across a test matrix")]
struct Args {
    /// Renderer executable under test
    #[arg(required_unless_present = "list")]
    executable: Option<PathBuf>,

    /// Directory holding the `cloud-<id>.xyz` input point clouds
    #[arg(required_unless_present = "list")]
    data_dir: Option<PathBuf>,

    /// Directory holding `test<id>.json` cameras; receives the outputs
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// JSON catalog to use instead of the built-in cases and profiles
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Only run these profiles (repeatable)
    #[arg(long = "profile", value_name = "NAME")]
    profiles: Vec<String>,

    /// Capture timing CSVs instead of exporting images
    #[arg(long)]
    perf: bool,

    /// Image comparison program
    #[arg(long, value_name = "PROG", default_value = "flip")]
    comparator: PathBuf,

    /// Reference images [default: <work-dir>/reference]
    #[arg(long, value_name = "DIR")]
    reference_dir: Option<PathBuf>,

    /// Skip the comparison pass
    #[arg(long)]
    skip_compare: bool,

    /// Print the invocations without launching anything
    #[arg(long)]
    dry_run: bool,

    /// Print the sweep matrix and exit
    #[arg(long, conflicts_with = "dry_run")]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut catalog = match &args.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };
    catalog.select_profiles(&args.profiles)?;

    if args.list {
        print_matrix(&catalog);
        return Ok(());
    }

    let executable = args.executable.context("Missing renderer executable")?;
    let data_dir = args.data_dir.context("Missing data directory")?;
    let mode = if args.perf {
        RunMode::Performance
    } else {
        RunMode::Quality
    };
    let layout = SweepLayout::new(args.work_dir.unwrap_or_default(), data_dir)
        .with_mode(mode)
        .absolute()
        .context("Failed to read current directory")?;

    if args.dry_run {
        for invocation in catalog.matrix().invocations(&layout) {
            println!(
                "{} {} > {}",
                executable.display(),
                invocation.command_line(),
                invocation.log_path.display()
            );
        }
        return Ok(());
    }

    let runner = Runner::new(&executable)?;
    let report = Sweep::new(&catalog, &layout, &runner).run()?;
    for failure in report.failures() {
        println!(
            "Renderer returned {} for {}/{}: {}",
            failure.exit_description(),
            failure.profile,
            failure.case_index,
            failure.command_line()
        );
    }

    if args.skip_compare {
        return Ok(());
    }

    let mut config = CompareConfig::for_work_dir(&layout.work_dir).with_comparator(args.comparator);
    if let Some(dir) = args.reference_dir {
        config = config.with_reference_dir(dir);
    }
    let comparisons = ComparisonSweep::new(config).run(&layout, catalog.profiles.names())?;
    info!(
        runs = report.total(),
        failed_runs = report.failure_count(),
        comparisons = comparisons.len(),
        failed_comparisons = comparisons.iter().filter(|c| !c.success()).count(),
        "Done"
    );

    Ok(())
}

fn print_matrix(catalog: &Catalog) {
    println!("Cases:");
    for (index, case) in catalog.cases.iter() {
        println!(
            "  {index}: data {} camera {} frames {} spp {} export {}",
            case.data_id, case.camera_id, case.frames, case.samples, case.export_name
        );
    }

    println!("Profiles:");
    for profile in catalog.profiles.iter() {
        let flags: Vec<_> = profile
            .flags
            .iter()
            .map(|(flag, value)| format!("{flag} {value}"))
            .collect();
        print!("  {}: {}", profile.name, flags.join(" "));
        if !profile.suppressed.is_empty() {
            print!(" (skips cases {:?})", profile.suppressed);
        }
        println!();
    }

    let matrix = catalog.matrix();
    println!("{} runs, {} suppressed", matrix.len(), matrix.suppressed());
}
