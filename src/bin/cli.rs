// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! polycut CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use polycut::cli::{Reporter, Runner};
use polycut::config::SliceConfig;
use polycut::geometry::Axis;
use polycut::io::ExportFormat;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "polycut")]
#[command(about = "Slice a polygon mesh at an axis-aligned plane and cap the cut", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove everything below a height and close the opening
    Slice {
        /// Input OBJ file
        input: PathBuf,

        /// Output file (defaults to output.<format> next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Axis perpendicular to the cutting plane (x, y, z)
        #[arg(short, long)]
        axis: Option<Axis>,

        /// Cutting height; geometry below it is removed
        #[arg(long, allow_hyphen_values = true)]
        height: Option<f64>,

        /// Output format (obj, stl)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Config file (defaults to ./polycut.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Leave the cut open instead of capping it
        #[arg(long)]
        no_cap: bool,
    },

    /// Print mesh statistics
    Inspect {
        /// Input OBJ file
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Slice {
            input,
            output,
            axis,
            height,
            format,
            config,
            no_cap,
        } => slice_command(SliceArgs {
            input,
            output,
            axis,
            height,
            format,
            config,
            no_cap,
            verbose: cli.verbose,
        }),
        Commands::Inspect { input, json } => inspect_command(&input, json),
        Commands::Version => {
            println!("polycut v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(err) = result {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = filter::Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target("polycut", level);
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(format).init();
}

struct SliceArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    axis: Option<Axis>,
    height: Option<f64>,
    format: Option<ExportFormat>,
    config: Option<PathBuf>,
    no_cap: bool,
    verbose: bool,
}

fn slice_command(args: SliceArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut config = SliceConfig::load(args.config.as_deref())?;
    if let Some(axis) = args.axis {
        config.axis = axis;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if args.no_cap {
        config.cap = false;
    }
    config.validate()?;

    if args.verbose {
        Reporter::report_info(&format!(
            "Slicing {} at {} = {}",
            args.input.display(),
            config.axis,
            config.height
        ));
    }

    let runner = Runner::new(config);
    let run = runner.run_slice(&args.input, args.output.as_deref(), args.format)?;

    if args.verbose {
        Reporter::report_slice(&run);
    } else {
        Reporter::success(&format!(
            "Sliced {} -> {}",
            args.input.display(),
            run.output.display()
        ));
    }

    Ok(())
}

fn inspect_command(input: &Path, json: bool) -> Result<()> {
    let stats = Runner::default().inspect(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        Reporter::report_stats(&input.display().to_string(), &stats);
    }

    Ok(())
}
