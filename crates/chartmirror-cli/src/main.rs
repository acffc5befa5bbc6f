//! Chartmirror CLI - find a Helm chart's container images and mirror them

use chartmirror_scan::ScanMode;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
mod error;
mod exit_codes;

use config::MirrorConfig;
use error::Result;

#[derive(Parser)]
#[command(name = "chartmirror")]
#[command(author = "Chartmirror Contributors")]
#[command(version)]
#[command(about = "Find the container images a Helm chart uses and point them at a mirror registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.config/chartmirror/config.yaml)
    #[arg(long, global = true, env = "CHARTMIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Image discovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Rendered manifests, falling back to the values tree
    Auto,
    /// Values tree only
    Values,
    /// Rendered manifests only
    Manifest,
}

impl From<StrategyArg> for ScanMode {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => ScanMode::Auto,
            StrategyArg::Values => ScanMode::ValuesOnly,
            StrategyArg::Manifest => ScanMode::ManifestOnly,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the container images a chart uses
    Images {
        /// Chart directory
        chart: PathBuf,

        /// Values file(s) to merge
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set values on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Use pre-rendered manifests instead of running helm
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Discovery strategy
        #[arg(long, value_enum, default_value = "auto")]
        strategy: StrategyArg,

        /// Release name used when rendering
        #[arg(long)]
        release_name: Option<String>,

        /// Namespace used when rendering
        #[arg(short, long)]
        namespace: Option<String>,

        /// Kubernetes version used when rendering
        #[arg(long)]
        kube_version: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Point the images in a values file at a mirror registry
    Rewrite {
        /// Values file to rewrite
        values: PathBuf,

        /// Destination registry (e.g. oci://mirror.example.com)
        #[arg(short, long)]
        registry: Option<String>,

        /// Keep the source registry as a path prefix (docker.io -> <registry>/docker/...)
        #[arg(long, overrides_with = "no_prefix_source")]
        prefix_source: bool,

        /// Drop the source registry prefix even when the config file enables it
        #[arg(long, overrides_with = "prefix_source")]
        no_prefix_source: bool,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_logging(debug: bool) {
    let default_directive = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}

/// Collapse a `--flag` / `--no-flag` pair, `None` when neither was given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MirrorConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Images {
            chart,
            values,
            set,
            manifest,
            strategy,
            release_name,
            namespace,
            kube_version,
            json,
        } => commands::images::run(
            &commands::images::ImagesOptions {
                chart: &chart,
                values_files: &values,
                set_values: &set,
                manifest: manifest.as_deref(),
                mode: strategy.into(),
                release_name: release_name.as_deref(),
                namespace: namespace.as_deref(),
                kube_version: kube_version.as_deref(),
                json,
            },
            &config,
        ),

        Commands::Rewrite {
            values,
            registry,
            prefix_source,
            no_prefix_source,
            output,
        } => commands::rewrite::run(
            &values,
            registry.as_deref(),
            flag_pair(prefix_source, no_prefix_source),
            output.as_deref(),
            &config,
        ),
    }
}
