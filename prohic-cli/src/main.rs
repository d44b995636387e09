use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::{Context, Result};

mod config;
mod commands;
mod error;

use config::Config;
use error::CliError;

#[derive(Parser)]
#[command(name = "prohic")]
#[command(about = "ProHiC - Hi-C contact maps with circularly aligned tracks")]
#[command(version)]
#[command(long_about = "
ProHiC processes Hi-C contact maps (log compression, observed/expected,
normalization), rotates them around the circular genome and keeps
annotation tracks aligned with the rotated view.

Examples:
  prohic info sample.mcool --resolution 10000
  prohic view sample.mcool --shift 25 --oe true --out view.tsv
  prohic track sample.mcool genes.gff3 coverage.bedgraph --shift 25
  prohic lut viridis --format json
  prohic config --example > prohic.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Map options shared by every command that opens a contact map
#[derive(clap::Args, Clone, Debug)]
pub struct MapArgs {
    /// Contact map (.mcool, .cool, .np, .txt, .tsv, .matrix)
    pub map: PathBuf,

    /// Resolution in bp (nearest available is used)
    #[arg(short, long)]
    pub resolution: Option<u32>,

    /// Log compression on or off (default from configuration)
    #[arg(long)]
    pub log: Option<bool>,

    /// Observed/expected on or off (default from configuration)
    #[arg(long)]
    pub oe: Option<bool>,

    /// Shift steps; each step moves the view by 1% of the map
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub shift: i32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the map summary and available resolutions
    Info {
        #[command(flatten)]
        map: MapArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Dump the processed, shifted contact matrix
    View {
        #[command(flatten)]
        map: MapArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "tsv")]
        format: OutputFormat,
    },

    /// Align annotation tracks to the shifted map and dump their geometry
    Track {
        #[command(flatten)]
        map: MapArgs,

        /// Track files (.bed, .gff, .gff2, .gff3, .bedgraph)
        #[arg(required = true)]
        tracks: Vec<PathBuf>,

        /// Switch curves to log mode
        #[arg(long)]
        curve_log: bool,

        /// Include regions hidden by the seam
        #[arg(long)]
        all: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "tsv")]
        format: OutputFormat,
    },

    /// Print the 256-entry RGB lookup table of a colormap
    Lut {
        /// Colormap name (configured colormap when omitted)
        name: Option<String>,

        /// Output format
        #[arg(long, default_value = "tsv")]
        format: OutputFormat,
    },

    /// List the available colormaps
    Colormaps,

    /// Show, write or check configuration files
    Config {
        /// Print the default configuration
        #[arg(long)]
        example: bool,

        /// Write the default configuration to a file
        #[arg(long)]
        write: Option<PathBuf>,

        /// Parse a configuration file and report problems
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Set global thread count if specified
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread count")?;
    }

    // Execute the requested command
    match cli.command {
        Commands::Info { map, json } => {
            commands::info::execute(&config, &map, json)?;
        }

        Commands::View { map, out, format } => {
            commands::view::execute(&config, &map, out, format)?;
        }

        Commands::Track {
            map,
            tracks,
            curve_log,
            all,
            out,
            format,
        } => {
            commands::track::execute(&config, &map, &tracks, curve_log, all, out, format)?;
        }

        Commands::Lut { name, format } => {
            commands::palette::execute_lut(&config, name, format)?;
        }

        Commands::Colormaps => {
            commands::palette::execute_list(&config)?;
        }

        Commands::Config { example, write, check } => {
            commands::config::execute(&config, example, write, check)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose, cli.quiet)?;

    match run(cli) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_error) => error::print_error_and_exit(cli_error),
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_view_with_negative_shift() {
        let args = ["prohic", "view", "map.np", "--shift", "-7", "--oe", "true"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::View { map, format, .. } => {
                assert_eq!(map.shift, -7);
                assert_eq!(map.oe, Some(true));
                assert_eq!(map.log, None);
                assert_eq!(format, OutputFormat::Tsv);
            }
            _ => panic!("expected view"),
        }
    }

    #[test]
    fn test_track_requires_files() {
        assert!(Cli::try_parse_from(["prohic", "track", "map.np"]).is_err());
    }
}
