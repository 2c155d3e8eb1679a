//! planefence: summarize which aircraft flew through the fence.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use planefence_core::config::{self, FenceConfig};
use planefence_core::{aggregate, DistanceMode, DistanceUnit, RunStats, TrackRecord, TrackingService};

mod output;

#[derive(Parser)]
#[command(
    name = "planefence",
    version,
    about = "Collapse an ADS-B sighting log into one row per aircraft inside the fence"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every new aircraft and skipped row
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a log file and write the CSV summary
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Output CSV path (stdout if omitted or "-")
        #[arg(long)]
        outfile: Option<PathBuf>,

        #[command(flatten)]
        fence: FenceArgs,
    },

    /// Aggregate a log file and print the records as a table
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fence: FenceArgs,
    },

    /// Write the effective configuration to the config file
    InitConfig {
        #[command(flatten)]
        fence: FenceArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// socket30003 log file ("-" for stdin)
    #[arg(long, visible_alias = "log")]
    logfile: PathBuf,
}

/// Fence parameters. Anything given here overrides the config file.
#[derive(Args)]
struct FenceArgs {
    /// Config file path
    #[arg(long, env = "PLANEFENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Observer latitude (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Observer longitude (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Fence radius in --distunit
    #[arg(long, visible_alias = "dist")]
    distance: Option<f64>,

    /// Altitude ceiling
    #[arg(long)]
    maxalt: Option<f64>,

    /// Subtracted from every reported altitude
    #[arg(long, allow_negative_numbers = true)]
    altcorr: Option<i64>,

    /// Distance unit: km, nm, mi, or m
    #[arg(long)]
    distunit: Option<DistanceUnit>,

    /// Compute distance from --lat/--lon instead of trusting the log
    #[arg(long)]
    calcdist: bool,

    /// Tracking link service: adsbexchange or flightaware
    #[arg(long)]
    trackservice: Option<TrackingService>,
}

impl FenceArgs {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_file)
    }

    /// Defaults, then the config file, then flags.
    fn resolve(&self) -> FenceConfig {
        let path = self.config_path();
        let mut cfg = config::load_config(&path).unwrap_or_else(|e| {
            eprintln!("Error reading config {}: {e}", path.display());
            std::process::exit(2);
        });

        if let Some(v) = self.lat {
            cfg.lat = v;
        }
        if let Some(v) = self.lon {
            cfg.lon = v;
        }
        if let Some(v) = self.distance {
            cfg.max_distance = v;
        }
        if let Some(v) = self.maxalt {
            cfg.max_altitude = v;
        }
        if let Some(v) = self.altcorr {
            cfg.altitude_correction = v;
        }
        if let Some(v) = self.distunit {
            cfg.unit = v;
        }
        if self.calcdist {
            cfg.mode = DistanceMode::Computed;
        }
        if let Some(v) = self.trackservice {
            cfg.service = v;
        }

        if let Err(e) = cfg.validate() {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
        cfg
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run {
            input,
            outfile,
            fence,
        } => cmd_run(&input.logfile, outfile.as_deref(), &fence.resolve()),
        Commands::Summary { input, fence } => cmd_summary(&input.logfile, &fence.resolve()),
        Commands::InitConfig { fence } => cmd_init_config(&fence),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(file: &Path) -> Box<dyn BufRead> {
    if file.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        let f = std::fs::File::open(file).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", file.display());
            std::process::exit(1);
        });
        Box::new(io::BufReader::new(f))
    }
}

fn run_aggregate(file: &Path, cfg: &FenceConfig) -> (Vec<TrackRecord>, RunStats) {
    tracing::debug!(
        max_distance = cfg.max_distance,
        unit = %cfg.unit,
        max_altitude = cfg.max_altitude,
        mode = %cfg.mode,
        input = %file.display(),
        "starting run"
    );
    match aggregate(open_input(file), cfg) {
        Ok((tracker, stats)) => (tracker.into_records(), stats),
        Err(e) => {
            eprintln!("Error processing {}: {e}", file.display());
            std::process::exit(1);
        }
    }
}

fn cmd_run(file: &Path, outfile: Option<&Path>, cfg: &FenceConfig) {
    let (records, _stats) = run_aggregate(file, cfg);
    if let Err(e) = output::write_output(&records, outfile) {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    }
}

fn cmd_summary(file: &Path, cfg: &FenceConfig) {
    let (records, stats) = run_aggregate(file, cfg);

    println!();
    println!("Log: {}", file.display());
    println!(
        "  Rows: {} read, {} malformed, {} in fence",
        stats.rows, stats.malformed_rows, stats.in_fence_sightings
    );
    println!(
        "  Fence: {} {} radius, {} ceiling ({} distance)",
        cfg.max_distance, cfg.unit, cfg.max_altitude, cfg.mode
    );
    println!("  Aircraft: {}", stats.records);

    if records.is_empty() {
        return;
    }

    println!();
    let mut table = Table::new();
    table.set_header(vec![
        "ICAO",
        "Callsign",
        "First heard",
        "Last heard",
        "Min alt",
        "Min dist",
        "Link",
    ]);
    for rec in &records {
        table.add_row(vec![
            Cell::new(rec.identity.as_str()),
            Cell::new(if rec.callsign.is_empty() {
                "-"
            } else {
                rec.callsign.as_str()
            }),
            Cell::new(&rec.first_heard),
            Cell::new(&rec.last_heard),
            Cell::new(rec.min_altitude),
            Cell::new(format!("{:.1}", rec.min_distance)),
            Cell::new(&rec.tracking_link),
        ]);
    }
    println!("{table}");
}

fn cmd_init_config(fence: &FenceArgs) {
    let cfg = fence.resolve();
    let path = fence.config_path();
    match config::save_config(&cfg, &path) {
        Ok(()) => println!("Wrote {}", path.display()),
        Err(e) => {
            eprintln!("Error writing config {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
