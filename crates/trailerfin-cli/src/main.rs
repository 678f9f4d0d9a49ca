use clap::{ArgAction, Args, Parser, Subcommand};
use commands::{clear, config, monitor, purge, scan, schedule, status};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trailerfin")]
#[command(about = "Trailerfin - keep trailer links fresh for tagged media folders")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file instead of stderr (rotated daily)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that walks the library.
#[derive(Args, Debug, Clone, Default)]
pub struct LibraryArgs {
    /// Directory to scan (defaults to library.scan_path, /mnt/plex)
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Number of concurrent refresh workers
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the library once and refresh expired trailer links
    Scan {
        #[command(flatten)]
        library: LibraryArgs,
    },
    /// Scan now, then again every N days
    #[command(long_about = "Run a full scan on startup (unless --no-startup-run) and then repeat it every N days. Stops on Ctrl-C between runs.")]
    Schedule {
        #[command(flatten)]
        library: LibraryArgs,

        /// Days between scans (overrides scheduler.interval_days)
        #[arg(long, value_name = "N")]
        days: Option<u32>,

        /// Skip the scan on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Watch for new media and refresh links before they expire
    #[command(long_about = "Poll the library for newly added media folders and process them immediately, and refresh recorded trailer links that are close to expiring. Stops on Ctrl-C between checks.")]
    Monitor {
        #[command(flatten)]
        library: LibraryArgs,
    },
    /// Delete every recorded pointer file, then start monitoring
    Purge {
        #[command(flatten)]
        library: LibraryArgs,

        /// Do not ask for confirmation
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Show recorded trailer links and ignored titles
    Status,
    /// Clear stored state
    #[command(long_about = "Empty one or more of the persistent stores. Clearing the ignore list makes titles without a trailer eligible again on the next run.")]
    Clear {
        /// Clear the ignore list
        #[arg(long, action = ArgAction::SetTrue)]
        ignored: bool,

        /// Clear recorded link expirations (forces a refresh of every folder)
        #[arg(long, action = ArgAction::SetTrue)]
        expirations: bool,

        /// Clear cached TMDB/TVDB to IMDb id mappings
        #[arg(long, action = ArgAction::SetTrue)]
        id_mappings: bool,

        /// Clear all stores
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    /// Show configuration or set API keys
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (API keys are masked)
    Show,
    /// Store TMDB/TVDB API keys (prompts when not given)
    SetKeys {
        /// TMDB API key
        #[arg(long, value_name = "KEY")]
        tmdb: Option<String>,

        /// TVDB API key
        #[arg(long, value_name = "KEY")]
        tvdb: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Scan { library } => scan::run_scan(library, &output).await,
        Commands::Schedule {
            library,
            days,
            no_startup_run,
        } => schedule::run_schedule(library, days, no_startup_run, &output).await,
        Commands::Monitor { library } => monitor::run_monitor(library, &output).await,
        Commands::Purge { library, yes } => purge::run_purge(library, yes, &output).await,
        Commands::Status => status::run_status(&output),
        Commands::Clear {
            ignored,
            expirations,
            id_mappings,
            all,
        } => clear::run_clear(ignored, expirations, id_mappings, all, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
