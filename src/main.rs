use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use svn_ftp_sync::{handlers, logger, VerbosityLevel};

#[derive(Parser)]
#[command(name = "svn-ftp-sync")]
#[command(about = "Deploy Subversion revisions to an FTP server", long_about = None)]
#[command(version)]
struct Cli {
    /// Show more detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors and the final result
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload added/modified paths and delete removed paths for a set of revisions
    Deploy {
        /// Project config file (default: config.toml in the config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Revisions: HEAD, 193, 193-204 or 192,194,195
        #[arg(short, long, default_value = "HEAD")]
        revisions: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,

        /// Export as usual but only print the remote operations
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the paths a deploy would touch
    Status {
        /// Project config file (default: config.toml in the config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Revisions: HEAD, 193, 193-204 or 192,194,195
        #[arg(short, long, default_value = "HEAD")]
        revisions: String,

        /// Output format: console, json or markdown
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or create a project configuration
    Config {
        /// Project config file to show
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write a sample configuration to this path
        #[arg(long, value_name = "PATH")]
        init: Option<PathBuf>,
    },

    /// Remove staging directories left behind by earlier deployments
    Cleanup {
        /// Remove directories older than N days
        #[arg(long, default_value_t = 7)]
        max_age_days: i64,

        /// Only list what would be removed
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_flags(cli.verbose, cli.quiet);

    if let Err(e) = logger::init_logger() {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }
    if let Err(e) = logger::rotate_log_if_needed() {
        log::warn!("Failed to rotate log file: {}", e);
    }

    match cli.command {
        Commands::Deploy {
            config,
            revisions,
            force,
            dry_run,
        } => {
            handlers::handle_deploy(config.as_deref(), &revisions, force, dry_run, verbosity)?;
        }
        Commands::Status {
            config,
            revisions,
            format,
            output,
        } => {
            handlers::handle_status(config.as_deref(), &revisions, &format, output.as_deref())?;
        }
        Commands::Config { config, show, init } => match init {
            Some(path) => handlers::handle_config_init(&path)?,
            None => {
                if !show {
                    println!("Use --show to print the configuration or --init <PATH> to create one.");
                    println!();
                }
                handlers::handle_config_show(config.as_deref())?;
            }
        },
        Commands::Cleanup {
            max_age_days,
            dry_run,
        } => {
            handlers::handle_cleanup_staging(dry_run, max_age_days)?;
        }
    }

    Ok(())
}
