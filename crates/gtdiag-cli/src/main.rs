mod cmd_errors;
mod cmd_report;
mod cmd_scan;
mod config;
mod logpath;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GTDIAG_LOG";

#[derive(Parser)]
#[command(
    name = "gtdiag",
    version,
    about = "Scan an X4 debug log and write a GalaxyTrader MK3 bug report"
)]
struct Cli {
    /// JSON config file (default: ./gtdiag.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Args)]
struct TailArgs {
    /// Keep the last N GT lines for the report (0 = all)
    #[arg(long, conflicts_with = "tail_all")]
    tail: Option<usize>,
    /// Keep every GT line for the report
    #[arg(long)]
    tail_all: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Write the full bug report to stdout and to GT_BugReport_<time>.txt
    Report {
        /// Log file (default: log.log or log.log.txt in the current directory)
        logfile: Option<PathBuf>,
        #[command(flatten)]
        tail: TailArgs,
        /// Directory for the report file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the aggregate scan state as JSON
    Scan {
        /// Log file (default: log.log or log.log.txt in the current directory)
        logfile: Option<PathBuf>,
        #[command(flatten)]
        tail: TailArgs,
    },
    /// List deduplicated script errors
    Errors {
        /// Log file (default: log.log or log.log.txt in the current directory)
        logfile: Option<PathBuf>,
        /// Maximum groups per list
        #[arg(long, default_value_t = 15)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn overrides(tail: TailArgs, out: Option<PathBuf>) -> config::Overrides {
    config::Overrides {
        tail: tail.tail,
        tail_all: tail.tail_all,
        out,
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let cfg = cli.config.as_deref();

    match cli.cmd {
        Command::Report {
            logfile,
            tail,
            out,
            json,
        } => {
            let s = config::load(cfg, &overrides(tail, out), &cwd)?;
            let path = logpath::resolve(logfile.as_deref(), &cwd)?;
            cmd_report::execute(&path, &s, json)
        }
        Command::Scan { logfile, tail } => {
            let s = config::load(cfg, &overrides(tail, None), &cwd)?;
            let path = logpath::resolve(logfile.as_deref(), &cwd)?;
            cmd_scan::execute(&path, &s.scan_options())
        }
        Command::Errors {
            logfile,
            limit,
            json,
        } => {
            let s = config::load(cfg, &config::Overrides::default(), &cwd)?;
            let path = logpath::resolve(logfile.as_deref(), &cwd)?;
            cmd_errors::execute(&path, &s.scan_options(), limit, json)
        }
    }
}
