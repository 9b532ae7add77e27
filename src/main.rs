use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use slidenav::config;
use slidenav::replay::{Trace, replay};
use slidenav::watch::TraceWatcher;

#[derive(Parser)]
#[command(
    name = "slidenav",
    version = env!("SLIDENAV_LONG_VERSION"),
    about = "Replay wheel/touch gesture traces through the section pager"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Page-turn threshold in pixels of accumulated input
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Input lock after a page turn, in milliseconds
    #[arg(long, global = true)]
    lock_ms: Option<u64>,

    /// Distance (px) from a section edge that still counts as the boundary
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    /// Log output file path (logs go to stderr when omitted)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a TOML gesture trace against a simulated page
    Replay {
        /// Trace file
        trace: PathBuf,

        /// Re-run whenever the trace file changes
        #[arg(long)]
        watch: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let file = match std::fs::File::create(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: failed to open log file {}: {e}", log_path.display());
                std::process::exit(1);
            }
        };
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else {
        env_logger::init();
    }

    // Load config file and merge CLI overrides
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    cfg.merge_cli(cli.threshold, cli.lock_ms, cli.tolerance);

    let result = cfg.resolve().and_then(|config| match cli.command {
        Command::Replay { trace, watch } => cmd_replay(&trace, &config, watch),
        Command::Config => {
            cmd_config(&config);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_config(config: &config::Config) {
    println!(
        "sections           = [{}]",
        config.sections.iter().collect::<Vec<_>>().join(", ")
    );
    println!("threshold          = {}", config.tuning.threshold);
    println!("lock_ms            = {}", config.tuning.lock.as_millis());
    println!("boundary_tolerance = {}", config.tuning.boundary_tolerance);
}

fn cmd_replay(path: &Path, config: &config::Config, watch: bool) -> Result<()> {
    if !watch {
        return run_once(path, config);
    }

    let watcher = TraceWatcher::new(path)?;
    loop {
        // A broken trace while watching is reported, not fatal.
        if let Err(e) = run_once(path, config) {
            eprintln!("Error: {e:#}");
        }
        eprintln!("-- watching {} (Ctrl-C to quit)", path.display());
        if !watcher.wait_for_change() {
            return Ok(());
        }
        info!("replay: {} changed, re-running", path.display());
    }
}

fn run_once(path: &Path, config: &config::Config) -> Result<()> {
    let trace = Trace::load(path, &config.sections)?;
    let report = replay(&trace, config.tuning);

    for record in &report.events {
        println!("{record}");
    }
    eprintln!(
        "{}: {} event(s), {} page turn(s), final section {} (scroll_y={})",
        path.display(),
        report.events.len(),
        report.turns.len(),
        report.final_active,
        report.final_scroll_y
    );
    Ok(())
}
