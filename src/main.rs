//! Theme Kit CLI
//!
//! Entry point for the `theme-kit` command-line tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use theme_kit::config::FsLoader;
use theme_kit::watch::watch_loop;
use theme_kit::{
    enumerate_paths, merge_layers, CacheStore, FileStore, LayerDirs, LayerSource, MemoryStore,
    ModuleOptions, RefreshOutcome, Refresher, Trigger,
};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "THEME_KIT_LOG";

#[derive(Parser)]
#[command(name = "theme-kit")]
#[command(about = "Layered theme options and design tokens", version)]
struct Cli {
    /// Path to module settings file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one resolution pass and write the generated artifacts
    Build {
        /// Layer directory, highest priority first (repeatable)
        #[arg(long = "layer", required = true)]
        layers: Vec<PathBuf>,

        /// Build directory (overrides the settings file)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Remove previously generated token outputs first
        #[arg(long)]
        force: bool,

        /// Directory for the cache store (default: in-memory)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print every path of the merged options or tokens
    Paths {
        /// Layer directory, highest priority first (repeatable)
        #[arg(long = "layer", required = true)]
        layers: Vec<PathBuf>,

        /// Enumerate token paths instead of option paths
        #[arg(long)]
        tokens: bool,
    },

    /// Build, then rebuild whenever a theme source changes
    Watch {
        /// Layer directory, highest priority first (repeatable)
        #[arg(long = "layer", required = true)]
        layers: Vec<PathBuf>,

        /// Build directory (overrides the settings file)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Directory for the cache store (default: in-memory)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut module = match cli.config.as_deref() {
        Some(path) => match ModuleOptions::load(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error loading settings: {}", e);
                process::exit(1);
            }
        },
        None => ModuleOptions::default(),
    };

    match cli.command {
        Commands::Build {
            layers,
            out,
            force,
            store,
        } => {
            if let Some(out) = out {
                module.build_dir = out;
            }
            run_build(module, layers, force, store);
        }
        Commands::Paths { layers, tokens } => {
            run_paths(module, layers, tokens);
        }
        Commands::Watch {
            layers,
            out,
            store,
            interval_ms,
        } => {
            if let Some(out) = out {
                module.build_dir = out;
            }
            run_watch(module, layers, store, interval_ms);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(dir: Option<PathBuf>) -> Arc<dyn CacheStore> {
    match dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    }
}

fn validated(module: ModuleOptions) -> ModuleOptions {
    if let Err(e) = module.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    module
}

fn run_build(module: ModuleOptions, layers: Vec<PathBuf>, force: bool, store: Option<PathBuf>) {
    let refresher = Refresher::new(validated(module), LayerDirs::new(layers))
        .with_store(open_store(store))
        .with_force(force);

    match refresher.trigger(Trigger::Boot) {
        RefreshOutcome::Completed(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        },
        RefreshOutcome::Failed(message) => {
            eprintln!("Build failed: {}", message);
            process::exit(1);
        }
        RefreshOutcome::Coalesced | RefreshOutcome::Ignored => {}
    }
}

fn run_paths(module: ModuleOptions, layers: Vec<PathBuf>, tokens: bool) {
    let layers = match LayerDirs::new(layers).layers() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error reading layers: {}", e);
            process::exit(1);
        }
    };

    let merged = merge_layers(&layers, &module, &FsLoader);
    let value = if tokens {
        merged.tokens_value()
    } else {
        merged.options_value()
    };

    for path in enumerate_paths(&value) {
        println!("{}", path);
    }
}

fn run_watch(module: ModuleOptions, layers: Vec<PathBuf>, store: Option<PathBuf>, interval_ms: u64) {
    let refresher = Refresher::new(validated(module), LayerDirs::new(layers)).with_store(open_store(store));

    if let RefreshOutcome::Failed(message) = refresher.trigger(Trigger::Boot) {
        eprintln!("Initial build failed: {}", message);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal, stopping...");
        flag.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Error installing signal handler: {}", e);
        process::exit(1);
    }

    watch_loop(&refresher, Duration::from_millis(interval_ms), stop);
}
