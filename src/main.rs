use anyhow::{Context, Result};
use arcscan::{config::Config, util::report, Arcconf, Controller, ProcessExecutor};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arcscan", about = "Inspect Adaptec/Microsemi RAID controllers through arcconf", version)]
struct Cli {
    /// Print a one-shot JSON snapshot of every controller and exit
    #[arg(long)]
    json: bool,

    /// Print a human-readable controller report and exit
    #[arg(long)]
    report: bool,

    /// Print BIOS/firmware/driver versions of all controllers and exit
    #[arg(long)]
    versions: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Only inspect this controller
    #[arg(short, long, value_name = "ID")]
    controller: Option<u32>,

    /// arcconf executable to run instead of the configured one
    #[arg(long, value_name = "PATH")]
    binary: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load();
    if let Some(binary) = &cli.binary {
        cfg.executor.binary = binary.to_string_lossy().into_owned();
    }
    init_tracing(&cfg);

    if cli.config {
        return run_print_config(&cfg);
    }
    if cli.versions {
        return run_versions(&cfg);
    }
    if cli.report {
        return run_report(&cfg, cli.controller);
    }
    if cli.json {
        return run_json_snapshot(&cfg, cli.controller);
    }
    // No mode flag: JSON snapshot as well
    run_json_snapshot(&cfg, cli.controller)
}

fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn connect(cfg: &Config) -> Result<Arcconf> {
    Arcconf::from_config(cfg).with_context(|| format!("locating {}", cfg.executor.binary))
}

fn load_controllers(cfg: &Config, only: Option<u32>) -> Result<Vec<Controller>> {
    let cli = connect(cfg)?;
    let ids = cli.list().context("listing controllers")?;
    let ids: Vec<u32> = match only {
        Some(id) if !ids.contains(&id) => anyhow::bail!("controller {} not found (have {:?})", id, ids),
        Some(id) => vec![id],
        None => ids,
    };

    ids.into_iter()
        .map(|id| {
            let mut ctl = Controller::new(id);
            ctl.initialize(&cli).with_context(|| format!("reading controller {}", id))?;
            Ok(ctl)
        })
        .collect()
}

fn run_json_snapshot(cfg: &Config, only: Option<u32>) -> Result<()> {
    use serde_json::json;

    let controllers = load_controllers(cfg, only)?;
    let snapshot = json!({
        "arcscan_version": arcscan::VERSION,
        "timestamp":       chrono::Local::now().to_rfc3339(),
        "controllers":     controllers,
    });

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_report(cfg: &Config, only: Option<u32>) -> Result<()> {
    let controllers = load_controllers(cfg, only)?;
    print!("{}", report::generate(&controllers));
    Ok(())
}

fn run_versions(cfg: &Config) -> Result<()> {
    let versions = connect(cfg)?.get_version().context("querying versions")?;
    if versions.is_empty() {
        println!("No controllers found.");
        return Ok(());
    }
    for (id, table) in &versions {
        println!("Controller {}", id);
        for (key, value) in table {
            println!("  {:<24} {}", key, value);
        }
    }
    Ok(())
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let resolved = ProcessExecutor::locate(&cfg.executor.binary)
        .map(|e| e.binary().display().to_string())
        .unwrap_or_else(|_| "(not found)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[executor]");
    println!("  binary        = {} → {}", cfg.executor.binary, resolved);
    println!("  terminator    = {:?}", cfg.executor.terminator);
    println!();
    println!("[parser]");
    println!("  section_width = {}", cfg.parser.section_width);
    println!();
    println!("[logging]");
    println!("  level         = {}", cfg.logging.level);
    Ok(())
}
