#![forbid(unsafe_code)]

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use embedding_explorer::config::Config;
use embedding_explorer::constants::config::LOG_LEVEL_ENV;
use embedding_explorer::ipc::Session;
use embedding_explorer::{Catalogs, ParamValue, StateContainer};

use cli::{CatalogsArgs, Cli, Commands, InitConfigArgs, SetArgs};

fn main() {
    if let Err(err) = init_tracing() {
        eprintln!("failed to initialize logging: {err:#}");
    }

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout carries session traffic, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::path);

    match cli.command {
        Commands::Catalogs(args) => print_catalogs(&config_path, args),
        Commands::Set(args) => set(&config_path, args),
        Commands::InitConfig(args) => init_config(&config_path, args),
        Commands::Session => run_session(config_path),
    }
}

fn load_catalogs(config_path: &Path) -> Result<Catalogs> {
    Ok(Config::load_from(config_path)?.into_catalogs())
}

fn print_catalogs(config_path: &Path, args: CatalogsArgs) -> Result<()> {
    let catalogs = load_catalogs(config_path)?;
    let json = match args.kind {
        Some(kind) => serde_json::to_string_pretty(catalogs.get(kind)),
        None => serde_json::to_string_pretty(&catalogs),
    }
    .context("Failed to serialize catalogs")?;
    println!("{json}");
    Ok(())
}

fn set(config_path: &Path, args: SetArgs) -> Result<()> {
    let mut catalogs = load_catalogs(config_path)?;
    apply_set(&mut catalogs, &args)?;
    Config::from_catalogs(&catalogs).save_to(config_path)
}

/// Select a variant or change one of its parameters.
/// Unknown variants are refused unless `--allow-unknown` was given.
fn apply_set(catalogs: &mut Catalogs, args: &SetArgs) -> Result<()> {
    let catalog = catalogs.get_mut(args.kind);

    if !args.allow_unknown && !catalog.contains(&args.variant) {
        let known: Vec<&str> = catalog.variant_names().collect();
        bail!(
            "Unknown {} variant '{}' (available: {}); pass --allow-unknown to store it anyway",
            args.kind,
            args.variant,
            known.join(", ")
        );
    }

    match (&args.param, &args.value) {
        (Some(param), Some(raw)) => {
            let value = ParamValue::parse_loose(raw);
            let previous = catalog.set_param(&args.variant, param, value.clone());
            info!(
                catalog = %args.kind,
                variant = %args.variant,
                param = %param,
                value = %value,
                previous = ?previous,
                "Parameter updated"
            );
        }
        _ => {
            catalog.select(args.variant.clone());
            info!(catalog = %args.kind, variant = %args.variant, "Variant selected");
        }
    }
    Ok(())
}

fn init_config(config_path: &Path, args: InitConfigArgs) -> Result<()> {
    if config_path.exists() && !args.force {
        bail!(
            "Config file {} already exists; pass --force to overwrite",
            config_path.display()
        );
    }
    let catalogs = initial_catalogs(config_path, args.force)?;
    Config::from_catalogs(&catalogs).save_to(config_path)
}

/// Catalogs `init-config` writes. With `force` an unreadable file is
/// replaced by the built-in catalogs instead of failing.
fn initial_catalogs(config_path: &Path, force: bool) -> Result<Catalogs> {
    match load_catalogs(config_path) {
        Ok(catalogs) => Ok(catalogs),
        Err(err) if force => {
            let message = format!("{err:#}");
            warn!(path = %config_path.display(), error = %message, "Discarding unreadable config");
            Ok(Catalogs::default())
        }
        Err(err) => Err(err),
    }
}

fn run_session(config_path: PathBuf) -> Result<()> {
    let catalogs = load_catalogs(&config_path)?;
    let container = StateContainer::new(catalogs);

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    Session::new(stdin, stdout, container, config_path).run()
}
