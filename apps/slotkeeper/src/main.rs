use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use scheduling::config::SchedulingConfig;
use scheduling::contract::error::SchedulingError;
use scheduling::Scheduling;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "scheduling";

/// Expand a sqlite DSN into an absolute-path DSN under `base_dir`.
/// - `sqlite::memory:` stays in memory.
/// - File databases are opened read-write-create unless a mode is given.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {dsn})"))?;

    let (path_str, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }

    let mut path = PathBuf::from(path_str);
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if create_dirs {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create database directory {}", dir.display()))?;
        }
    }

    let query = match query {
        Some(q) if q.contains("mode=") => q.to_string(),
        Some(q) => format!("{q}&mode=rwc"),
        None => "mode=rwc".to_string(),
    };
    Ok(format!(
        "sqlite://{}?{query}",
        path.to_string_lossy().replace('\\', "/")
    ))
}

/// Slotkeeper - appointment slots and identity provisioning
#[derive(Parser)]
#[command(name = "slotkeeper")]
#[command(about = "Slotkeeper - hour-slot booking with identity provisioning")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// Apply database migrations
    Migrate,
    /// Print the occupied slots of a month (YYYY-MM)
    Calendar { month: String },
    /// List users
    Users,
    /// List the appointments visible to an identity-provider subject
    Appointments { subject: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::info!("Slotkeeper starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Migrate => {
            let module = open_module(&config).await?;
            module.migrate().await?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Calendar { month } => {
            let module = ready_module(&config).await?;
            emit(module.api().get_calendar(&month).await, "calendar")
        }
        Commands::Users => {
            let module = ready_module(&config).await?;
            emit(module.api().list_users().await, "users")
        }
        Commands::Appointments { subject } => {
            let module = ready_module(&config).await?;
            emit(module.api().list_appointments(&subject).await, "appointments")
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let module_cfg: SchedulingConfig = config.module_config(MODULE_NAME)?;
    if config.database.is_none() {
        tracing::warn!("No database configuration found");
    }
    tracing::debug!(?module_cfg, "Scheduling configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn connect(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let dsn = db_config.url.trim();
    if dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let dsn = absolutize_sqlite_dsn(dsn, base_dir, true)?;

    let busy_timeout = Duration::from_millis(u64::from(db_config.busy_timeout_ms.unwrap_or(5000)));
    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_millis(
            db_config.acquire_timeout_ms.unwrap_or(5000),
        ))
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy_timeout));

    tracing::info!("Connecting to database: {}", dsn);
    Database::connect(opts)
        .await
        .with_context(|| format!("cannot connect to {dsn}"))
}

async fn open_module(config: &AppConfig) -> Result<Scheduling> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database configuration required"))?;
    let db = connect(db_config, Path::new(&config.home_dir)).await?;
    let module_cfg: SchedulingConfig = config.module_config(MODULE_NAME)?;
    Scheduling::init(&module_cfg, db)
}

/// Open the module with its schema up to date.
async fn ready_module(config: &AppConfig) -> Result<Scheduling> {
    let module = open_module(config).await?;
    module.migrate().await?;
    Ok(module)
}

/// Print a result as JSON on stdout, or its problem document on stderr.
fn emit<T: Serialize>(result: Result<T, SchedulingError>, instance: &str) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            let problem = e.to_problem(instance);
            eprintln!("{}", serde_json::to_string_pretty(&problem)?);
            Err(anyhow!(e))
        }
    }
}
