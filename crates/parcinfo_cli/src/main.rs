//! `parcinfo` binary: serve the web tier, migrate a database, or check core linkage.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parcinfo_web::{AppState, WebConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "parcinfo", about = "ParcInfo IT asset inventory", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (JSON API under /api plus HTML pages)
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overrides config and PARCINFO_BIND_ADDR
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database file, overrides config and PARCINFO_DB_PATH
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Create or upgrade the database schema, then exit
    Migrate {
        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print the core ping reply and version
    Ping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind, db } => {
            let mut config = WebConfig::load(config.as_deref())
                .context("failed to load configuration")?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            cmd_serve(&config)
        }
        Commands::Migrate { db } => {
            let mut config =
                WebConfig::load(None).context("failed to load configuration")?;
            if let Some(db) = db {
                config.db_path = db;
            }
            cmd_migrate(&config)
        }
        Commands::Ping => {
            println!("parcinfo_core ping={}", parcinfo_core::ping());
            println!("parcinfo_core version={}", parcinfo_core::core_version());
            Ok(())
        }
    }
}

fn cmd_serve(config: &WebConfig) -> Result<()> {
    init_logging(config)?;
    let addr = config.socket_addr()?;
    let state = AppState::open(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    info!("event=db_open module=cli status=ok");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime
        .block_on(parcinfo_web::serve(state, addr))
        .with_context(|| format!("server on {addr} failed"))?;
    Ok(())
}

fn cmd_migrate(config: &WebConfig) -> Result<()> {
    init_logging(config)?;
    parcinfo_core::open_db(&config.db_path)
        .with_context(|| format!("failed to migrate {}", config.db_path.display()))?;
    info!("event=db_migrate module=cli status=ok");
    println!("Database ready: {}", config.db_path.display());
    Ok(())
}

fn init_logging(config: &WebConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot resolve current directory")?;
    let dir = log_dir(&cwd, config.logging.dir.as_deref());
    let level = config
        .logging
        .level
        .as_deref()
        .unwrap_or_else(|| parcinfo_core::default_log_level());
    parcinfo_core::init_logging(level, &dir)
        .with_context(|| format!("failed to initialize logging in {}", dir.display()))
}

/// Log directory made absolute against `cwd`; defaults to `<cwd>/logs`.
fn log_dir(cwd: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd.join("logs"),
    }
}
