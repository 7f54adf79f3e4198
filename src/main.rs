//! notify-push-setup CLI - checks a push server and saves it on success.
//!
//! This is the main binary entry point. See the `notify_push_setup` library
//! for the checks themselves.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use notify_push_setup::app_config::AppConfigStore;
use notify_push_setup::constants::{APP_ID, BASE_ENDPOINT_KEY};
use notify_push_setup::db::NextcloudDb;
use notify_push_setup::http::ReqwestHttp;
use notify_push_setup::{queue, Config, Setup};
use std::path::PathBuf;

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI
#[derive(Parser)]
#[command(name = "notify-push-setup")]
#[command(version = VERSION)]
#[command(about = "Configure and verify a notify_push server")]
struct Cli {
    /// Use this config directory instead of the platform default
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test the push server and save it as the endpoint if every check passes
    Setup {
        /// Base URL of the push server
        server: String,
        /// Print the report as JSON instead of status lines
        #[arg(long)]
        json: bool,
    },
    /// Show the configuration and the saved push server endpoint
    Status,
    /// Update the stored configuration
    Config {
        /// Path of the Nextcloud SQLite database
        #[arg(long)]
        database: Option<PathBuf>,
        /// Table prefix of the Nextcloud database
        #[arg(long)]
        table_prefix: Option<String>,
        /// Redis URL (empty string removes it)
        #[arg(long)]
        redis_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        http_timeout: Option<u64>,
    },
}

/// Runs the checks and returns the process exit status.
fn run_setup(config: &Config, server: &str, json: bool) -> Result<i32> {
    let db = NextcloudDb::open(config.database_path()?, &config.table_prefix)
        .context("Failed to open the Nextcloud database")?;
    let queue = queue::from_url(config.redis_url.as_deref()).context("Invalid redis URL")?;
    let http = ReqwestHttp::new(config.http_timeout())?;

    let setup = Setup::new(queue.as_ref(), &db, &http, &db);
    let report = if json {
        setup.run(server)?
    } else {
        setup.run_with(server, |line| println!("{}", line))?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.endpoint_saved {
        println!("  configuration saved");
    }

    Ok(report.exit_code())
}

fn show_status(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    let Some(path) = &config.database else {
        println!("No Nextcloud database configured");
        return Ok(());
    };
    let db = NextcloudDb::open(path, &config.table_prefix)?;
    match db.get_value(APP_ID, BASE_ENDPOINT_KEY)? {
        Some(endpoint) => println!("Push server endpoint: {}", endpoint),
        None => println!("Push server endpoint: (not set, run 'notify-push-setup setup <server>')"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    if let Some(dir) = &cli.config_dir {
        std::env::set_var("NOTIFY_PUSH_CONFIG_DIR", dir);
    }
    let mut config = Config::load()?;
    log::debug!("notify-push-setup v{} with {:?}", VERSION, config);

    match cli.command {
        Commands::Setup { server, json } => {
            let code = run_setup(&config, &server, json)?;
            std::process::exit(code);
        }
        Commands::Status => show_status(&config)?,
        Commands::Config {
            database,
            table_prefix,
            redis_url,
            http_timeout,
        } => {
            if let Some(database) = database {
                config.database = Some(database);
            }
            if let Some(prefix) = table_prefix {
                config.table_prefix = prefix;
            }
            if let Some(url) = redis_url {
                config.redis_url = Some(url).filter(|u| !u.is_empty());
            }
            if let Some(secs) = http_timeout {
                config.http_timeout_secs = secs;
            }
            config.save()?;
            println!("Saved {}", Config::config_path()?.display());
        }
    }

    Ok(())
}
