use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use swagger_browser::config::{Config, DEFAULT_STORE_PATH};
use swagger_browser::logging;
use swagger_browser::query::{find_document, search_names};
use swagger_browser::refresh::refresh_org;
use swagger_browser::store::{DocumentSet, JsonStore};

#[derive(Parser)]
#[command(name = "swagger-browser")]
#[command(version, about = "Collects the swagger documents published by a GitHub organization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh the cache once and print the documented repositories as JSON
    Refresh,
    /// Refresh the cache periodically until interrupted
    Watch,
    /// List cached repository names matching a case-insensitive pattern
    Search {
        query: Option<String>,
        /// Cache store to read
        #[arg(long, env = "SWAGGER_DB", default_value = DEFAULT_STORE_PATH)]
        db: PathBuf,
    },
    /// Print the cached swagger document of one repository
    Doc {
        name: String,
        /// Cache store to read
        #[arg(long, env = "SWAGGER_DB", default_value = DEFAULT_STORE_PATH)]
        db: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Make .env values visible to clap's env fallbacks
    let _ = dotenvy::dotenv_override();
    let cli = Cli::parse();

    match cli.command {
        Command::Refresh => {
            let config = load_config()?;
            let _guard = logging::init(config.log_file.as_deref());
            runtime()?.block_on(refresh_once(&config))
        }
        Command::Watch => {
            let config = load_config()?;
            let _guard = logging::init(config.log_file.as_deref());
            runtime()?.block_on(watch(&config))
        }
        Command::Search { query, db } => {
            let _guard = logging::init(None);
            let documents = stored_documents(&db)?;
            for name in search_names(&documents, query.as_deref()) {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Doc { name, db } => {
            let _guard = logging::init(None);
            let documents = stored_documents(&db)?;
            let Some(swagger) = find_document(&documents, &name) else {
                bail!("No swagger document cached for {}", name);
            };
            println!("{}", serde_json::to_string_pretty(swagger)?);
            Ok(())
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context(
        "GITHUB_ORG, GITHUB_TOKEN and NPM_TOKEN must be set in the environment, .env or ~/.npmrc",
    )
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn stored_documents(db: &Path) -> anyhow::Result<DocumentSet> {
    let store =
        JsonStore::open(db).with_context(|| format!("Failed to open cache store {:?}", db))?;
    Ok(store.documents())
}

async fn refresh_once(config: &Config) -> anyhow::Result<()> {
    let documents = refresh_org(config).await?;
    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}

/// Refreshes every `refresh_interval`; a failed cycle leaves the store as it was
async fn watch(config: &Config) -> anyhow::Result<()> {
    loop {
        match refresh_org(config).await {
            Ok(documents) => info!("{} documented packages cached", documents.len()),
            Err(e) => error!(
                "Refresh failed, keeping cache store {:?}: {}",
                config.store_path, e
            ),
        }

        tokio::select! {
            _ = tokio::time::sleep(config.refresh_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping refresh loop");
                return Ok(());
            }
        }
    }
}
