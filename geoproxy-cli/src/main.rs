//! GEOPROXY CLI
//!
//! Runs the caching geocoding proxy and inspects its cache.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geoproxy_api::{ApiConfig, ApiServer};
use geoproxy_core::types::{CacheStatus, LookupRequest};
use geoproxy_store::FileStore;

/// GEOPROXY - cache-first geocoding proxy
#[derive(Parser)]
#[command(name = "geoproxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "PORT")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
        /// Cache file (defaults to an in-memory cache)
        #[arg(long, env = "GEOPROXY_CACHE_PATH")]
        cache_path: Option<PathBuf>,
        /// Coalesce concurrent lookups for the same address
        #[arg(long)]
        single_flight: bool,
    },

    /// Geocode one address through the cache
    Lookup {
        /// Address to geocode
        address: String,
        /// Cache file (defaults to an in-memory cache)
        #[arg(long, env = "GEOPROXY_CACHE_PATH")]
        cache_path: Option<PathBuf>,
        /// Geocoding API key
        #[arg(long, env = "GEOCODING_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Remove expired entries from a cache file
    Purge {
        /// Cache file
        #[arg(long, env = "GEOPROXY_CACHE_PATH")]
        cache_path: PathBuf,
    },

    /// Show cache file statistics
    Stats {
        /// Cache file
        #[arg(long, env = "GEOPROXY_CACHE_PATH")]
        cache_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "geoproxy=debug,tower_http=debug,info"
    } else {
        "geoproxy=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            cache_path,
            single_flight,
        } => cmd_serve(port, &bind, cache_path, single_flight).await,
        Commands::Lookup {
            address,
            cache_path,
            api_key,
        } => cmd_lookup(address, cache_path, api_key).await,
        Commands::Purge { cache_path } => cmd_purge(cache_path).await,
        Commands::Stats { cache_path } => cmd_stats(cache_path).await,
    }
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str, cache_path: Option<PathBuf>, single_flight: bool) -> Result<()> {
    println!("{}", "🚀 Starting GEOPROXY API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);

    let mut config = ApiConfig::from_env();
    if cache_path.is_some() {
        config.cache_path = cache_path;
    }
    config.single_flight |= single_flight;

    match &config.cache_path {
        Some(path) => println!("   {} {}", "Cache file:".dimmed(), path.display()),
        None => println!("   {} in-memory", "Cache:".dimmed()),
    }
    if config.api_key.is_none() {
        println!("   {}", "⚠️  GEOCODING_API_KEY is not set; cache misses will fail.".yellow());
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::from_config(config)
        .await
        .context("Failed to initialise server")?;

    let addr = bind_addr(bind, port)?;
    server.run(addr).await?;

    Ok(())
}

/// Parses the bind address; IPv6 literals such as `::` are accepted bare.
fn bind_addr(bind: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = bind
        .trim_matches(|c| c == '[' || c == ']')
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;
    Ok(SocketAddr::new(ip, port))
}

/// Geocode a single address
async fn cmd_lookup(address: String, cache_path: Option<PathBuf>, api_key: Option<String>) -> Result<()> {
    println!("{} {}", "🔍 Looking up:".cyan().bold(), address);

    let mut config = ApiConfig::from_env();
    if cache_path.is_some() {
        config.cache_path = cache_path;
    }
    if api_key.is_some() {
        config.api_key = api_key;
    }

    let handler = config.build_handler().await.context("Failed to build lookup pipeline")?;
    let response = handler
        .handle(&LookupRequest::for_address(address))
        .await
        .context("Lookup failed")?;

    let status = match response.cache_status {
        CacheStatus::Hit => response.cache_status.as_str().green().bold(),
        CacheStatus::Miss => response.cache_status.as_str().yellow().bold(),
    };
    println!("   {} {}", "X-Cache:".dimmed(), status);

    let pretty = serde_json::from_str::<serde_json::Value>(&response.body)
        .and_then(|v| serde_json::to_string_pretty(&v));
    match pretty {
        Ok(json) => println!("{}", json),
        Err(e) => {
            debug!(error = %e, "Response body is not JSON, printing raw");
            println!("{}", response.body);
        }
    }

    Ok(())
}

/// Remove expired entries
async fn cmd_purge(cache_path: PathBuf) -> Result<()> {
    println!("{} {}", "🧹 Purging expired entries from:".cyan().bold(), cache_path.display());

    let store = FileStore::open(&cache_path)
        .await
        .context("Failed to open cache file")?;
    let removed = store.purge_expired(Utc::now()).await?;

    println!("   {} {} removed, {} remaining", "✅".green(), removed, store.len());
    Ok(())
}

/// Show cache statistics
async fn cmd_stats(cache_path: PathBuf) -> Result<()> {
    let store = FileStore::open(&cache_path)
        .await
        .context("Failed to open cache file")?;
    let stats = store.memory().stats(Utc::now());

    println!("{} {}", "📊 Cache:".cyan().bold(), cache_path.display());
    println!("   {} {}", "Total entries:".dimmed(), stats.total_entries);
    println!("   {} {}", "Live entries:".green(), stats.live_entries);
    println!("   {} {}", "Expired entries:".yellow(), stats.expired_entries);
    Ok(())
}
