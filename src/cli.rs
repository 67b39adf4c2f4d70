// src/cli.rs
use crate::api::signal_router;
use crate::config::AppConfig;
use crate::database::memory::InMemorySignalStore;
use crate::database::models::NewSignalRecord;
use crate::database::postgres::PostgresManager;
use crate::database::store::SignalStore;
use crate::service::dto::{SignalQueryRequest, SummaryRequest};
use crate::service::SignalService;
use crate::utils::utils::{format_time, truncate_string};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "signal-query-service")]
#[command(about = "Query service for stored trading signals", long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overrides server.host/server.port
        #[arg(short, long)]
        bind: Option<String>,

        /// Serve from an in-process store instead of PostgreSQL
        #[arg(long)]
        memory: bool,

        /// JSON file of signals to load into the in-process store
        #[arg(long, requires = "memory")]
        seed: Option<PathBuf>,
    },

    /// Create the signals table and its indices
    InitDb,

    /// Import signals from a JSON array file
    Import {
        /// Input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Search signals, newest first
    Search {
        /// Symbol (e.g., "XAUUSD")
        #[arg(short, long)]
        symbol: Option<String>,

        /// Model name (e.g., "lstm-v2")
        #[arg(short, long)]
        model: Option<String>,

        /// Start of the range (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// End of the range (RFC 3339)
        #[arg(long)]
        to: Option<String>,

        /// Page number, starting at 0
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        size: Option<u32>,
    },

    /// List distinct symbols
    Symbols,

    /// List distinct model names
    Models,

    /// Count BUY/SELL/HOLD signals per day, week or month
    Summary {
        /// Symbol (e.g., "XAUUSD")
        #[arg(short, long)]
        symbol: Option<String>,

        /// Model name (e.g., "lstm-v2")
        #[arg(short, long)]
        model: Option<String>,

        /// Start of the range (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// End of the range (RFC 3339)
        #[arg(long)]
        to: Option<String>,

        /// Bucket size: day, week or month
        #[arg(short, long, default_value = "day")]
        group_by: String,
    },
}

/// Connect to PostgreSQL using the loaded configuration
pub async fn create_postgres(config: &AppConfig) -> Result<Arc<PostgresManager>> {
    let pg = PostgresManager::new(&config.database)
        .await
        .context("Failed to create database connection pool")?;
    Ok(Arc::new(pg))
}

/// Read a JSON array of signals from disk
pub fn read_signal_file(path: &Path) -> Result<Vec<NewSignalRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<NewSignalRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse signals from {}", path.display()))?;
    Ok(records)
}

async fn serve(config: &AppConfig, bind: Option<String>, memory: bool, seed: Option<PathBuf>) -> Result<()> {
    let store: Arc<dyn SignalStore> = if memory {
        let store = InMemorySignalStore::new();
        if let Some(seed) = seed {
            let records = read_signal_file(&seed)?;
            store.insert_batch(&records).await?;
            info!("Seeded in-memory store with {} signals from {}", store.len(), seed.display());
        }
        Arc::new(store)
    } else {
        create_postgres(config).await?
    };

    let service = Arc::new(SignalService::new(store));
    let app = signal_router(service);

    let address = bind.unwrap_or_else(|| config.server.bind_address());
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Signal query service listening on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Signal query service shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Execute a command from the CLI
pub async fn execute_command(config: &AppConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Serve { bind, memory, seed } => {
            serve(config, bind, memory, seed).await?;
        }

        Commands::InitDb => {
            let pg = create_postgres(config).await?;
            pg.init_tables().await?;
            println!("Database schema is ready.");
        }

        Commands::Import { file } => {
            let records = read_signal_file(&file)?;
            let pg = create_postgres(config).await?;
            let stored = pg.insert_batch(&records).await?;
            println!("Imported {} signals from {}", stored.len(), file.display());
        }

        Commands::Search { symbol, model, from, to, page, size } => {
            let service = SignalService::new(create_postgres(config).await?);
            let request = SignalQueryRequest {
                symbol,
                model_name: model,
                from,
                to,
                page,
                size,
            };
            let result = service.search(&request).await?;

            if result.is_empty() {
                println!("No signals found ({} matching in total)", result.total_elements);
                return Ok(());
            }

            println!(
                "Page {} of {} ({} signals total):",
                result.page + 1,
                result.total_pages.max(1),
                result.total_elements
            );
            println!("{:<25} | {:<12} | {:<20} | {:<6} | {:<6} | {:>12} | {:>10}",
                     "Time", "Symbol", "Model", "Asset", "Signal", "Price", "Confidence");
            println!("{:-<25}-+-{:-<12}-+-{:-<20}-+-{:-<6}-+-{:-<6}-+-{:-<12}-+-{:-<10}", "", "", "", "", "", "", "");

            for signal in result.content {
                println!("{:<25} | {:<12} | {:<20} | {:<6} | {:<6} | {:>12} | {:>10}",
                         format_time(&signal.ts),
                         truncate_string(&signal.symbol, 12),
                         truncate_string(&signal.model_name, 20),
                         signal.asset_type,
                         signal.signal,
                         signal.price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                         signal.confidence.map(|c| format!("{:.3}", c)).unwrap_or_else(|| "-".to_string()));
            }
        }

        Commands::Symbols => {
            let service = SignalService::new(create_postgres(config).await?);
            for symbol in service.distinct_symbols().await? {
                println!("{}", symbol);
            }
        }

        Commands::Models => {
            let service = SignalService::new(create_postgres(config).await?);
            for model in service.distinct_models().await? {
                println!("{}", model);
            }
        }

        Commands::Summary { symbol, model, from, to, group_by } => {
            let service = SignalService::new(create_postgres(config).await?);
            let request = SummaryRequest {
                symbol,
                model_name: model,
                from,
                to,
                group_by: Some(group_by),
            };
            let buckets = service.summary(&request).await?;

            println!("{:<12} | {:>8} | {:>8} | {:>8} | {:>8} | {:>8}", "Bucket", "Buy", "Sell", "Hold", "Net", "Total");
            println!("{:-<12}-+-{:-<8}-+-{:-<8}-+-{:-<8}-+-{:-<8}-+-{:-<8}", "", "", "", "", "", "");

            for bucket in buckets {
                println!("{:<12} | {:>8} | {:>8} | {:>8} | {:>8} | {:>8}",
                         bucket.bucket, bucket.buy, bucket.sell, bucket.hold, bucket.net, bucket.total);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_summary_with_default_group_by() {
        let cli = Cli::parse_from(["signal-query-service", "summary", "--symbol", "XAUUSD"]);
        match cli.command {
            Commands::Summary { symbol, group_by, .. } => {
                assert_eq!(symbol.as_deref(), Some("XAUUSD"));
                assert_eq!(group_by, "day");
            }
            _ => panic!("expected summary command"),
        }
    }

    #[test]
    fn seed_requires_memory_flag() {
        let parsed = Cli::try_parse_from(["signal-query-service", "serve", "--seed", "signals.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn read_signal_file_parses_array() {
        let path = std::env::temp_dir().join(format!("signals-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"symbol":"XAGUSD","modelName":"lstm","assetType":"SILVER","signal":"HOLD","ts":"2025-05-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let records = read_signal_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "XAGUSD");
    }

    #[test]
    fn bundled_demo_signals_are_valid() {
        let records = read_signal_file(Path::new("demos/sample_signals.json")).unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }
}
