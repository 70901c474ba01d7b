use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use reelmate_core::service::ReelmateEngine;
use reelmate_core::storage::sqlite::SqliteStorage;
use reelmate_core::storage::StorageBackend;

#[derive(Parser)]
#[command(
    name = "reelmate",
    about = "Social film-catalog backend: users, friendships, and MPA ratings over HTTP"
)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "reelmate.db", env = "REELMATE_DB_PATH")]
    db_path: PathBuf,

    /// PostgreSQL connection URL (enables the PostgreSQL backend instead of SQLite)
    #[arg(long, env = "REELMATE_POSTGRES_URL")]
    postgres_url: Option<String>,

    /// Address to bind the HTTP server on
    #[arg(long, default_value = "0.0.0.0:8080", env = "REELMATE_LISTEN_ADDR")]
    listen_addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reelmate_core=info".parse()?)
                .add_directive("reelmate_rest=info".parse()?)
                .add_directive("reelmate_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build storage based on backend selection
    let storage: Arc<dyn StorageBackend> = if let Some(_pg_url) = &cli.postgres_url {
        #[cfg(feature = "postgres")]
        {
            tracing::info!("Using PostgreSQL backend");
            Arc::new(reelmate_postgres::PgStorage::connect(_pg_url).await?)
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err("PostgreSQL support not enabled. Rebuild with --features postgres".into());
        }
    } else {
        let storage = SqliteStorage::open(&cli.db_path).await?;
        tracing::info!("Database opened at {:?}", cli.db_path);
        Arc::new(storage)
    };

    let engine = Arc::new(ReelmateEngine::new(storage));
    let app = reelmate_rest::router(engine);

    let listener = tokio::net::TcpListener::bind(&cli.listen_addr).await?;
    tracing::info!("REST API listening on {}", cli.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        return;
    }
    tracing::info!("Received shutdown signal");
}
