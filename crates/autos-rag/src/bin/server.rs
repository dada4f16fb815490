//! Service binary
//!
//! Run with: cargo run -p autos-rag --bin autos-rag-server

use autos_rag::{config::AutosConfig, server::AutosServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autos_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("AUTOS_RAG_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "loading configuration file");
            AutosConfig::from_file(path)?
        }
        Err(_) => AutosConfig::default(),
    };

    tracing::info!("configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - embedding model: {}", config.llm.embed_model);
    tracing::info!("  - database: {}", config.storage.db_path.display());
    tracing::info!(
        "  - retention: every {}s, keep {}h",
        config.retention.sweep_interval_secs,
        config.retention.max_age_hours
    );

    let server = AutosServer::new(config)?;

    println!("Server starting on http://{}", server.address());
    println!("Endpoints:");
    println!("  POST /api/extract              - segment a merged export");
    println!("  POST /api/ingest               - run the ingestion batch");
    println!("  POST /api/contexts/:id/review  - bulk natureza review");
    println!("  POST /api/query                - ask a question");
    println!("  GET  /api/contexts/:id/documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;
    Ok(())
}
