//! `quilld` — the Quill article API server binary.
//!
//! Usage:
//!   quilld [--data-dir <dir>] [--db <path>] [--listen <addr>]

mod cors;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use quill_core::Module;
use tracing::info;

/// Quill article API server.
#[derive(Parser, Debug)]
#[command(name = "quilld", about = "Quill article API server")]
struct Cli {
    /// Data directory for the embedded database.
    #[arg(long = "data-dir", default_value = "./data")]
    data_dir: PathBuf,

    /// Path to the redb database file (overrides `{data-dir}/data.redb`).
    #[arg(long = "db")]
    db: Option<PathBuf>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = quill_core::ServiceConfig {
        data_dir: Some(cli.data_dir.clone()),
        db_path: cli.db.clone(),
        listen: cli.listen.clone(),
    };

    // Initialize the embedded store.
    std::fs::create_dir_all(&cli.data_dir)?;
    let db_path = config.resolve_db_path();
    let kv: Arc<dyn quill_kv::KVStore> = Arc::new(
        quill_kv::RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store at {}: {}", db_path.display(), e))?,
    );

    let blog = quill_blog::BlogModule::new(Arc::clone(&kv));
    info!("{} module initialized", blog.name());

    // Build router.
    let app = routes::build_router(vec![blog.routes()]);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("quilld listening on {}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
