use anyhow::{Context, Result};
use axum::Router;
use record_meta::{
    behavior::{CallerContext, RoleAuthorizer},
    build_repository,
    config::{AppConfig, RunMode},
    models::page::Page,
    routes,
    services::{record_store::SqliteStore, repository::Repository},
};
use serde::Deserialize;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting record-meta with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db_url = &cfg.database_url;
    tracing::debug!("Connecting using raw URL => {}", db_url);

    // Create parent directory of a file database if needed
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if !db_path.is_empty() && !db_path.contains(":memory:") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
    }

    let store = SqliteStore::connect(db_url, 5).await?;

    // --- Handle migration mode ---
    if mode == RunMode::Migrate {
        store.migrate().await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core service ---
    let repo = build_repository(store, Arc::new(RoleAuthorizer), cfg.metadata.clone())?;

    if let RunMode::Import(path) = &mode {
        let count = import_pages(&repo, path).await?;
        tracing::info!("Imported {} pages from {}", count, path.display());
        return Ok(());
    }

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(repo);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct ImportedPage {
    title: String,
    #[serde(default)]
    body: String,
}

/// Save every page of a JSON array in the batch context: no role checks,
/// metadata attributed to the system user.
async fn import_pages(repo: &Repository, path: &Path) -> Result<usize> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading import file {}", path.display()))?;
    let entries: Vec<ImportedPage> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing import file {}", path.display()))?;

    let caller = CallerContext::Batch;
    for entry in &entries {
        let mut page = Page::new(entry.title.clone(), entry.body.clone());
        repo.save(&caller, &mut page).await?;
        tracing::debug!("Imported page {:?}", page.id);
    }
    Ok(entries.len())
}
