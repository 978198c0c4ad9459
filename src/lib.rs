//! record-meta: companion metadata (status, audit trail, ownership, guid,
//! row-level permissions, tree position) for arbitrary SQLite-backed records.

pub mod behavior;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use behavior::{Authorizer, LifecycleInterceptor, MetaResult, MetadataSettings, Registry};
use services::{record_store::SqliteStore, repository::Repository};
use std::sync::Arc;

/// Wire the host's models into a repository over `store`.
pub fn build_repository(
    store: SqliteStore,
    authorizer: Arc<dyn Authorizer>,
    settings: MetadataSettings,
) -> MetaResult<Repository> {
    let registry = Arc::new(Registry::new(models::model_defs())?);
    let interceptor = LifecycleInterceptor::new(registry, store.clone(), authorizer, settings);
    Ok(Repository::new(store, interceptor))
}
