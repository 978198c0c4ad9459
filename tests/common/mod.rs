//! Common test utilities and fixtures.

#![allow(dead_code)]

use record_meta::{
    behavior::{CallerContext, MetadataSettings, RoleAuthorizer},
    build_repository,
    models::{metadata::MetadataRecord, page::Page},
    services::{record_store::SqliteStore, repository::Repository},
};
use std::sync::Arc;

pub const SUPERUSER: &str = "Superuser";

/// In-memory store with the schema applied.
pub async fn test_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    store.migrate().await.expect("Migration failed");
    store
}

pub async fn test_repo() -> Repository {
    test_repo_with(MetadataSettings::default()).await
}

pub async fn test_repo_with(settings: MetadataSettings) -> Repository {
    build_repository(test_store().await, Arc::new(RoleAuthorizer), settings)
        .expect("Failed to build repository")
}

pub fn user(id: i64, roles: &[&str]) -> CallerContext {
    CallerContext::user(id, roles.iter().map(|r| r.to_string()).collect(), SUPERUSER)
}

pub fn superuser() -> CallerContext {
    user(1, &[SUPERUSER])
}

/// Create a page as `caller`, returning it with its id set.
pub async fn create_page(repo: &Repository, caller: &CallerContext, title: &str) -> Page {
    let mut page = Page::new(title, format!("body of {}", title));
    repo.save(caller, &mut page).await.expect("Save failed");
    page
}

pub async fn metadata_of(repo: &Repository, id: i64) -> Option<MetadataRecord> {
    repo.store()
        .find_metadata("metadata", id)
        .await
        .expect("Metadata lookup failed")
}

/// Edit a metadata row directly, bypassing the behavior.
pub async fn edit_metadata(repo: &Repository, id: i64, edit: impl FnOnce(&mut MetadataRecord)) {
    let mut record = metadata_of(repo, id).await.expect("Metadata not found");
    edit(&mut record);
    repo.store()
        .update_metadata("metadata", &record)
        .await
        .expect("Metadata update failed");
}

pub async fn page_titles(repo: &Repository, caller: &CallerContext) -> Vec<String> {
    use record_meta::behavior::Criteria;
    repo.find_all::<Page>(caller, Criteria::new().order_by("t.id ASC"))
        .await
        .expect("Query failed")
        .into_iter()
        .map(|p| p.title)
        .collect()
}
