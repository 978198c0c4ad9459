//! src/services/repository.rs
//!
//! Repository: the host persistence layer. Every content read, save and
//! delete runs through the lifecycle hooks of the metadata behavior:
//!
//! - reads: `pre_read` merges the row filter into the query
//! - saves: `pre_save` → insert/update → `post_save`
//! - deletes: `pre_delete` → delete → `post_delete`

use crate::behavior::{
    CallerContext, ContentRecord, Criteria, LifecycleInterceptor, MetaError, MetaResult,
    TreeNavigator, criteria::CONTENT_ALIAS,
};
use crate::models::metadata::MetadataRecord;
use crate::services::record_store::SqliteStore;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Repository {
    store: SqliteStore,
    interceptor: Arc<LifecycleInterceptor>,
}

impl Repository {
    pub fn new(store: SqliteStore, interceptor: LifecycleInterceptor) -> Self {
        Self {
            store,
            interceptor: Arc::new(interceptor),
        }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn interceptor(&self) -> &LifecycleInterceptor {
        &self.interceptor
    }

    /// Rows of `E` matching `criteria` that the caller may read.
    pub async fn find_all<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        mut criteria: Criteria,
    ) -> MetaResult<Vec<E>> {
        self.interceptor.pre_read::<E>(caller, &mut criteria)?;
        self.store.find_all::<E>(&criteria).await
    }

    pub async fn find_by_id<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        id: i64,
    ) -> MetaResult<Option<E>> {
        let criteria = Criteria::new()
            .where_eq(format!("{}.id", CONTENT_ALIAS), id)
            .limit(1);
        Ok(self.find_all::<E>(caller, criteria).await?.into_iter().next())
    }

    /// Insert or update `record`, maintaining its metadata. Returns the
    /// metadata row written by `post_save`, if any.
    pub async fn save<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        record: &mut E,
    ) -> MetaResult<Option<MetadataRecord>> {
        self.interceptor.pre_save(caller, record).await?;
        if record.id().is_some() {
            record.update(&self.store.db).await?;
        } else {
            record.insert(&self.store.db).await?;
        }
        debug!(model = E::MODEL, id = ?record.id(), "content saved");
        self.interceptor.post_save(caller, record).await
    }

    /// Load a readable record, check the update role against its stored
    /// state, apply `change` and save.
    pub async fn update_with<E, F>(
        &self,
        caller: &CallerContext,
        id: i64,
        change: F,
    ) -> MetaResult<(E, Option<MetadataRecord>)>
    where
        E: ContentRecord,
        F: FnOnce(&mut E) + Send,
    {
        let mut record = self
            .find_by_id::<E>(caller, id)
            .await?
            .ok_or_else(|| MetaError::NotFound(format!("{} #{}", E::MODEL, id)))?;
        self.interceptor.pre_save(caller, &record).await?;
        change(&mut record);
        record.update(&self.store.db).await?;
        debug!(model = E::MODEL, id, "content updated");
        let metadata = self.interceptor.post_save(caller, &record).await?;
        Ok((record, metadata))
    }

    pub async fn delete<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        record: &E,
    ) -> MetaResult<()> {
        let id = record.id().ok_or_else(|| MetaError::MissingIdentity {
            model: E::MODEL.to_string(),
        })?;
        let pending = self.interceptor.pre_delete(caller, record).await?;
        let removed = self.store.delete_row(E::TABLE, id).await?;
        if removed == 0 {
            // Nothing to compensate for if the row was already gone.
            return Err(MetaError::NotFound(format!("{} #{}", E::MODEL, id)));
        }
        debug!(model = E::MODEL, id, "content deleted");
        self.interceptor.post_delete(pending).await
    }

    pub fn navigator<'a, E: ContentRecord>(
        &'a self,
        caller: &'a CallerContext,
        record: &'a E,
    ) -> TreeNavigator<'a, E> {
        TreeNavigator::new(self, caller, record)
    }
}
