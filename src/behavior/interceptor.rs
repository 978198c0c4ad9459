//! Lifecycle hooks run by the host persistence layer around every read, save
//! and delete of a content record.
//!
//! Content and metadata are written by separate statements. When the
//! metadata step fails after the content change has gone through, the hook
//! logs the inconsistency and returns [`MetaError::Inconsistent`]; nothing is
//! rolled back.

use crate::behavior::ContentRecord;
use crate::behavior::access::build_read_predicate;
use crate::behavior::caller::{Authorizer, CallerContext};
use crate::behavior::criteria::Criteria;
use crate::behavior::error::{MetaError, MetaResult, Operation};
use crate::behavior::resolver::MetadataResolver;
use crate::behavior::schema::{Addressing, Registry};
use crate::behavior::settings::MetadataSettings;
use crate::models::metadata::{MetadataRecord, Status};
use crate::services::record_store::SqliteStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Metadata row captured before a content delete, removed after it.
#[derive(Debug, Default)]
#[must_use = "pass the pending delete to `post_delete` once the content row is gone"]
pub struct PendingDelete {
    target: Option<(String, MetadataRecord)>,
}

impl PendingDelete {
    pub fn metadata(&self) -> Option<&MetadataRecord> {
        self.target.as_ref().map(|(_, record)| record)
    }
}

#[derive(Clone)]
pub struct LifecycleInterceptor {
    registry: Arc<Registry>,
    store: SqliteStore,
    authorizer: Arc<dyn Authorizer>,
    settings: MetadataSettings,
}

impl LifecycleInterceptor {
    pub fn new(
        registry: Arc<Registry>,
        store: SqliteStore,
        authorizer: Arc<dyn Authorizer>,
        settings: MetadataSettings,
    ) -> Self {
        Self {
            registry,
            store,
            authorizer,
            settings,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &MetadataSettings {
        &self.settings
    }

    pub fn resolver(&self) -> MetadataResolver<'_> {
        MetadataResolver::new(&self.registry, &self.store)
    }

    /// Merges the read-access predicate into an outgoing query.
    pub fn pre_read<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        criteria: &mut Criteria,
    ) -> MetaResult<()> {
        if caller.is_batch() {
            info!(model = E::MODEL, "read filter omitted in batch context");
            return Ok(());
        }
        let addressing = self.registry.addressing(E::MODEL)?;
        criteria.restrict(build_read_predicate(caller, addressing));
        Ok(())
    }

    /// Rejects the save when the existing metadata requires an update role the
    /// caller does not hold. First saves are never rejected here.
    pub async fn pre_save<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        record: &E,
    ) -> MetaResult<()> {
        if caller.is_batch() {
            info!(model = E::MODEL, "update check omitted in batch context");
            return Ok(());
        }
        let Some(metadata) = self.resolver().resolve(record).await? else {
            return Ok(());
        };
        self.require(caller, Operation::Update, E::MODEL, &metadata, |m| {
            m.check_access_update.as_deref()
        })
    }

    /// Creates the metadata row on first save, otherwise stamps the
    /// modification audit. Returns the row as persisted.
    pub async fn post_save<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        record: &E,
    ) -> MetaResult<Option<MetadataRecord>> {
        let addressing = self.registry.addressing(E::MODEL)?;
        // A metadata table never gets metadata of its own.
        if addressing.is_self() {
            return Ok(None);
        }

        let (acting_user, primary_role) = if caller.is_batch() {
            info!(model = E::MODEL, "metadata attributed to system user in batch context");
            (Some(self.settings.system_user_id), None)
        } else {
            (caller.user_id(), caller.primary_role().map(str::to_string))
        };

        let id = record.id().ok_or_else(|| MetaError::MissingIdentity {
            model: E::MODEL.to_string(),
        })?;
        let table = self.registry.metadata_table(E::MODEL)?.to_string();
        let now = Utc::now();

        let (metadata, written) = match self.resolver().resolve(record).await? {
            Some(mut metadata) => {
                metadata.modified_at = Some(now);
                metadata.modified_by = acting_user;
                let written = self
                    .store
                    .touch_metadata(&table, metadata.id, now, acting_user)
                    .await;
                (metadata, written)
            }
            None if matches!(addressing, Addressing::Path(_)) => {
                warn!(
                    model = E::MODEL,
                    id, "metadata path has no row to borrow; nothing created"
                );
                return Ok(None);
            }
            None => {
                let role = primary_role.filter(|_| self.settings.assign_primary_role);
                let metadata = MetadataRecord {
                    id,
                    status: Status::Active,
                    language: self.settings.default_language.clone(),
                    owner: acting_user,
                    created_at: now,
                    created_by: acting_user,
                    modified_at: None,
                    modified_by: None,
                    guid: self.settings.guid_format.generate(),
                    model: E::MODEL.to_string(),
                    check_access_read: None,
                    check_access_update: role.clone(),
                    check_access_delete: role,
                    tree_parent_id: None,
                    tree_position: 0,
                };
                let written = self.store.insert_metadata(&table, &metadata).await;
                debug!(model = E::MODEL, id, guid = %metadata.guid, "metadata created");
                (metadata, written)
            }
        };

        match written {
            Ok(()) => Ok(Some(metadata)),
            Err(source) => {
                error!(
                    model = E::MODEL,
                    id,
                    error = %source,
                    "content saved but metadata was not written"
                );
                Err(MetaError::Inconsistent {
                    model: E::MODEL.to_string(),
                    id,
                    operation: "save",
                    source,
                })
            }
        }
    }

    /// Rejects the delete when the metadata requires a delete role the caller
    /// does not hold; otherwise remembers the metadata row for removal.
    pub async fn pre_delete<E: ContentRecord>(
        &self,
        caller: &CallerContext,
        record: &E,
    ) -> MetaResult<PendingDelete> {
        let Some(metadata) = self.resolver().resolve(record).await? else {
            return Ok(PendingDelete::default());
        };
        self.require(caller, Operation::Delete, E::MODEL, &metadata, |m| {
            m.check_access_delete.as_deref()
        })?;

        match self.registry.addressing(E::MODEL)? {
            // Deleting the row deletes the metadata.
            Addressing::SelfReferential => Ok(PendingDelete::default()),
            // The metadata belongs to the record the path runs through.
            Addressing::Path(_) => Ok(PendingDelete::default()),
            Addressing::Relation(_) => {
                let table = self.registry.metadata_table(E::MODEL)?.to_string();
                Ok(PendingDelete {
                    target: Some((table, metadata)),
                })
            }
        }
    }

    /// Removes the metadata row captured by `pre_delete`.
    pub async fn post_delete(&self, pending: PendingDelete) -> MetaResult<()> {
        let Some((table, metadata)) = pending.target else {
            return Ok(());
        };
        match self.store.delete_row(&table, metadata.id).await {
            Ok(_) => {
                debug!(model = %metadata.model, id = metadata.id, "metadata deleted");
                Ok(())
            }
            Err(source) => {
                error!(
                    model = %metadata.model,
                    id = metadata.id,
                    error = %source,
                    "content deleted but metadata row remains"
                );
                Err(MetaError::Inconsistent {
                    model: metadata.model,
                    id: metadata.id,
                    operation: "delete",
                    source,
                })
            }
        }
    }

    fn require(
        &self,
        caller: &CallerContext,
        operation: Operation,
        model: &str,
        metadata: &MetadataRecord,
        rule: impl Fn(&MetadataRecord) -> Option<&str>,
    ) -> MetaResult<()> {
        match rule(metadata) {
            Some(role) if !self.authorizer.check_access(caller, role) => {
                info!(model, id = metadata.id, %operation, role, "operation denied");
                Err(MetaError::Authorization {
                    operation,
                    model: model.to_string(),
                    id: metadata.id,
                    role: role.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
