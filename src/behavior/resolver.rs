//! Locates the metadata row that belongs to a content record.

use crate::behavior::ContentRecord;
use crate::behavior::error::{MetaError, MetaResult};
use crate::behavior::schema::{Addressing, Registry, RelationKey, RelationStep};
use crate::models::metadata::MetadataRecord;
use crate::services::record_store::SqliteStore;

/// Read-only lookup; never creates rows.
pub struct MetadataResolver<'a> {
    registry: &'a Registry,
    store: &'a SqliteStore,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(registry: &'a Registry, store: &'a SqliteStore) -> Self {
        Self { registry, store }
    }

    /// Returns the companion metadata of `record`, or `None` when any hop of
    /// its addressing path has no row.
    pub async fn resolve<E: ContentRecord>(&self, record: &E) -> MetaResult<Option<MetadataRecord>> {
        match self.registry.addressing(E::MODEL)? {
            Addressing::SelfReferential => record.as_metadata().cloned().map(Some).ok_or_else(|| {
                MetaError::config(format!(
                    "model `{}` is addressed as its own metadata but is not a metadata record",
                    E::MODEL
                ))
            }),
            Addressing::Relation(step) => self.walk(record, std::slice::from_ref(step)).await,
            Addressing::Path(steps) => self.walk(record, steps).await,
        }
    }

    async fn walk<E: ContentRecord>(
        &self,
        record: &E,
        steps: &[RelationStep],
    ) -> MetaResult<Option<MetadataRecord>> {
        let Some((terminal, intermediate)) = steps.split_last() else {
            return Ok(None);
        };

        // The first hop reads from the in-memory record so unsaved rows resolve too.
        let mut current = match &steps[0].key {
            RelationKey::SameId => record.id(),
            RelationKey::ForeignKey(column) => record.foreign_key(column),
        };

        for (index, step) in intermediate.iter().enumerate() {
            let Some(id) = current else {
                return Ok(None);
            };
            if !self.store.exists(&step.target_table, id).await? {
                return Ok(None);
            }
            current = match steps.get(index + 1).map(|next| &next.key) {
                Some(RelationKey::ForeignKey(column)) => {
                    self.store.foreign_key(&step.target_table, column, id).await?
                }
                _ => Some(id),
            };
        }

        match current {
            Some(id) => self.store.find_metadata(&terminal.target_table, id).await,
            None => Ok(None),
        }
    }
}
