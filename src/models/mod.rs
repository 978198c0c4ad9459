//! Data models persisted in SQLite.
//!
//! `Page` and `Attachment` are content records; `MetadataRecord` is the
//! companion row that carries status, audit and access attributes for them.
//! All map to tables via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod attachment;
pub mod metadata;
pub mod page;

use crate::behavior::{ContentRecord, ModelDef, RelationKey};
use attachment::Attachment;
use metadata::MetadataRecord;
use page::Page;

/// Model declarations of the host service.
pub fn model_defs() -> Vec<ModelDef> {
    vec![
        ModelDef::metadata(MetadataRecord::MODEL, MetadataRecord::TABLE),
        ModelDef::content(Page::MODEL, Page::TABLE)
            .relation("metadata", MetadataRecord::MODEL, RelationKey::SameId)
            .addressed_by("metadata"),
        ModelDef::content(Attachment::MODEL, Attachment::TABLE)
            .relation("page", Page::MODEL, RelationKey::ForeignKey("page_id".into()))
            .addressed_by("page.metadata"),
    ]
}
