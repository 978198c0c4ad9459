//! HTTP handlers for metadata rows.
//!
//! The metadata table carries the behavior on itself (`_self_` addressing):
//! reads are filtered by the row's own `check_access_read` and edits need the
//! row's own `check_access_update`.

use crate::{
    behavior::{CallerContext, ContentRecord},
    errors::AppError,
    models::metadata::{MetadataRecord, Status},
    services::repository::Repository,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Deserializer};

/// Body of `PATCH /metadata/{id}`. Absent fields are left alone; `null`
/// clears a nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct MetadataPatch {
    pub status: Option<Status>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub owner: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_access_read: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_access_update: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub check_access_delete: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tree_parent_id: Option<Option<i64>>,
    pub tree_position: Option<i64>,
}

impl MetadataPatch {
    fn apply(self, record: &mut MetadataRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(language) = self.language {
            record.language = language;
        }
        if let Some(owner) = self.owner {
            record.owner = owner;
        }
        if let Some(role) = self.check_access_read {
            record.check_access_read = role;
        }
        if let Some(role) = self.check_access_update {
            record.check_access_update = role;
        }
        if let Some(role) = self.check_access_delete {
            record.check_access_delete = role;
        }
        if let Some(parent) = self.tree_parent_id {
            record.tree_parent_id = parent;
        }
        if let Some(position) = self.tree_position {
            record.tree_position = position;
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// GET `/metadata/{id}`
pub async fn get_metadata(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
) -> Result<Json<MetadataRecord>, AppError> {
    let record = repo
        .find_by_id::<MetadataRecord>(&caller, id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("{} #{} not found", MetadataRecord::MODEL, id))
        })?;
    Ok(Json(record))
}

/// PATCH `/metadata/{id}`: edit status, ownership, access roles or tree
/// position. The update role is checked against the stored row.
pub async fn update_metadata(
    State(repo): State<Repository>,
    caller: CallerContext,
    Path(id): Path<i64>,
    Json(patch): Json<MetadataPatch>,
) -> Result<Json<MetadataRecord>, AppError> {
    let (record, _) = repo
        .update_with::<MetadataRecord, _>(&caller, id, move |record| patch.apply(record))
        .await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let patch: MetadataPatch =
            serde_json::from_str(r#"{"check_access_read": null, "tree_position": 3}"#).unwrap();
        assert_eq!(patch.check_access_read, Some(None));
        assert_eq!(patch.check_access_update, None);
        assert_eq!(patch.tree_position, Some(3));

        let patch: MetadataPatch =
            serde_json::from_str(r#"{"check_access_update": "Editor", "status": "Locked"}"#)
                .unwrap();
        assert_eq!(patch.check_access_update, Some(Some("Editor".to_string())));
        assert_eq!(patch.status, Some(Status::Locked));
    }
}
