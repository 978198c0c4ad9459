//! Companion metadata attached to content records.

use crate::behavior::ContentRecord;
use crate::services::record_store;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Lifecycle status. Codes leave room between values; no transitions are
/// enforced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum Status {
    Deleted = 0,
    Draft = 10,
    Pending = 20,
    Active = 30,
    Locked = 40,
    Hidden = 50,
    Archived = 60,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Status, audit trail, ownership, row permissions and tree position of one
/// content record. Shares its `id` with that record.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct MetadataRecord {
    pub id: i64,
    pub status: Status,
    /// Locale code or `_ALL_`.
    pub language: String,
    pub owner: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<i64>,
    /// Assigned once on creation.
    pub guid: String,
    /// Model name of the owning content record.
    pub model: String,
    pub check_access_read: Option<String>,
    pub check_access_update: Option<String>,
    pub check_access_delete: Option<String>,
    pub tree_parent_id: Option<i64>,
    pub tree_position: i64,
}

#[async_trait]
impl ContentRecord for MetadataRecord {
    const MODEL: &'static str = "Metadata";
    const TABLE: &'static str = "metadata";

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn as_metadata(&self) -> Option<&MetadataRecord> {
        Some(self)
    }

    async fn insert(&mut self, db: &SqlitePool) -> sqlx::Result<()> {
        record_store::insert_metadata(db, Self::TABLE, self).await
    }

    async fn update(&self, db: &SqlitePool) -> sqlx::Result<()> {
        record_store::update_metadata(db, Self::TABLE, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let codes: Vec<i32> = [
            Status::Deleted,
            Status::Draft,
            Status::Pending,
            Status::Active,
            Status::Locked,
            Status::Hidden,
            Status::Archived,
        ]
        .iter()
        .map(|s| s.code())
        .collect();
        assert_eq!(codes, vec![0, 10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_status_serializes_by_name() {
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"Active\"");
        let parsed: Status = serde_json::from_str("\"Archived\"").unwrap();
        assert_eq!(parsed, Status::Archived);
    }
}
