//! src/services/record_store.rs
//!
//! SqliteStore: the persistence collaborator of the metadata behavior.
//! Table and column names come from the registry (validated identifiers);
//! every value is bound as a parameter.

use crate::behavior::{ContentRecord, Criteria, MetaResult};
use crate::models::metadata::MetadataRecord;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use tracing::debug;

const MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

const METADATA_COLUMNS: &str = "id, status, language, owner, created_at, created_by, \
     modified_at, modified_by, guid, model, check_access_read, check_access_update, \
     check_access_delete, tree_parent_id, tree_position";

#[derive(Clone)]
pub struct SqliteStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl SqliteStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open a pool on `url`. In-memory databases get a single, never-recycled
    /// connection so every query sees the same database.
    pub async fn connect(url: &str, max_connections: u32) -> MetaResult<Self> {
        let options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = options.connect(url).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Run the embedded schema statements. Idempotent.
    pub async fn migrate(&self) -> MetaResult<()> {
        let statements = MIGRATION
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }

    /// Lightweight connectivity check (`SELECT 1`).
    pub async fn ping(&self) -> MetaResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }

    pub async fn exists(&self, table: &str, id: i64) -> MetaResult<bool> {
        let row = sqlx::query_scalar::<_, i64>(&format!("SELECT 1 FROM {} WHERE id = ?", table))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(row.is_some())
    }

    /// Value of `column` on row `id`; `None` if the row is missing or the
    /// column is NULL.
    pub async fn foreign_key(&self, table: &str, column: &str, id: i64) -> MetaResult<Option<i64>> {
        let value = sqlx::query_scalar::<_, Option<i64>>(&format!(
            "SELECT {} FROM {} WHERE id = ?",
            column, table
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(value.flatten())
    }

    pub async fn find_metadata(&self, table: &str, id: i64) -> MetaResult<Option<MetadataRecord>> {
        let record = sqlx::query_as::<_, MetadataRecord>(&format!(
            "SELECT {} FROM {} WHERE id = ?",
            METADATA_COLUMNS, table
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(record)
    }

    pub async fn insert_metadata(&self, table: &str, record: &MetadataRecord) -> sqlx::Result<()> {
        insert_metadata(&self.db, table, record).await
    }

    pub async fn update_metadata(&self, table: &str, record: &MetadataRecord) -> sqlx::Result<()> {
        update_metadata(&self.db, table, record).await
    }

    /// Stamps the modification audit of row `id`, leaving every other column
    /// as stored.
    pub async fn touch_metadata(
        &self,
        table: &str,
        id: i64,
        modified_at: DateTime<Utc>,
        modified_by: Option<i64>,
    ) -> sqlx::Result<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET modified_at = ?, modified_by = ? WHERE id = ?",
            table
        ))
        .bind(modified_at)
        .bind(modified_by)
        .bind(id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    /// Delete row `id` from `table`, returning the number of rows removed.
    pub async fn delete_row(&self, table: &str, id: i64) -> sqlx::Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Load content rows matching `criteria`. No access filtering happens
    /// here; callers go through the lifecycle hooks first.
    pub async fn find_all<E: ContentRecord>(&self, criteria: &Criteria) -> MetaResult<Vec<E>> {
        let mut builder = QueryBuilder::<Sqlite>::new("");
        criteria.push_select(E::TABLE, &mut builder);
        debug!(model = E::MODEL, sql = builder.sql(), "content query");
        let rows = builder.build_query_as::<E>().fetch_all(&*self.db).await?;
        Ok(rows)
    }
}

pub(crate) async fn insert_metadata(
    db: &SqlitePool,
    table: &str,
    record: &MetadataRecord,
) -> sqlx::Result<()> {
    sqlx::query(&format!(
        "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        table, METADATA_COLUMNS
    ))
    .bind(record.id)
    .bind(record.status)
    .bind(&record.language)
    .bind(record.owner)
    .bind(record.created_at)
    .bind(record.created_by)
    .bind(record.modified_at)
    .bind(record.modified_by)
    .bind(&record.guid)
    .bind(&record.model)
    .bind(&record.check_access_read)
    .bind(&record.check_access_update)
    .bind(&record.check_access_delete)
    .bind(record.tree_parent_id)
    .bind(record.tree_position)
    .execute(db)
    .await?;
    Ok(())
}

/// Writes the mutable columns. `guid`, `model` and the creation audit are
/// never rewritten.
pub(crate) async fn update_metadata(
    db: &SqlitePool,
    table: &str,
    record: &MetadataRecord,
) -> sqlx::Result<()> {
    let result = sqlx::query(&format!(
        "UPDATE {} SET status = ?, language = ?, owner = ?, modified_at = ?, modified_by = ?, \
         check_access_read = ?, check_access_update = ?, check_access_delete = ?, \
         tree_parent_id = ?, tree_position = ? WHERE id = ?",
        table
    ))
    .bind(record.status)
    .bind(&record.language)
    .bind(record.owner)
    .bind(record.modified_at)
    .bind(record.modified_by)
    .bind(&record.check_access_read)
    .bind(&record.check_access_update)
    .bind(&record.check_access_delete)
    .bind(record.tree_parent_id)
    .bind(record.tree_position)
    .bind(record.id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}
