//! A page: the primary content type, with its own metadata row.

use crate::behavior::ContentRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Page {
    /// Assigned by SQLite on first insert.
    pub id: Option<i64>,

    pub title: String,

    pub body: String,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl ContentRecord for Page {
    const MODEL: &'static str = "Page";
    const TABLE: &'static str = "pages";

    fn id(&self) -> Option<i64> {
        self.id
    }

    async fn insert(&mut self, db: &SqlitePool) -> sqlx::Result<()> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO pages (title, body) VALUES (?, ?) RETURNING id",
        )
        .bind(&self.title)
        .bind(&self.body)
        .fetch_one(db)
        .await?;
        self.id = Some(id);
        Ok(())
    }

    async fn update(&self, db: &SqlitePool) -> sqlx::Result<()> {
        let result = sqlx::query("UPDATE pages SET title = ?, body = ? WHERE id = ?")
            .bind(&self.title)
            .bind(&self.body)
            .bind(self.id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
