//! A file reference hanging off a page. It has no metadata row of its own:
//! permissions and audit come from the page it belongs to.

use crate::behavior::ContentRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Attachment {
    pub id: Option<i64>,

    /// Owning page.
    pub page_id: i64,

    pub name: String,

    pub url: String,
}

#[async_trait]
impl ContentRecord for Attachment {
    const MODEL: &'static str = "Attachment";
    const TABLE: &'static str = "attachments";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn foreign_key(&self, column: &str) -> Option<i64> {
        match column {
            "page_id" => Some(self.page_id),
            _ => None,
        }
    }

    async fn insert(&mut self, db: &SqlitePool) -> sqlx::Result<()> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO attachments (page_id, name, url) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(self.page_id)
        .bind(&self.name)
        .bind(&self.url)
        .fetch_one(db)
        .await?;
        self.id = Some(id);
        Ok(())
    }

    async fn update(&self, db: &SqlitePool) -> sqlx::Result<()> {
        let result =
            sqlx::query("UPDATE attachments SET page_id = ?, name = ?, url = ? WHERE id = ?")
                .bind(self.page_id)
                .bind(&self.name)
                .bind(&self.url)
                .bind(self.id)
                .execute(db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
