//! Metadata behavior: companion status, audit, ownership, row permissions and
//! tree position maintained alongside arbitrary content records.
//!
//! The host persistence layer calls into [`interceptor::LifecycleInterceptor`]
//! around every read, save and delete of a content type; the interceptor
//! locates the companion row through [`resolver::MetadataResolver`], filters
//! reads with [`access::build_read_predicate`] and keeps the companion row in
//! step with the content row. [`tree::TreeNavigator`] answers hierarchy
//! questions on demand.

pub mod access;
pub mod caller;
pub mod criteria;
pub mod error;
pub mod interceptor;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod tree;

use crate::models::metadata::MetadataRecord;
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool, sqlite::SqliteRow};

pub use access::{ReadPredicate, build_read_predicate};
pub use caller::{Authorizer, CallerContext, GUEST_ROLE, RoleAuthorizer};
pub use criteria::Criteria;
pub use error::{MetaError, MetaResult, Operation};
pub use interceptor::{LifecycleInterceptor, PendingDelete};
pub use resolver::MetadataResolver;
pub use schema::{Addressing, ModelDef, Registry, RelationKey, SELF_ADDRESSING};
pub use settings::{GuidFormat, MetadataSettings};
pub use tree::TreeNavigator;

/// A persisted entity that carries the metadata behavior.
#[async_trait]
pub trait ContentRecord:
    for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static
{
    /// Registry name, also recorded in `MetadataRecord::model`.
    const MODEL: &'static str;
    const TABLE: &'static str;

    /// `None` until the first insert.
    fn id(&self) -> Option<i64>;

    /// Value of a foreign key column held in memory.
    fn foreign_key(&self, _column: &str) -> Option<i64> {
        None
    }

    /// The record itself when it is a metadata row.
    fn as_metadata(&self) -> Option<&MetadataRecord> {
        None
    }

    /// Inserts the record and stores the assigned id on it.
    async fn insert(&mut self, db: &SqlitePool) -> sqlx::Result<()>;

    async fn update(&self, db: &SqlitePool) -> sqlx::Result<()>;
}
