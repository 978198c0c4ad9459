//! Parent/child navigation over metadata `tree_parent_id`/`tree_position`.

use crate::behavior::ContentRecord;
use crate::behavior::caller::CallerContext;
use crate::behavior::criteria::{CONTENT_ALIAS, Criteria};
use crate::behavior::error::MetaResult;
use crate::behavior::schema::Addressing;
use crate::services::repository::Repository;
use tracing::info;

/// Hierarchy view of one loaded record. Results are cached for the lifetime
/// of the navigator; build a new one to see fresh data.
pub struct TreeNavigator<'a, E: ContentRecord> {
    repo: &'a Repository,
    caller: &'a CallerContext,
    record: &'a E,
    children: Option<Vec<E>>,
    parent: Option<Option<E>>,
}

impl<'a, E: ContentRecord> TreeNavigator<'a, E> {
    pub fn new(repo: &'a Repository, caller: &'a CallerContext, record: &'a E) -> Self {
        Self {
            repo,
            caller,
            record,
            children: None,
            parent: None,
        }
    }

    /// Readable records whose metadata names this record as tree parent,
    /// ordered by `tree_position`.
    pub async fn children(&mut self) -> MetaResult<&[E]> {
        if self.children.is_none() {
            let Some(metadata) = self.repo.interceptor().resolver().resolve(self.record).await?
            else {
                info!(model = E::MODEL, id = ?self.record.id(), "record has no metadata; no children");
                return Ok(&[]);
            };

            let addressing = self.repo.interceptor().registry().addressing(E::MODEL)?;
            let mut criteria = Criteria::new();
            for join in addressing.joins() {
                criteria.add_join(join);
            }
            let alias = addressing.metadata_alias();
            let criteria = criteria
                .where_eq(format!("{}.tree_parent_id", alias), metadata.id)
                .order_by(format!(
                    "{alias}.tree_position ASC, {content}.id ASC",
                    alias = alias,
                    content = CONTENT_ALIAS
                ));

            let children = self.repo.find_all::<E>(self.caller, criteria).await?;
            self.children = Some(children);
        }
        Ok(self.children.as_deref().unwrap_or_default())
    }

    /// The readable record named by this record's `tree_parent_id`.
    pub async fn parent(&mut self) -> MetaResult<Option<&E>> {
        if self.parent.is_none() {
            let Some(metadata) = self.repo.interceptor().resolver().resolve(self.record).await?
            else {
                info!(model = E::MODEL, id = ?self.record.id(), "record has no metadata; no parent");
                return Ok(None);
            };

            let parent_id = match self.repo.interceptor().registry().addressing(E::MODEL)? {
                // The record is the metadata row; follow its own column.
                Addressing::SelfReferential => self
                    .record
                    .as_metadata()
                    .and_then(|own| own.tree_parent_id),
                _ => metadata.tree_parent_id,
            };

            let parent = match parent_id {
                Some(id) => self.repo.find_by_id::<E>(self.caller, id).await?,
                None => None,
            };
            self.parent = Some(parent);
        }
        Ok(self.parent.as_ref().and_then(Option::as_ref))
    }
}
