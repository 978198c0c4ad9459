//! Query criteria merged by the hooks and rendered into SQL.

use crate::behavior::access::ReadPredicate;
use sqlx::{QueryBuilder, Sqlite};

/// Alias of the content table in every query.
pub const CONTENT_ALIAS: &str = "t";

/// `LEFT JOIN {table} AS {alias} ON {on}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub alias: String,
    pub on: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `{column} = ?`, column qualified with its alias.
    Equals { column: String, value: i64 },
    /// `({alias}.check_access_read = ? OR ... OR {alias}.check_access_read IS NULL)`.
    ReadAccess { alias: String, roles: Vec<String> },
}

#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub joins: Vec<Join>,
    pub conditions: Vec<Condition>,
    pub order: Option<String>,
    pub limit: Option<i64>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.add_join(join);
        self
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: i64) -> Self {
        self.conditions.push(Condition::Equals {
            column: column.into(),
            value,
        });
        self
    }

    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Adds a join unless one with the same alias is already present.
    pub fn add_join(&mut self, join: Join) {
        if !self.joins.iter().any(|j| j.alias == join.alias) {
            self.joins.push(join);
        }
    }

    /// Merges a read predicate, adding the joins it needs.
    pub fn restrict(&mut self, predicate: ReadPredicate) {
        if let ReadPredicate::Restricted {
            joins,
            alias,
            roles,
        } = predicate
        {
            for join in joins {
                self.add_join(join);
            }
            self.conditions.push(Condition::ReadAccess { alias, roles });
        }
    }

    /// Appends `SELECT t.* FROM {table} AS t ...` with all values bound.
    pub fn push_select<'a>(&'a self, table: &str, builder: &mut QueryBuilder<'a, Sqlite>) {
        builder.push(format!(
            "SELECT {alias}.* FROM {table} AS {alias}",
            alias = CONTENT_ALIAS,
            table = table
        ));
        for join in &self.joins {
            builder.push(format!(
                " LEFT JOIN {} AS {} ON {}",
                join.table, join.alias, join.on
            ));
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            push_condition(condition, builder);
        }
        if let Some(order) = &self.order {
            builder.push(" ORDER BY ");
            builder.push(order);
        }
        if let Some(limit) = self.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
    }
}

fn push_condition<'a>(condition: &'a Condition, builder: &mut QueryBuilder<'a, Sqlite>) {
    match condition {
        Condition::Equals { column, value } => {
            builder.push(column);
            builder.push(" = ");
            builder.push_bind(*value);
        }
        Condition::ReadAccess { alias, roles } => {
            builder.push("(");
            for role in roles {
                builder.push(format!("{}.check_access_read = ", alias));
                builder.push_bind(role.as_str());
                builder.push(" OR ");
            }
            builder.push(format!("{}.check_access_read IS NULL)", alias));
        }
    }
}
